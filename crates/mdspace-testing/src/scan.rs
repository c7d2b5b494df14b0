//! Markdown heading scanner
//!
//! Builds the heading table the provider model exposes: hierarchical slugs,
//! titles, depths, and the byte spans needed for section reads and splice
//! mutations. Frontmatter is split off before parsing.
//!
//! Slug scheme: level-1 headings carry a flat slug and reset the hierarchy;
//! deeper headings nest below the nearest shallower non-title heading, so
//! `# Guide / ## Tasks / ### Setup` yields `guide`, `tasks`, `tasks/setup`.

use mdspace_slug::slugify;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// One scanned heading with its byte geometry
#[derive(Debug, Clone)]
pub(crate) struct ScannedHeading {
    /// Full hierarchical slug
    pub(crate) slug: String,
    /// Heading text as written
    pub(crate) title: String,
    /// Markdown heading level
    pub(crate) depth: u8,
    /// Byte offset of the heading line start
    pub(crate) line_start: usize,
    /// Byte offset where the section's own body starts
    pub(crate) body_start: usize,
    /// Byte offset where the own body ends (next heading of any level)
    pub(crate) body_end: usize,
    /// Byte offset where the subtree ends (next same-or-shallower heading)
    pub(crate) subtree_end: usize,
}

/// Scanned document: frontmatter, body offset, headings
#[derive(Debug, Clone)]
pub(crate) struct ScannedDocument {
    pub(crate) frontmatter: Option<serde_yaml::Value>,
    /// Byte offset where the markdown body starts (after frontmatter)
    pub(crate) body_offset: usize,
    pub(crate) headings: Vec<ScannedHeading>,
}

impl ScannedDocument {
    pub(crate) fn heading(&self, slug: &str) -> Option<&ScannedHeading> {
        self.headings.iter().find(|h| h.slug == slug)
    }

    /// First level-1 heading title
    pub(crate) fn title(&self) -> Option<&str> {
        self.headings
            .iter()
            .find(|h| h.depth == 1)
            .map(|h| h.title.as_str())
    }
}

/// Split YAML frontmatter off the head of a source string
fn split_frontmatter(source: &str) -> (Option<serde_yaml::Value>, usize) {
    let Some(rest) = source.strip_prefix("---\n") else {
        return (None, 0);
    };
    let Some(end) = rest.find("\n---") else {
        return (None, 0);
    };

    let yaml = &rest[..end];
    let after = 4 + end + 4; // "---\n" + yaml + "\n---"
    let body_offset = source[after..]
        .find('\n')
        .map(|idx| after + idx + 1)
        .unwrap_or(source.len());

    match serde_yaml::from_str(yaml) {
        Ok(value) => (Some(value), body_offset),
        Err(_) => (None, 0),
    }
}

/// Scan a markdown source into headings with byte geometry
pub(crate) fn scan(source: &str) -> ScannedDocument {
    let (frontmatter, body_offset) = split_frontmatter(source);
    let body = &source[body_offset..];

    // Pass 1: raw headings (level, title, absolute line start)
    let mut raw: Vec<(u8, String, usize)> = Vec::new();
    let mut in_heading = false;

    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = true;
                raw.push((level as u8, String::new(), body_offset + range.start));
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
            }
            Event::Text(text) | Event::Code(text) if in_heading => {
                if let Some((_, title, _)) = raw.last_mut() {
                    title.push_str(&text);
                }
            }
            _ => {}
        }
    }

    // Pass 2: spans and hierarchical slugs
    let mut headings = Vec::with_capacity(raw.len());
    let mut stack: Vec<(u8, String)> = Vec::new();

    for (idx, (depth, title, line_start)) in raw.iter().enumerate() {
        let body_start = source[*line_start..]
            .find('\n')
            .map(|nl| line_start + nl + 1)
            .unwrap_or(source.len());
        let body_end = raw
            .get(idx + 1)
            .map(|(_, _, start)| *start)
            .unwrap_or(source.len());
        let subtree_end = raw[idx + 1..]
            .iter()
            .find(|(d, _, _)| d <= depth)
            .map(|(_, _, start)| *start)
            .unwrap_or(source.len());

        let component = {
            let byslug = slugify(title);
            if byslug.is_empty() {
                "section".to_string()
            } else {
                byslug
            }
        };

        let slug = if *depth == 1 {
            // Title headings are flat roots and reset nesting
            stack.clear();
            component.clone()
        } else {
            while stack.last().is_some_and(|(d, _)| *d >= *depth) {
                stack.pop();
            }
            let mut parts: Vec<&str> = stack.iter().map(|(_, c)| c.as_str()).collect();
            parts.push(&component);
            let joined = parts.join("/");
            stack.push((*depth, component.clone()));
            joined
        };

        headings.push(ScannedHeading {
            slug,
            title: title.clone(),
            depth: *depth,
            line_start: *line_start,
            body_start,
            body_end,
            subtree_end,
        });
    }

    ScannedDocument {
        frontmatter,
        body_offset,
        headings,
    }
}
