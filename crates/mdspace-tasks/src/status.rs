//! Task status values and the status-field micro-format
//!
//! Task bodies carry key/value fields on free-text lines in one of four
//! styles, recognized in this precedence order regardless of where each
//! line sits in the body:
//!
//! ```text
//! * Status: pending
//! - Status: in_progress
//! **Status:** completed
//! Status: blocked
//! ```
//!
//! The same tokenizer serves the `Link` and `Dependencies` fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Recognized task states, with an escape hatch for free-form values
///
/// Only the four canonical values participate in summarization; anything
/// else is carried through verbatim. No transition graph is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Not started
    Pending,
    /// Actively being worked
    InProgress,
    /// Done
    Completed,
    /// Waiting on something external
    Blocked,
    /// Any other string found in the status field
    Other(String),
}

impl TaskStatus {
    /// Wire string for this status
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Other(value) => value,
        }
    }

    /// True for `pending` and `in_progress`, the states next-task
    /// selection considers workable
    #[inline]
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// True only for `completed`
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim() {
            "pending" => Self::Pending,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "blocked" => Self::Blocked,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Self::Other(value))
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the four field-line styles a match used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStyle {
    /// `* Key: value`
    Star,
    /// `- Key: value`
    Dash,
    /// `**Key:** value`
    Bold,
    /// `Key: value`
    Plain,
}

impl FieldStyle {
    /// Render a field line in this style
    #[must_use]
    pub fn render(self, key: &str, value: &str) -> String {
        match self {
            Self::Star => format!("* {key}: {value}"),
            Self::Dash => format!("- {key}: {value}"),
            Self::Bold => format!("**{key}:** {value}"),
            Self::Plain => format!("{key}: {value}"),
        }
    }
}

/// A field line found in a task body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    /// Style the line was written in
    pub style: FieldStyle,
    /// Trimmed value text after the key
    pub value: String,
}

/// Match one line against `key` in any of the four styles
fn match_field_line(line: &str, key: &str) -> Option<FieldMatch> {
    let trimmed = line.trim();

    let (style, rest) = if let Some(rest) = trimmed.strip_prefix("* ") {
        (FieldStyle::Star, rest)
    } else if let Some(rest) = trimmed.strip_prefix("- ") {
        (FieldStyle::Dash, rest)
    } else if trimmed.starts_with("**") {
        let rest = trimmed
            .strip_prefix("**")?
            .strip_prefix(key)?
            .strip_prefix(":**")?;
        return Some(FieldMatch {
            style: FieldStyle::Bold,
            value: rest.trim().to_string(),
        });
    } else {
        (FieldStyle::Plain, trimmed)
    };

    let value = rest.strip_prefix(key)?.strip_prefix(':')?;
    Some(FieldMatch {
        style,
        value: value.trim().to_string(),
    })
}

/// Extract the value of `key` from a task body
///
/// When multiple lines carry the key in different styles, precedence is
/// `* Key:` over `- Key:` over `**Key:**` over `Key:`; within one style
/// the first line wins.
#[must_use]
pub fn extract_field(content: &str, key: &str) -> Option<FieldMatch> {
    let mut best: Option<FieldMatch> = None;
    for line in content.lines() {
        let Some(found) = match_field_line(line, key) else {
            continue;
        };
        let rank = |style: FieldStyle| match style {
            FieldStyle::Star => 0,
            FieldStyle::Dash => 1,
            FieldStyle::Bold => 2,
            FieldStyle::Plain => 3,
        };
        match &best {
            Some(current) if rank(current.style) <= rank(found.style) => {}
            _ => best = Some(found),
        }
    }
    best
}

/// Parsed `Status:` field, defaulting absent values to [`TaskStatus::Pending`]
#[must_use]
pub fn extract_status(content: &str) -> TaskStatus {
    extract_field(content, "Status")
        .map(|field| TaskStatus::from(field.value))
        .unwrap_or(TaskStatus::Pending)
}

/// Parsed comma-separated `Dependencies:` field
#[must_use]
pub fn extract_dependencies(content: &str) -> Vec<String> {
    extract_field(content, "Dependencies")
        .map(|field| {
            field
                .value
                .split(',')
                .map(str::trim)
                .filter(|dep| !dep.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Rewrite a task body's status field in place
///
/// The first status line in document order is replaced, keeping whichever
/// style it used; when no status line exists a bold one is prepended.
/// Completion metadata lines are then appended. Re-running on already
/// completed content overwrites the status and accumulates another note
/// block, which is the intended record-keeping behavior.
#[must_use]
pub fn update_task_status(
    content: &str,
    status: &TaskStatus,
    note: Option<&str>,
    date: NaiveDate,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut replaced = false;

    for line in content.lines() {
        if !replaced {
            if let Some(found) = match_field_line(line, "Status") {
                let indent_len = line.len() - line.trim_start().len();
                let indent = &line[..indent_len];
                lines.push(format!("{indent}{}", found.style.render("Status", status.as_str())));
                replaced = true;
                continue;
            }
        }
        lines.push(line.to_string());
    }

    if !replaced {
        lines.insert(0, FieldStyle::Bold.render("Status", status.as_str()));
    }

    let mut updated = lines.join("\n");
    while updated.ends_with('\n') {
        updated.pop();
    }
    updated.push('\n');
    updated.push_str(&format!("- Completed: {}\n", date.format("%Y-%m-%d")));
    if let Some(note) = note {
        updated.push_str(&format!("- Note: {note}\n"));
    }
    updated
}
