//! Address value types and pure parsing
//!
//! Parsing is synchronous and deterministic: the same input always yields
//! the same address, so results are safe to cache by normalized key and
//! cheap to recompute after invalidation.
//!
//! Accepted section-reference shapes (leading `@` tolerated and stripped):
//! - `slug` or `parent/child` — section in the context document
//! - `#slug` — section in the context document
//! - `/doc.md#slug` — section in another document (`.md` optional)

use crate::error::{AddressingError, Result};
use mdspace_slug::{is_valid_slug_path, slugify};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Validated document address
///
/// Invariant: `path` is normalized (leading `/`, collapsed duplicate
/// slashes, `.md` suffix) and equals `cache_key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentAddress {
    /// Normalized root-relative path
    pub path: String,
    /// Document's own slug (file stem)
    pub slug: String,
    /// Folder-derived namespace, or literal `root`
    pub namespace: String,
    /// Cache key (the normalized path)
    pub cache_key: String,
}

impl Display for DocumentAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Validated section address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SectionAddress {
    /// Containing document
    pub document: DocumentAddress,
    /// Hierarchical section slug
    pub slug: String,
    /// `document-path#slug`
    pub full_path: String,
    /// Cache key (equals `full_path`)
    pub cache_key: String,
}

impl Display for SectionAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path)
    }
}

/// Section address asserted to live under the `tasks` heading
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskAddress {
    /// Underlying section address
    pub section: SectionAddress,
    /// Always true; distinguishes the type in serialized payloads
    pub is_task: bool,
}

impl TaskAddress {
    /// Task slug relative to the `tasks` heading
    #[must_use]
    pub fn task_slug(&self) -> &str {
        self.section
            .slug
            .strip_prefix("tasks/")
            .unwrap_or(&self.section.slug)
    }
}

/// Slug a `tasks` container heading carries
pub const TASKS_SLUG: &str = "tasks";

/// Normalize a raw document path
///
/// Ensures a leading `/`, collapses duplicate slashes, strips a trailing
/// `/`, and appends `.md` when missing. Rejects empty input and `..`
/// traversal segments.
pub fn normalize_document_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AddressingError::InvalidAddress {
            input: raw.to_string(),
            reason: "empty path".to_string(),
        });
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(AddressingError::InvalidAddress {
                    input: raw.to_string(),
                    reason: "path traversal is not allowed".to_string(),
                })
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(AddressingError::InvalidAddress {
            input: raw.to_string(),
            reason: "path has no segments".to_string(),
        });
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if !normalized.ends_with(".md") {
        normalized.push_str(".md");
    }
    Ok(normalized)
}

/// Derive the namespace from a normalized document path
///
/// The folder portion of the path, or `root` for top-level documents.
#[must_use]
pub fn namespace_of(normalized_path: &str) -> String {
    let without_lead = normalized_path.trim_start_matches('/');
    match without_lead.rsplit_once('/') {
        Some((folder, _file)) => folder.to_string(),
        None => "root".to_string(),
    }
}

/// Parse a raw path into a validated document address
///
/// Idempotent: parsing an already-normalized path yields the same address.
///
/// # Errors
/// [`AddressingError::InvalidAddress`] when the path is empty, contains
/// traversal segments, or cannot be normalized.
pub fn parse_document_address(raw: &str) -> Result<DocumentAddress> {
    let normalized = normalize_document_path(raw)?;

    let file = normalized
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem = file.strip_suffix(".md").unwrap_or(file);
    let slug = if is_valid_slug_path(stem) {
        stem.to_string()
    } else {
        slugify(stem)
    };

    Ok(DocumentAddress {
        namespace: namespace_of(&normalized),
        slug,
        cache_key: normalized.clone(),
        path: normalized,
    })
}

/// Normalize a section fragment into a hierarchical slug
fn normalize_fragment(input: &str, fragment: &str) -> Result<String> {
    let parts: Vec<String> = fragment
        .split('/')
        .filter(|p| !p.is_empty())
        .map(|part| {
            if is_valid_slug_path(part) {
                part.to_string()
            } else {
                slugify(part)
            }
        })
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(AddressingError::InvalidAddress {
            input: input.to_string(),
            reason: "section fragment is empty after normalization".to_string(),
        });
    }
    Ok(parts.join("/"))
}

/// Parse a section reference against an optional context document
///
/// # Errors
/// [`AddressingError::InvalidAddress`] when the reference omits the
/// document portion and no context document is supplied, or when either
/// portion fails to normalize.
pub fn parse_section_address(
    reference: &str,
    context_doc: Option<&str>,
) -> Result<SectionAddress> {
    let trimmed = reference.trim().trim_start_matches('@');
    if trimmed.is_empty() {
        return Err(AddressingError::InvalidAddress {
            input: reference.to_string(),
            reason: "empty section reference".to_string(),
        });
    }

    let (doc_part, slug_part) = match trimmed.split_once('#') {
        Some((doc, slug)) => (doc.trim(), slug.trim()),
        None if trimmed.starts_with('/') => {
            return Err(AddressingError::InvalidAddress {
                input: reference.to_string(),
                reason: "document path without a section fragment".to_string(),
            })
        }
        // Bare slug relative to the context document
        None => ("", trimmed),
    };

    let document = if doc_part.is_empty() {
        let context = context_doc.ok_or_else(|| AddressingError::InvalidAddress {
            input: reference.to_string(),
            reason: "relative section reference without a context document".to_string(),
        })?;
        parse_document_address(context)?
    } else {
        parse_document_address(doc_part)?
    };

    let slug = normalize_fragment(reference, slug_part)?;
    let full_path = format!("{}#{}", document.path, slug);

    Ok(SectionAddress {
        document,
        slug,
        cache_key: full_path.clone(),
        full_path,
    })
}

/// Parse a task reference: a section address that must live under `tasks`
///
/// # Errors
/// As [`parse_section_address`], plus [`AddressingError::NotATask`] when the
/// resolved section is the `tasks` container itself or outside it.
pub fn parse_task_address(reference: &str, context_doc: Option<&str>) -> Result<TaskAddress> {
    let section = parse_section_address(reference, context_doc)?;

    if !mdspace_slug::is_ancestor(TASKS_SLUG, &section.slug) {
        return Err(AddressingError::NotATask {
            document_path: section.document.path,
            slug: section.slug,
        });
    }

    Ok(TaskAddress {
        section,
        is_task: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_address_normalization() {
        let addr = parse_document_address("api//auth").unwrap();
        assert_eq!(addr.path, "/api/auth.md");
        assert_eq!(addr.slug, "auth");
        assert_eq!(addr.namespace, "api");
        assert_eq!(addr.cache_key, addr.path);
    }

    #[test]
    fn document_address_parsing_is_idempotent() {
        let first = parse_document_address("guide").unwrap();
        let second = parse_document_address(&first.path).unwrap();
        assert_eq!(first, second);

        let with_dupes = parse_document_address("//guide.md").unwrap();
        assert_eq!(with_dupes, first);
    }

    #[test]
    fn root_namespace_for_top_level_docs() {
        let addr = parse_document_address("/guide.md").unwrap();
        assert_eq!(addr.namespace, "root");
    }

    #[test]
    fn nested_namespace_keeps_full_folder() {
        let addr = parse_document_address("/specs/api/auth.md").unwrap();
        assert_eq!(addr.namespace, "specs/api");
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = parse_document_address("  ").unwrap_err();
        assert_eq!(err.code(), "INVALID_ADDRESS");
    }

    #[test]
    fn traversal_is_rejected() {
        let err = parse_document_address("/api/../secrets").unwrap_err();
        assert_eq!(err.code(), "INVALID_ADDRESS");
    }

    #[test]
    fn section_address_with_explicit_document() {
        let addr = parse_section_address("/api/auth.md#login", None).unwrap();
        assert_eq!(addr.document.path, "/api/auth.md");
        assert_eq!(addr.slug, "login");
        assert_eq!(addr.full_path, "/api/auth.md#login");
    }

    #[test]
    fn section_address_relative_to_context() {
        let addr = parse_section_address("#setup", Some("/guide.md")).unwrap();
        assert_eq!(addr.full_path, "/guide.md#setup");

        let bare = parse_section_address("setup", Some("/guide.md")).unwrap();
        assert_eq!(bare, addr);
    }

    #[test]
    fn section_address_strips_reference_sigil() {
        let addr = parse_section_address("@/api/auth.md#login", None).unwrap();
        assert_eq!(addr.full_path, "/api/auth.md#login");
    }

    #[test]
    fn relative_section_without_context_fails() {
        let err = parse_section_address("#setup", None).unwrap_err();
        assert_eq!(err.code(), "INVALID_ADDRESS");
    }

    #[test]
    fn document_without_fragment_is_not_a_section() {
        let err = parse_section_address("/guide.md", None).unwrap_err();
        assert_eq!(err.code(), "INVALID_ADDRESS");
    }

    #[test]
    fn hierarchical_fragment_is_slugified_per_component() {
        let addr = parse_section_address("#API Design/Auth Flow", Some("/guide.md")).unwrap();
        assert_eq!(addr.slug, "api-design/auth-flow");
    }

    #[test]
    fn task_address_requires_tasks_descendant() {
        let task = parse_task_address("#tasks/setup", Some("/guide.md")).unwrap();
        assert_eq!(task.section.slug, "tasks/setup");
        assert_eq!(task.task_slug(), "setup");
        assert!(task.is_task);
    }

    #[test]
    fn tasks_container_itself_is_not_a_task() {
        let err = parse_task_address("#tasks", Some("/guide.md")).unwrap_err();
        assert_eq!(err.code(), "NOT_A_TASK");
    }

    #[test]
    fn non_task_section_is_rejected_distinctly() {
        let err = parse_task_address("#setup", Some("/guide.md")).unwrap_err();
        assert_eq!(err.code(), "NOT_A_TASK");
    }
}
