//! Reference normalization
//!
//! Resolves extracted tokens into absolute, `.md`-suffixed references
//! against a context document. One malformed token never aborts a batch:
//! per-reference failures are logged and skipped. An unusable context path
//! fails the whole call, since nothing can be resolved without it.

use mdspace_address::{
    normalize_document_path, parse_section_address, AddressingError, Result,
};
use serde::Serialize;
use tracing::warn;

/// A reference token resolved against its context document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedReference {
    /// Token as written in the source content
    pub original_ref: String,
    /// `document_path`, optionally suffixed `#section_slug`
    pub resolved_path: String,
    /// Absolute `.md`-suffixed document path
    pub document_path: String,
    /// Section slug, when the token names one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_slug: Option<String>,
}

impl NormalizedReference {
    /// Key used by the loader's visited set: `path#section`, empty section
    /// for whole-document references
    #[must_use]
    pub fn visited_key(&self) -> String {
        format!(
            "{}#{}",
            self.document_path,
            self.section_slug.as_deref().unwrap_or("")
        )
    }
}

/// Normalize a single token against a context document path
///
/// # Errors
/// [`AddressingError::InvalidAddress`] for tokens outside the grammar.
pub fn normalize_reference(token: &str, context_path: &str) -> Result<NormalizedReference> {
    let body = token.trim().strip_prefix('@').ok_or_else(|| {
        AddressingError::InvalidAddress {
            input: token.to_string(),
            reason: "reference tokens start with '@'".to_string(),
        }
    })?;

    // Whole-document reference: no fragment to resolve
    if body.starts_with('/') && !body.contains('#') {
        let document_path = normalize_document_path(body)?;
        return Ok(NormalizedReference {
            original_ref: token.to_string(),
            resolved_path: document_path.clone(),
            document_path,
            section_slug: None,
        });
    }

    let section = parse_section_address(body, Some(context_path))?;
    Ok(NormalizedReference {
        original_ref: token.to_string(),
        resolved_path: section.full_path,
        document_path: section.document.path,
        section_slug: Some(section.slug),
    })
}

/// Normalize a batch of extracted tokens
///
/// # Errors
/// Fails outright when `context_path` is empty or unparseable; individual
/// malformed tokens are logged and skipped.
pub fn normalize_references(
    refs: &[String],
    context_path: &str,
) -> Result<Vec<NormalizedReference>> {
    // Validate the context up front so every token fails the same way
    let context = normalize_document_path(context_path)?;

    let mut normalized = Vec::with_capacity(refs.len());
    for token in refs {
        match normalize_reference(token, &context) {
            Ok(reference) => normalized.push(reference),
            Err(err) => {
                warn!(token = %token, error = %err, "skipping malformed reference");
            }
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn within_doc_reference_resolves_to_context() {
        let reference = normalize_reference("@#setup", "/guide.md").unwrap();
        assert_eq!(reference.document_path, "/guide.md");
        assert_eq!(reference.section_slug.as_deref(), Some("setup"));
        assert_eq!(reference.resolved_path, "/guide.md#setup");
    }

    #[test]
    fn whole_document_reference_gets_md_suffix() {
        let reference = normalize_reference("@/api/auth", "/guide.md").unwrap();
        assert_eq!(reference.document_path, "/api/auth.md");
        assert_eq!(reference.resolved_path, "/api/auth.md");
        assert!(reference.section_slug.is_none());
    }

    #[test]
    fn cross_document_section_reference() {
        let reference = normalize_reference("@/api/auth.md#login", "/guide.md").unwrap();
        assert_eq!(reference.resolved_path, "/api/auth.md#login");
        assert_eq!(reference.section_slug.as_deref(), Some("login"));
    }

    #[test]
    fn visited_key_uses_empty_fragment_for_documents() {
        let reference = normalize_reference("@/api/auth", "/guide.md").unwrap();
        assert_eq!(reference.visited_key(), "/api/auth.md#");

        let section = normalize_reference("@#setup", "/guide.md").unwrap();
        assert_eq!(section.visited_key(), "/guide.md#setup");
    }

    #[test]
    fn batch_skips_malformed_tokens() {
        let refs = vec![
            "@#setup".to_string(),
            "not-a-reference".to_string(),
            "@/api/auth.md#login".to_string(),
        ];
        let normalized = normalize_references(&refs, "/guide.md").unwrap();
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].resolved_path, "/guide.md#setup");
        assert_eq!(normalized[1].resolved_path, "/api/auth.md#login");
    }

    #[test]
    fn empty_context_fails_outright() {
        let refs = vec!["@#setup".to_string()];
        let err = normalize_references(&refs, "").unwrap_err();
        assert_eq!(err.code(), "INVALID_ADDRESS");
    }
}
