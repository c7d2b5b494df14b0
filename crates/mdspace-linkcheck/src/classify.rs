//! Syntactic link classification
//!
//! Classification needs no site context and never touches the provider;
//! semantic resolution happens in [`crate::validate`].

use serde::Serialize;

/// Syntactic kind of a link token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// `@/doc` or `@/doc.md#section` — points into another document
    CrossDoc,
    /// `@#section` — points into the containing document
    WithinDoc,
    /// Absolute URL or anything without the `@` sigil; never validated
    External,
    /// Starts with `@` but fits no reference shape
    Malformed,
}

/// Classify a raw token
#[must_use]
pub fn classify_link(token: &str) -> LinkKind {
    let trimmed = token.trim();
    match trimmed.strip_prefix('@') {
        Some(body) if body.starts_with('/') => LinkKind::CrossDoc,
        Some(body) if body.starts_with('#') && body.len() > 1 => LinkKind::WithinDoc,
        Some(_) => LinkKind::Malformed,
        None => LinkKind::External,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_document_shapes() {
        assert_eq!(classify_link("@/api/auth.md"), LinkKind::CrossDoc);
        assert_eq!(classify_link("@/api/auth.md#login"), LinkKind::CrossDoc);
        assert_eq!(classify_link("@/api/auth"), LinkKind::CrossDoc);
    }

    #[test]
    fn within_document_shape() {
        assert_eq!(classify_link("@#setup"), LinkKind::WithinDoc);
    }

    #[test]
    fn external_links_have_no_sigil() {
        assert_eq!(classify_link("https://example.com"), LinkKind::External);
        assert_eq!(classify_link("mailto:dev@example.com"), LinkKind::External);
        assert_eq!(classify_link("plain words"), LinkKind::External);
    }

    #[test]
    fn malformed_sigil_shapes() {
        assert_eq!(classify_link("@"), LinkKind::Malformed);
        assert_eq!(classify_link("@#"), LinkKind::Malformed);
        assert_eq!(classify_link("@setup"), LinkKind::Malformed);
    }
}
