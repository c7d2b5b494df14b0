//! Slug component grammar and free-function path math
//!
//! A slug component matches `[a-z0-9][a-z0-9_-]*[a-z0-9]`; a slug path is
//! one or more components joined by `/`. Depth equals the component count.

/// Errors for slug parsing and path math
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    /// Empty slug or empty component
    #[error("slug cannot be empty")]
    Empty,

    /// Component violates the slug grammar
    #[error("invalid slug component: {0}")]
    InvalidComponent(String),

    /// Not a descendant of the given ancestor
    #[error("slug '{slug}' is not a descendant of '{ancestor}'")]
    NotDescendant { slug: String, ancestor: String },
}

/// Check a single component against the slug grammar
///
/// Components start and end with `[a-z0-9]`; interior characters may also
/// include `-` and `_`. Single-character components are allowed.
#[must_use]
pub fn is_valid_component(component: &str) -> bool {
    let bytes = component.as_bytes();
    let interior_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_';
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    match bytes {
        [] => false,
        [only] => edge_ok(*only),
        [first, middle @ .., last] => {
            edge_ok(*first) && edge_ok(*last) && middle.iter().copied().all(interior_ok)
        }
    }
}

/// Check a full (possibly hierarchical) slug path
#[must_use]
pub fn is_valid_slug_path(slug: &str) -> bool {
    !slug.is_empty() && slug.split('/').all(is_valid_component)
}

/// Number of components in a slug path
///
/// `slug_depth("a/b/c") == 3`; the empty string has depth 0.
#[must_use]
pub fn slug_depth(slug: &str) -> usize {
    if slug.is_empty() {
        0
    } else {
        slug.split('/').count()
    }
}

/// Parent slug path, or `None` for single-component slugs
///
/// `parent_slug("api/auth/jwt") == Some("api/auth")`.
#[must_use]
pub fn parent_slug(slug: &str) -> Option<&str> {
    slug.rfind('/').map(|idx| &slug[..idx])
}

/// Check whether `child` is exactly one level below `parent`
#[must_use]
pub fn is_direct_child(parent: &str, child: &str) -> bool {
    parent_slug(child) == Some(parent)
}

/// Check whether `ancestor` is a strict ancestor of `slug`
#[must_use]
pub fn is_ancestor(ancestor: &str, slug: &str) -> bool {
    slug.len() > ancestor.len()
        && slug.starts_with(ancestor)
        && slug.as_bytes()[ancestor.len()] == b'/'
}

/// Join slug components, skipping empty parts
#[must_use]
pub fn join_slugs(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a slug path into components
#[must_use]
pub fn split_slug(slug: &str) -> Vec<&str> {
    if slug.is_empty() {
        Vec::new()
    } else {
        slug.split('/').collect()
    }
}

/// Derive a slug component from free text
///
/// Lowercases, collapses non-alphanumeric runs to a single `-`, and strips
/// leading/trailing separators. Degenerate input (no alphanumerics at all)
/// yields an empty string; callers decide how to handle that.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' {
            // Underscore is part of the grammar, keep it verbatim
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push('_');
        } else {
            pending_sep = true;
        }
    }

    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_grammar() {
        assert!(is_valid_component("auth"));
        assert!(is_valid_component("a"));
        assert!(is_valid_component("9"));
        assert!(is_valid_component("api-v2"));
        assert!(is_valid_component("snake_case"));

        assert!(!is_valid_component(""));
        assert!(!is_valid_component("-leading"));
        assert!(!is_valid_component("trailing-"));
        assert!(!is_valid_component("_underscore"));
        assert!(!is_valid_component("Upper"));
        assert!(!is_valid_component("spa ce"));
    }

    #[test]
    fn slug_path_validation() {
        assert!(is_valid_slug_path("api/auth/jwt"));
        assert!(is_valid_slug_path("a"));
        assert!(!is_valid_slug_path(""));
        assert!(!is_valid_slug_path("api//auth"));
        assert!(!is_valid_slug_path("/api"));
    }

    #[test]
    fn depth_counts_components() {
        assert_eq!(slug_depth("a/b/c"), 3);
        assert_eq!(slug_depth("a"), 1);
        assert_eq!(slug_depth(""), 0);
    }

    #[test]
    fn parent_of_hierarchical_slug() {
        assert_eq!(parent_slug("api/auth/jwt"), Some("api/auth"));
        assert_eq!(parent_slug("api"), None);
    }

    #[test]
    fn direct_child_detection() {
        assert!(is_direct_child("api/auth", "api/auth/jwt"));
        assert!(!is_direct_child("api", "api/auth/jwt"));
        assert!(!is_direct_child("api/auth", "api/auth"));
    }

    #[test]
    fn ancestor_detection() {
        assert!(is_ancestor("api", "api/auth/jwt"));
        assert!(is_ancestor("api/auth", "api/auth/jwt"));
        assert!(!is_ancestor("api/auth", "api/auth"));
        // Prefix of a component is not an ancestor
        assert!(!is_ancestor("api/au", "api/auth"));
    }

    #[test]
    fn join_skips_empty_parts() {
        assert_eq!(join_slugs(&["api", "", "auth"]), "api/auth");
        assert_eq!(join_slugs(&[]), "");
    }

    #[test]
    fn split_round_trip() {
        assert_eq!(split_slug("a/b"), vec!["a", "b"]);
        assert!(split_slug("").is_empty());
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("API: Auth & JWT"), "api-auth-jwt");
        assert_eq!(slugify("  spaced  out  "), "spaced-out");
        assert_eq!(slugify("snake_case kept"), "snake_case-kept");
    }

    #[test]
    fn slugify_degenerate() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn slugify_is_valid_or_empty(text in ".{0,64}") {
                let slug = slugify(&text);
                prop_assert!(slug.is_empty() || is_valid_component(&slug) || is_valid_slug_path(&slug));
            }

            #[test]
            fn parent_child_round_trip(
                parts in prop::collection::vec("[a-z][a-z0-9]{0,5}", 2..5)
            ) {
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                let joined = join_slugs(&refs);
                let parent = parent_slug(&joined).unwrap();
                prop_assert!(is_direct_child(parent, &joined));
                prop_assert_eq!(slug_depth(&joined), parts.len());
            }
        }
    }
}
