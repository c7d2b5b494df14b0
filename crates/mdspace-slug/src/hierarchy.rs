//! Materialized view of a hierarchical slug path
//!
//! [`HierarchicalSlug`] caches the split components of a slug path so that
//! ancestor/descendant and relative-path math can work on slices instead of
//! re-splitting strings.

use crate::slug::{is_valid_component, SlugError};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Parsed hierarchical slug
///
/// # Example
/// ```
/// use mdspace_slug::HierarchicalSlug;
///
/// let slug: HierarchicalSlug = "api/auth/jwt".parse().unwrap();
/// assert_eq!(slug.depth(), 3);
/// assert_eq!(slug.parent().unwrap().full(), "api/auth");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HierarchicalSlug {
    full: String,
    parts: Vec<String>,
}

impl HierarchicalSlug {
    /// Parse and validate a slug path
    ///
    /// # Errors
    /// Returns [`SlugError::Empty`] for empty input and
    /// [`SlugError::InvalidComponent`] when any component violates the grammar.
    pub fn parse(slug: &str) -> Result<Self, SlugError> {
        if slug.is_empty() {
            return Err(SlugError::Empty);
        }

        let parts: Vec<String> = slug
            .split('/')
            .map(|part| {
                if is_valid_component(part) {
                    Ok(part.to_string())
                } else {
                    Err(SlugError::InvalidComponent(part.to_string()))
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            full: slug.to_string(),
            parts,
        })
    }

    /// Full slug path string
    #[inline]
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Slug components from root to leaf
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Component count
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parts.len()
    }

    /// Last component (the slug's own name)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Parent slug, or `None` for single-component slugs
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.parts.len() <= 1 {
            return None;
        }
        let parts = self.parts[..self.parts.len() - 1].to_vec();
        Some(Self {
            full: parts.join("/"),
            parts,
        })
    }

    /// Child slug one level below
    #[must_use]
    pub fn child(&self, component: impl Into<String>) -> Self {
        let mut parts = self.parts.clone();
        parts.push(component.into());
        Self {
            full: parts.join("/"),
            parts,
        }
    }

    /// All strict ancestors from root to immediate parent
    ///
    /// `api/auth/jwt` yields `[api, api/auth]`.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        (1..self.parts.len())
            .map(|len| {
                let parts = self.parts[..len].to_vec();
                Self {
                    full: parts.join("/"),
                    parts,
                }
            })
            .collect()
    }

    /// Check if this slug is a strict ancestor of another
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.parts.len() < other.parts.len() && self.parts == other.parts[..self.parts.len()]
    }

    /// Check if this slug is a strict descendant of another
    #[inline]
    #[must_use]
    pub fn is_descendant_of(&self, other: &Self) -> bool {
        other.is_ancestor_of(self)
    }

    /// Check if `other` is exactly one level below this slug
    #[inline]
    #[must_use]
    pub fn is_direct_child(&self, other: &Self) -> bool {
        other.parts.len() == self.parts.len() + 1 && self.is_ancestor_of(other)
    }

    /// Components of this slug relative to an ancestor
    ///
    /// # Errors
    /// Returns [`SlugError::NotDescendant`] when `ancestor` is not a strict
    /// ancestor of this slug.
    pub fn relative_to(&self, ancestor: &Self) -> Result<Self, SlugError> {
        if !ancestor.is_ancestor_of(self) {
            return Err(SlugError::NotDescendant {
                slug: self.full.clone(),
                ancestor: ancestor.full.clone(),
            });
        }
        let parts = self.parts[ancestor.parts.len()..].to_vec();
        Ok(Self {
            full: parts.join("/"),
            parts,
        })
    }

    /// Longest common prefix of two slugs, if any
    #[must_use]
    pub fn common_prefix(&self, other: &Self) -> Option<Self> {
        let parts: Vec<String> = self
            .parts
            .iter()
            .zip(&other.parts)
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.clone())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(Self {
                full: parts.join("/"),
                parts,
            })
        }
    }
}

impl Display for HierarchicalSlug {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for HierarchicalSlug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        let slug = HierarchicalSlug::parse("api/auth/jwt").unwrap();
        assert_eq!(slug.full(), "api/auth/jwt");
        assert_eq!(slug.parts(), &["api", "auth", "jwt"]);
        assert_eq!(slug.depth(), 3);
        assert_eq!(slug.name(), "jwt");
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(HierarchicalSlug::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn parse_rejects_bad_component() {
        let err = HierarchicalSlug::parse("api/Bad/slug").unwrap_err();
        assert_eq!(err, SlugError::InvalidComponent("Bad".to_string()));
    }

    #[test]
    fn parent_and_child() {
        let slug = HierarchicalSlug::parse("api/auth").unwrap();
        assert_eq!(slug.parent().unwrap().full(), "api");
        assert!(slug.parent().unwrap().parent().is_none());
        assert_eq!(slug.child("jwt").full(), "api/auth/jwt");
    }

    #[test]
    fn ancestors_in_order() {
        let slug = HierarchicalSlug::parse("a/b/c").unwrap();
        let ancestors: Vec<String> = slug.ancestors().iter().map(|s| s.full().into()).collect();
        assert_eq!(ancestors, vec!["a", "a/b"]);
    }

    #[test]
    fn ancestor_and_descendant() {
        let parent = HierarchicalSlug::parse("api/auth").unwrap();
        let child = HierarchicalSlug::parse("api/auth/jwt").unwrap();
        let unrelated = HierarchicalSlug::parse("api/users").unwrap();

        assert!(parent.is_ancestor_of(&child));
        assert!(child.is_descendant_of(&parent));
        assert!(parent.is_direct_child(&child));
        assert!(!parent.is_ancestor_of(&unrelated));
        assert!(!parent.is_ancestor_of(&parent));
    }

    #[test]
    fn relative_to_ancestor() {
        let slug = HierarchicalSlug::parse("a/b/c/d").unwrap();
        let ancestor = HierarchicalSlug::parse("a/b").unwrap();
        assert_eq!(slug.relative_to(&ancestor).unwrap().full(), "c/d");
    }

    #[test]
    fn relative_to_non_ancestor_fails() {
        let slug = HierarchicalSlug::parse("a/b").unwrap();
        let other = HierarchicalSlug::parse("x/y").unwrap();
        assert!(matches!(
            slug.relative_to(&other),
            Err(SlugError::NotDescendant { .. })
        ));
    }

    #[test]
    fn common_prefix() {
        let a = HierarchicalSlug::parse("a/b/c").unwrap();
        let b = HierarchicalSlug::parse("a/b/d").unwrap();
        let c = HierarchicalSlug::parse("x/y").unwrap();

        assert_eq!(a.common_prefix(&b).unwrap().full(), "a/b");
        assert!(a.common_prefix(&c).is_none());
    }

    #[test]
    fn display_and_from_str() {
        let slug: HierarchicalSlug = "api/auth".parse().unwrap();
        assert_eq!(slug.to_string(), "api/auth");
    }
}
