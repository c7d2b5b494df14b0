//! Reference token extraction
//!
//! Token grammar (embedded in markdown prose):
//! - `@#slug` — section in the current document
//! - `@/doc` or `@/doc.md` — whole document (extension optional)
//! - `@/doc.md#slug` — section of another document
//!
//! Extraction is a single regex pass; trailing sentence punctuation is
//! stripped and duplicates are dropped while preserving first-seen order.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `@/path`, `@/path#fragment`, and `@#fragment` tokens
static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(?:/[A-Za-z0-9][A-Za-z0-9._/\-]*(?:#[A-Za-z0-9][A-Za-z0-9_/\-]*)?|#[A-Za-z0-9][A-Za-z0-9_/\-]*)")
        .expect("valid reference token regex")
});

/// Punctuation that can trail a token at a sentence boundary
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', '\'', '"'];

/// Extract reference tokens from raw markdown content
///
/// Returns de-duplicated tokens in first-seen order. Degenerate input
/// (empty content) yields an empty result rather than failing.
#[must_use]
pub fn extract_references(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let mut seen: IndexSet<String> = IndexSet::new();
    for found in REFERENCE_RE.find_iter(content) {
        let token = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        // Punctuation stripping can hollow a token out entirely (`@#` alone)
        if token.len() > 1 {
            seen.insert(token.to_string());
        }
    }

    seen.into_iter().collect()
}
