//! Single-link validation
//!
//! Broken links are data, not errors: every outcome (including provider
//! access failures) lands in the [`LinkValidationResult`] so corpus-wide
//! reports can bucket and rank them without aborting.

use crate::classify::{classify_link, LinkKind};
use mdspace_provider::DocumentProvider;
use mdspace_refs::normalize_reference;
use serde::Serialize;
use tracing::debug;

/// Outcome of validating one link token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkValidationResult {
    /// Token as written
    pub link_text: String,
    /// Syntactic classification
    pub kind: LinkKind,
    /// Whether the link resolves
    pub is_valid: bool,
    /// Failure description, prefixed with its category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Candidate replacements (paths or section slugs)
    pub suggestions: Vec<String>,
}

impl LinkValidationResult {
    fn valid(token: &str, kind: LinkKind) -> Self {
        Self {
            link_text: token.to_string(),
            kind,
            is_valid: true,
            error: None,
            suggestions: Vec::new(),
        }
    }

    fn broken(token: &str, kind: LinkKind, error: String, suggestions: Vec<String>) -> Self {
        Self {
            link_text: token.to_string(),
            kind,
            is_valid: false,
            error: Some(error),
            suggestions,
        }
    }
}

/// Nearest-match document search for a missing path
///
/// Ranks corpus paths by stem equality, then stem containment.
async fn document_candidates(missing_path: &str, provider: &dyn DocumentProvider) -> Vec<String> {
    let stem = missing_path
        .rsplit('/')
        .next()
        .unwrap_or(missing_path)
        .trim_end_matches(".md");

    let Ok(listing) = provider.list_documents().await else {
        return Vec::new();
    };

    let mut exact = Vec::new();
    let mut partial = Vec::new();
    for info in listing {
        let candidate_stem = info
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&info.path)
            .trim_end_matches(".md");
        if candidate_stem == stem {
            exact.push(info.path);
        } else if !stem.is_empty()
            && (candidate_stem.contains(stem) || stem.contains(candidate_stem))
        {
            partial.push(info.path);
        }
    }

    exact.extend(partial);
    exact.truncate(3);
    exact
}

/// Validate one token against a context document
///
/// External links are always valid. Internal links resolve through the
/// provider; failures are annotated with recovery suggestions.
pub async fn validate_single_link(
    token: &str,
    context_path: &str,
    provider: &dyn DocumentProvider,
) -> LinkValidationResult {
    let kind = classify_link(token);
    match kind {
        LinkKind::External => LinkValidationResult::valid(token, kind),
        LinkKind::Malformed => LinkValidationResult::broken(
            token,
            kind,
            format!("Syntax Error: '{token}' fits no reference shape"),
            Vec::new(),
        ),
        LinkKind::CrossDoc | LinkKind::WithinDoc => {
            let reference = match normalize_reference(token, context_path) {
                Ok(reference) => reference,
                Err(err) => {
                    return LinkValidationResult::broken(
                        token,
                        kind,
                        format!("Syntax Error: {err}"),
                        Vec::new(),
                    )
                }
            };

            let document = match provider.get_document(&reference.document_path).await {
                Ok(found) => found,
                Err(err) => {
                    debug!(token = %token, error = %err, "provider failed during validation");
                    return LinkValidationResult::broken(
                        token,
                        kind,
                        format!("Access Error: {err}"),
                        Vec::new(),
                    );
                }
            };

            let Some(document) = document else {
                let suggestions =
                    document_candidates(&reference.document_path, provider).await;
                return LinkValidationResult::broken(
                    token,
                    kind,
                    format!("Missing Document: {}", reference.document_path),
                    suggestions,
                );
            };

            match &reference.section_slug {
                None => LinkValidationResult::valid(token, kind),
                Some(slug) if document.heading(slug).is_some() => {
                    LinkValidationResult::valid(token, kind)
                }
                Some(slug) => {
                    // Offer the nearest existing ancestor first, then the listing
                    let mut suggestions: Vec<String> = Vec::new();
                    if let Some(parent) = mdspace_slug::parent_slug(slug) {
                        if document.heading(parent).is_some() {
                            suggestions.push(parent.to_string());
                        }
                    }
                    for heading in &document.headings {
                        if suggestions.len() >= 5 {
                            break;
                        }
                        // The title heading is not a useful link target
                        if heading.depth > 1
                            && heading.slug != *slug
                            && !suggestions.contains(&heading.slug)
                        {
                            suggestions.push(heading.slug.clone());
                        }
                    }

                    LinkValidationResult::broken(
                        token,
                        kind,
                        format!(
                            "Missing Section: {} in {}",
                            slug, reference.document_path
                        ),
                        suggestions,
                    )
                }
            }
        }
    }
}
