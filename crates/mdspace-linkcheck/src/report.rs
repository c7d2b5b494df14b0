//! Document and corpus link-health reports
//!
//! Reports aggregate [`LinkValidationResult`]s per heading, score link
//! health, and bucket failure categories. The fix path only ever collects
//! suggestions; applying them is deliberately left to the caller.

use crate::validate::{validate_single_link, LinkValidationResult};
use indexmap::IndexMap;
use mdspace_address::{normalize_document_path, AddressingError, Result};
use mdspace_provider::DocumentProvider;
use mdspace_refs::extract_references;
use serde::Serialize;
use tracing::debug;

/// Buckets for ranking common failure categories
const CATEGORIES: &[&str] = &[
    "Missing Document",
    "Missing Section",
    "Syntax Error",
    "Access Error",
];

/// A broken link with the heading it appears under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrokenLink {
    /// Slug of the heading whose section contains the link
    pub heading: String,
    /// Validation outcome
    pub result: LinkValidationResult,
}

/// Link-health report for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLinkReport {
    /// Normalized document path
    pub document_path: String,
    /// All links seen
    pub total_links: usize,
    /// Links that resolved
    pub valid_links: usize,
    /// Broken links with their headings
    pub broken_links: Vec<BrokenLink>,
    /// `round(100 * valid/total)`; 100 when the document has no links
    pub health_score: u8,
    /// Human-readable guidance keyed off score thresholds
    pub recommendations: Vec<String>,
}

/// Corpus-wide link-health report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemLinkReport {
    /// Documents examined
    pub documents_scanned: usize,
    /// Links seen across the corpus
    pub total_links: usize,
    /// Broken links across the corpus
    pub broken_links: usize,
    /// Corpus health score (same formula as per-document)
    pub system_health: u8,
    /// Documents ranked by broken-link count, worst first
    pub most_broken_documents: Vec<(String, usize)>,
    /// Failure counts per category bucket
    pub categories: IndexMap<String, usize>,
}

/// One suggested link replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedLinkFix {
    /// Heading whose section contains the broken link
    pub heading: String,
    /// Broken token as written
    pub original: String,
    /// Proposed replacement token
    pub replacement: String,
}

/// Result of a fix collection pass; nothing is ever applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoFixReport {
    /// Document the pass ran over
    pub document_path: String,
    /// Whether the caller asked for a dry run
    pub dry_run: bool,
    /// Collected replacement candidates
    pub fixes: Vec<SuggestedLinkFix>,
    /// Tokens actually rewritten; always empty (see module docs)
    pub applied: Vec<String>,
}

fn score(valid: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            ((100.0 * valid as f64 / total as f64).round()) as u8
        }
    }
}

fn recommendations_for(score: u8, broken: usize) -> Vec<String> {
    if score < 50 {
        vec![format!(
            "Critical: {broken} broken links; repair before relying on references"
        )]
    } else if score < 80 {
        vec![format!("Needs attention: {broken} broken links remain")]
    } else if broken > 0 {
        vec![format!("Mostly healthy: {broken} broken links left")]
    } else {
        Vec::new()
    }
}

/// Validate every reference in one document, grouped by heading
///
/// # Errors
/// [`AddressingError::DocumentNotFound`] when the document itself is absent;
/// provider infrastructure failures propagate.
pub async fn validate_document_links(
    path: &str,
    provider: &dyn DocumentProvider,
) -> Result<DocumentLinkReport> {
    let document_path = normalize_document_path(path)?;
    let document = provider
        .get_document(&document_path)
        .await?
        .ok_or_else(|| AddressingError::DocumentNotFound {
            path: document_path.clone(),
        })?;

    let mut total = 0;
    let mut valid = 0;
    let mut broken_links = Vec::new();

    for heading in &document.headings {
        let Some(content) = provider
            .get_section_content(&document_path, &heading.slug)
            .await?
        else {
            continue;
        };

        for token in extract_references(&content) {
            total += 1;
            let result = validate_single_link(&token, &document_path, provider).await;
            if result.is_valid {
                valid += 1;
            } else {
                broken_links.push(BrokenLink {
                    heading: heading.slug.clone(),
                    result,
                });
            }
        }
    }

    let health_score = score(valid, total);
    Ok(DocumentLinkReport {
        recommendations: recommendations_for(health_score, broken_links.len()),
        document_path,
        total_links: total,
        valid_links: valid,
        broken_links,
        health_score,
    })
}

/// Aggregate link health across the corpus
///
/// `path_filter` keeps only documents whose path contains the filter.
///
/// # Errors
/// Provider infrastructure failures propagate; per-document analysis
/// failures are skipped so one unreadable document cannot hide the rest.
pub async fn validate_system_links(
    provider: &dyn DocumentProvider,
    path_filter: Option<&str>,
) -> Result<SystemLinkReport> {
    let listing = provider.list_documents().await?;

    let mut documents_scanned = 0;
    let mut total_links = 0;
    let mut valid_links = 0;
    let mut per_document: Vec<(String, usize)> = Vec::new();
    let mut categories: IndexMap<String, usize> = IndexMap::new();

    for info in listing {
        if let Some(filter) = path_filter {
            if !info.path.contains(filter) {
                continue;
            }
        }

        let report = match validate_document_links(&info.path, provider).await {
            Ok(report) => report,
            Err(err) => {
                debug!(path = %info.path, error = %err, "skipping unanalyzable document");
                continue;
            }
        };

        documents_scanned += 1;
        total_links += report.total_links;
        valid_links += report.valid_links;

        if !report.broken_links.is_empty() {
            per_document.push((report.document_path.clone(), report.broken_links.len()));
        }
        for broken in &report.broken_links {
            let message = broken.result.error.as_deref().unwrap_or_default();
            let bucket = CATEGORIES
                .iter()
                .find(|category| message.contains(*category))
                .copied()
                .unwrap_or("Other");
            *categories.entry(bucket.to_string()).or_insert(0) += 1;
        }
    }

    per_document.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    per_document.truncate(5);

    Ok(SystemLinkReport {
        documents_scanned,
        total_links,
        broken_links: total_links - valid_links,
        system_health: score(valid_links, total_links),
        most_broken_documents: per_document,
        categories,
    })
}

/// Collect suggested replacements for a document's broken links
///
/// Never mutates content: replacement application is an explicitly
/// unimplemented path, so `applied` stays empty even when `dry_run` is
/// false.
///
/// # Errors
/// As [`validate_document_links`].
pub async fn auto_fix_links(
    path: &str,
    provider: &dyn DocumentProvider,
    dry_run: bool,
) -> Result<AutoFixReport> {
    let report = validate_document_links(path, provider).await?;

    let mut fixes = Vec::new();
    for broken in &report.broken_links {
        let Some(candidate) = broken.result.suggestions.first() else {
            continue;
        };

        // Candidates are either document paths or section slugs
        let replacement = if candidate.starts_with('/') {
            format!("@{candidate}")
        } else if let Some((doc_part, _)) = broken.result.link_text.split_once('#') {
            format!("{doc_part}#{candidate}")
        } else {
            format!("@#{candidate}")
        };

        fixes.push(SuggestedLinkFix {
            heading: broken.heading.clone(),
            original: broken.result.link_text.clone(),
            replacement,
        });
    }

    if !dry_run && !fixes.is_empty() {
        debug!(
            path = %report.document_path,
            fixes = fixes.len(),
            "fix application is not implemented; returning suggestions only"
        );
    }

    Ok(AutoFixReport {
        document_path: report.document_path,
        dry_run,
        fixes,
        applied: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdspace_testing::InMemoryProvider;
    use pretty_assertions::assert_eq;

    fn corpus() -> InMemoryProvider {
        let provider = InMemoryProvider::new();
        provider.insert_document(
            "/guide.md",
            concat!(
                "# Guide\n\n",
                "## Links\n\n",
                "Good: @/api/auth.md#login and @#links.\n",
                "Bad: @/api/auth.md#logout and @/ghost.md.\n",
            ),
        );
        provider.insert_document(
            "/api/auth.md",
            "# Auth\n\n## Login\n\nCredentials. See @/guide.md.\n",
        );
        provider
    }

    #[tokio::test]
    async fn health_score_counts_valid_over_total() {
        let provider = corpus();
        let report = validate_document_links("/guide.md", &provider).await.unwrap();

        assert_eq!(report.total_links, 4);
        assert_eq!(report.valid_links, 2);
        assert_eq!(report.health_score, 50);
        assert_eq!(report.broken_links.len(), 2);
        assert!(report.broken_links.iter().all(|b| b.heading == "links"));
        assert!(!report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn zero_links_is_vacuously_healthy() {
        let provider = InMemoryProvider::new();
        provider.insert_document("/plain.md", "# Plain\n\nNo links here.\n");

        let report = validate_document_links("/plain.md", &provider).await.unwrap();
        assert_eq!(report.total_links, 0);
        assert_eq!(report.health_score, 100);
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn three_of_four_valid_scores_75() {
        let provider = InMemoryProvider::new();
        provider.insert_document(
            "/doc.md",
            "# Doc\n\n## Body\n\n@/a.md @/b.md @/c.md @/ghost.md\n",
        );
        for path in ["/a.md", "/b.md", "/c.md"] {
            provider.insert_document(path, "# X\n\nBody.\n");
        }

        let report = validate_document_links("/doc.md", &provider).await.unwrap();
        assert_eq!(report.health_score, 75);
    }

    #[tokio::test]
    async fn missing_document_errors_out() {
        let provider = InMemoryProvider::new();
        let err = validate_document_links("/ghost.md", &provider).await.unwrap_err();
        assert_eq!(err.code(), "DOCUMENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn system_report_buckets_and_ranks() {
        let provider = corpus();
        let report = validate_system_links(&provider, None).await.unwrap();

        assert_eq!(report.documents_scanned, 2);
        assert_eq!(report.total_links, 5);
        assert_eq!(report.broken_links, 2);
        assert_eq!(
            report.most_broken_documents,
            vec![("/guide.md".to_string(), 2)]
        );
        assert_eq!(report.categories.get("Missing Section"), Some(&1));
        assert_eq!(report.categories.get("Missing Document"), Some(&1));
    }

    #[tokio::test]
    async fn system_report_honors_path_filter() {
        let provider = corpus();
        let report = validate_system_links(&provider, Some("/api/")).await.unwrap();
        assert_eq!(report.documents_scanned, 1);
        assert_eq!(report.broken_links, 0);
        assert_eq!(report.system_health, 100);
    }

    #[tokio::test]
    async fn auto_fix_collects_but_never_applies() {
        let provider = corpus();
        let report = auto_fix_links("/guide.md", &provider, false).await.unwrap();

        assert!(report.applied.is_empty());
        assert!(report
            .fixes
            .iter()
            .any(|fix| fix.original == "@/api/auth.md#logout"
                && fix.replacement == "@/api/auth.md#login"));

        // Content untouched
        let source = provider.raw("/guide.md").unwrap();
        assert!(source.contains("@/api/auth.md#logout"));
    }
}
