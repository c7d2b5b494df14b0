//! Document provider boundary
//!
//! The mdspace core never touches disk or network; every read and mutation
//! goes through [`DocumentProvider`]. Implementations own persisted content
//! and its parsed heading structure; the core owns addressing, reference
//! resolution, and task semantics on top.
//!
//! Not-found is modeled as `Ok(None)`, never as an error. Errors are
//! reserved for infrastructure failures (backend unreachable, malformed
//! mutation targets).

#![warn(unreachable_pub)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors raised by provider implementations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Backend infrastructure failure (storage, parser, transport)
    #[error("provider backend error: {0}")]
    Backend(String),

    /// A mutation named a section that cannot anchor the operation
    #[error("invalid mutation target: {slug} in {path}")]
    InvalidTarget {
        /// Document path
        path: String,
        /// Section slug the mutation was anchored to
        slug: String,
    },
}

/// Parsed document: metadata plus its heading table of contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document-level metadata
    pub metadata: DocumentMetadata,
    /// Headings in document order, with hierarchical slugs
    pub headings: Vec<Heading>,
}

impl Document {
    /// Find a heading by its full hierarchical slug
    #[must_use]
    pub fn heading(&self, slug: &str) -> Option<&Heading> {
        self.headings.iter().find(|h| h.slug == slug)
    }

    /// Title heading (first depth-1 heading), if any
    #[must_use]
    pub fn title_heading(&self) -> Option<&Heading> {
        self.headings.iter().find(|h| h.depth == 1)
    }
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Root-relative path, `/`-prefixed, `.md`-suffixed
    pub path: String,
    /// Document title (first H1), if present
    pub title: Option<String>,
    /// YAML frontmatter, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<serde_yaml::Value>,
}

/// A heading within a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Full hierarchical slug (e.g. `tasks/phase-1/setup`)
    pub slug: String,
    /// Heading text as written
    pub title: String,
    /// Markdown heading level (1-6)
    pub depth: u8,
}

/// Listing entry for corpus enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Root-relative path
    pub path: String,
    /// Document title, if known
    pub title: Option<String>,
    /// Folder-derived namespace (`root` for top-level documents)
    pub namespace: String,
}

/// Placement of an inserted section relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// Before the anchor heading
    InsertBefore,
    /// After the anchor section's subtree
    InsertAfter,
    /// At the end of the anchor section's subtree, one level deeper
    AppendChild,
}

/// Options for mutation operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Normalize the written body to end with a single trailing newline
    pub ensure_trailing_newline: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            ensure_trailing_newline: true,
        }
    }
}

/// Abstract document storage consumed by the core
///
/// All methods are suspension points; everything else in the core is
/// synchronous. Implementations must be safe to call concurrently.
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    /// Fetch a document's metadata and heading structure
    async fn get_document(&self, path: &str) -> Result<Option<Document>, ProviderError>;

    /// Fetch a document's full body (after frontmatter)
    async fn get_document_content(&self, path: &str) -> Result<Option<String>, ProviderError>;

    /// Fetch one section's own body (excluding subsection bodies)
    async fn get_section_content(
        &self,
        path: &str,
        slug: &str,
    ) -> Result<Option<String>, ProviderError>;

    /// Enumerate all documents
    async fn list_documents(&self) -> Result<Vec<DocumentInfo>, ProviderError>;

    /// Replace one section's own body
    async fn update_section(
        &self,
        path: &str,
        slug: &str,
        content: &str,
        options: WriteOptions,
    ) -> Result<(), ProviderError>;

    /// Insert a new section relative to an anchor heading
    #[allow(clippy::too_many_arguments)]
    async fn insert_section(
        &self,
        path: &str,
        anchor_slug: &str,
        mode: InsertMode,
        depth: Option<u8>,
        title: &str,
        content: &str,
        options: WriteOptions,
    ) -> Result<(), ProviderError>;

    /// Cache hook the core must call after any structural mutation
    async fn invalidate_document(&self, path: &str);
}
