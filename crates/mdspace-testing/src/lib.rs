//! In-memory document provider and fixtures
//!
//! Backs the core crates' tests with a [`DocumentProvider`] over plain
//! markdown strings: headings are scanned on every read (the store itself
//! is the source of truth), mutations splice byte spans, and cache
//! invalidation calls are recorded for assertions.

#![warn(unreachable_pub)]

mod scan;

use async_trait::async_trait;
use dashmap::DashMap;
use mdspace_address::{namespace_of, normalize_document_path};
use mdspace_provider::{
    Document, DocumentInfo, DocumentMetadata, DocumentProvider, Heading, InsertMode,
    ProviderError, WriteOptions,
};
use scan::scan;
use std::sync::Mutex;

/// Provider over an in-memory map of markdown sources
///
/// Documents are keyed by normalized path. Reads parse on demand; mutations
/// rewrite the stored source in place.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    documents: DashMap<String, String>,
    invalidations: Mutex<Vec<String>>,
}

impl InMemoryProvider {
    /// Empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document, replacing any previous content
    ///
    /// # Panics
    /// Panics on unnormalizable paths; fixtures should use valid ones.
    pub fn insert_document(&self, path: &str, source: &str) {
        let key = normalize_document_path(path).expect("fixture path must normalize");
        self.documents.insert(key, source.to_string());
    }

    /// Raw stored source, for splice assertions
    #[must_use]
    pub fn raw(&self, path: &str) -> Option<String> {
        let key = normalize_document_path(path).ok()?;
        self.documents.get(&key).map(|entry| entry.clone())
    }

    /// Paths passed to `invalidate_document`, in call order
    #[must_use]
    pub fn invalidations(&self) -> Vec<String> {
        self.invalidations
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn lookup(&self, path: &str) -> Option<String> {
        let key = normalize_document_path(path).ok()?;
        self.documents.get(&key).map(|entry| entry.clone())
    }
}

#[async_trait]
impl DocumentProvider for InMemoryProvider {
    async fn get_document(&self, path: &str) -> Result<Option<Document>, ProviderError> {
        let Some(source) = self.lookup(path) else {
            return Ok(None);
        };
        let scanned = scan(&source);
        let normalized = normalize_document_path(path)
            .map_err(|err| ProviderError::Backend(err.to_string()))?;

        Ok(Some(Document {
            metadata: DocumentMetadata {
                path: normalized,
                title: scanned.title().map(str::to_string),
                frontmatter: scanned.frontmatter.clone(),
            },
            headings: scanned
                .headings
                .iter()
                .map(|h| Heading {
                    slug: h.slug.clone(),
                    title: h.title.clone(),
                    depth: h.depth,
                })
                .collect(),
        }))
    }

    async fn get_document_content(&self, path: &str) -> Result<Option<String>, ProviderError> {
        let Some(source) = self.lookup(path) else {
            return Ok(None);
        };
        let scanned = scan(&source);
        Ok(Some(source[scanned.body_offset..].to_string()))
    }

    async fn get_section_content(
        &self,
        path: &str,
        slug: &str,
    ) -> Result<Option<String>, ProviderError> {
        let Some(source) = self.lookup(path) else {
            return Ok(None);
        };
        let scanned = scan(&source);
        Ok(scanned
            .heading(slug)
            .map(|h| source[h.body_start..h.body_end].trim_matches('\n').to_string()))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentInfo>, ProviderError> {
        let mut entries: Vec<DocumentInfo> = self
            .documents
            .iter()
            .map(|entry| {
                let path = entry.key().clone();
                let title = scan(entry.value()).title().map(str::to_string);
                DocumentInfo {
                    namespace: namespace_of(&path),
                    title,
                    path,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn update_section(
        &self,
        path: &str,
        slug: &str,
        content: &str,
        options: WriteOptions,
    ) -> Result<(), ProviderError> {
        let key = normalize_document_path(path)
            .map_err(|err| ProviderError::Backend(err.to_string()))?;
        let Some(mut entry) = self.documents.get_mut(&key) else {
            return Err(ProviderError::InvalidTarget {
                path: path.to_string(),
                slug: slug.to_string(),
            });
        };

        let source = entry.clone();
        let scanned = scan(&source);
        let Some(heading) = scanned.heading(slug) else {
            return Err(ProviderError::InvalidTarget {
                path: path.to_string(),
                slug: slug.to_string(),
            });
        };

        let mut replacement = String::from("\n");
        let body = content.trim_matches('\n');
        if !body.is_empty() {
            replacement.push_str(body);
            replacement.push('\n');
        }
        replacement.push('\n');

        let mut next = String::with_capacity(source.len());
        next.push_str(&source[..heading.body_start]);
        next.push_str(&replacement);
        next.push_str(&source[heading.body_end..]);
        if options.ensure_trailing_newline && !next.ends_with('\n') {
            next.push('\n');
        }

        *entry = next;
        Ok(())
    }

    async fn insert_section(
        &self,
        path: &str,
        anchor_slug: &str,
        mode: InsertMode,
        depth: Option<u8>,
        title: &str,
        content: &str,
        options: WriteOptions,
    ) -> Result<(), ProviderError> {
        let key = normalize_document_path(path)
            .map_err(|err| ProviderError::Backend(err.to_string()))?;
        let Some(mut entry) = self.documents.get_mut(&key) else {
            return Err(ProviderError::InvalidTarget {
                path: path.to_string(),
                slug: anchor_slug.to_string(),
            });
        };

        let source = entry.clone();
        let scanned = scan(&source);
        let Some(anchor) = scanned.heading(anchor_slug) else {
            return Err(ProviderError::InvalidTarget {
                path: path.to_string(),
                slug: anchor_slug.to_string(),
            });
        };

        let (offset, default_depth) = match mode {
            InsertMode::InsertBefore => (anchor.line_start, anchor.depth),
            InsertMode::InsertAfter => (anchor.subtree_end, anchor.depth),
            InsertMode::AppendChild => (anchor.subtree_end, anchor.depth + 1),
        };
        let level = depth.unwrap_or(default_depth).clamp(1, 6) as usize;

        let mut snippet = String::new();
        if offset > 0 && !source[..offset].ends_with('\n') {
            snippet.push('\n');
        }
        snippet.push_str(&"#".repeat(level));
        snippet.push(' ');
        snippet.push_str(title);
        snippet.push_str("\n\n");
        let body = content.trim_matches('\n');
        if !body.is_empty() {
            snippet.push_str(body);
            snippet.push_str("\n\n");
        }

        let mut next = String::with_capacity(source.len() + snippet.len());
        next.push_str(&source[..offset]);
        next.push_str(&snippet);
        next.push_str(&source[offset..]);
        if options.ensure_trailing_newline && !next.ends_with('\n') {
            next.push('\n');
        }

        *entry = next;
        Ok(())
    }

    async fn invalidate_document(&self, path: &str) {
        if let Ok(mut log) = self.invalidations.lock() {
            log.push(path.to_string());
        }
    }
}

/// Canned corpora shared across crate tests
pub mod fixtures {
    use super::InMemoryProvider;

    /// A guide with a Tasks section in every status, plus a linked API doc
    #[must_use]
    pub fn guide_with_tasks() -> InMemoryProvider {
        let provider = InMemoryProvider::new();
        provider.insert_document(
            "/guide.md",
            concat!(
                "# Guide\n\n",
                "Read @#setup and @/api/auth.md#login.\n\n",
                "## Setup\n\nInstall the toolchain.\n\n",
                "## Tasks\n\n",
                "### Scaffold\n\n* Status: completed\n\nLay out the repo.\n\n",
                "### Wire Auth\n\n- Status: pending\n- Link: @/api/auth.md#login\n\nHook up login.\n\n",
                "### Ship\n\n**Status:** blocked\n- Dependencies: scaffold, wire-auth\n\nRelease it.\n",
            ),
        );
        provider.insert_document(
            "/api/auth.md",
            "# Auth\n\n## Login\n\nPost credentials to `/login`.\n",
        );
        provider
    }
}
