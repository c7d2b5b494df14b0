//! Batch-scoped address cache
//!
//! [`AddressCache`] is an explicit handle owned by the caller's batch or
//! request scope, not an ambient global. Entries expire after a
//! time-to-idle window, which bounds memory without an eviction policy:
//! parsing is idempotent and cheap to redo, so the cache is a performance
//! optimization, never a source of truth.

use crate::address::{
    normalize_document_path, parse_document_address, parse_section_address, parse_task_address,
    DocumentAddress, SectionAddress, TaskAddress,
};
use crate::error::Result;
use moka::sync::Cache;
use std::time::Duration;
use tracing::debug;

/// Configuration for the batch cache
#[derive(Debug, Clone, Copy)]
pub struct AddressCacheConfig {
    /// Maximum cached entries per address kind
    pub capacity: u64,
    /// Inactivity window after which entries lapse
    pub idle_window: Duration,
}

impl Default for AddressCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 4_096,
            idle_window: Duration::from_secs(30),
        }
    }
}

/// Statistics snapshot for monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressCacheStats {
    /// Cached document addresses
    pub documents: u64,
    /// Cached section addresses
    pub sections: u64,
}

/// Batch-scoped cache of parsed addresses
///
/// Safe for concurrent read/insert; entries are small value types keyed by
/// normalized strings. Clone shares the underlying cache.
#[derive(Debug, Clone)]
pub struct AddressCache {
    documents: Cache<String, DocumentAddress>,
    sections: Cache<String, SectionAddress>,
}

impl AddressCache {
    /// Create a cache with explicit configuration
    #[must_use]
    pub fn with_config(config: AddressCacheConfig) -> Self {
        Self {
            documents: Cache::builder()
                .max_capacity(config.capacity)
                .time_to_idle(config.idle_window)
                .build(),
            sections: Cache::builder()
                .max_capacity(config.capacity)
                .time_to_idle(config.idle_window)
                .build(),
        }
    }

    /// Create a cache with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AddressCacheConfig::default())
    }

    /// Parse a document address, consulting the cache by normalized path
    ///
    /// # Errors
    /// Propagates parsing failures; failed parses are never cached.
    pub fn document(&self, raw: &str) -> Result<DocumentAddress> {
        let key = normalize_document_path(raw)?;
        if let Some(hit) = self.documents.get(&key) {
            return Ok(hit);
        }

        let address = parse_document_address(&key)?;
        self.documents.insert(key, address.clone());
        Ok(address)
    }

    /// Parse a section address, consulting the cache by full path
    ///
    /// # Errors
    /// Propagates parsing failures; failed parses are never cached.
    pub fn section(&self, reference: &str, context_doc: Option<&str>) -> Result<SectionAddress> {
        let address = parse_section_address(reference, context_doc)?;
        if let Some(hit) = self.sections.get(&address.cache_key) {
            return Ok(hit);
        }

        self.sections
            .insert(address.cache_key.clone(), address.clone());
        Ok(address)
    }

    /// Parse a task address; cached through the section cache
    ///
    /// # Errors
    /// As [`AddressCache::section`], plus the tasks-descendant assertion.
    pub fn task(&self, reference: &str, context_doc: Option<&str>) -> Result<TaskAddress> {
        let task = parse_task_address(reference, context_doc)?;
        self.sections
            .insert(task.section.cache_key.clone(), task.section.clone());
        Ok(task)
    }

    /// Drop the cached document and every section entry under it
    ///
    /// Must be called after any external mutation of the document, or stale
    /// addresses will be served for the rest of the idle window.
    pub fn invalidate_document(&self, path: &str) {
        let Ok(key) = normalize_document_path(path) else {
            // Nothing valid could have been cached under an invalid path
            return;
        };

        self.documents.invalidate(&key);

        let section_prefix = format!("{key}#");
        for (section_key, _) in self.sections.iter() {
            if section_key.starts_with(&section_prefix) {
                self.sections.invalidate(&*section_key);
            }
        }
        debug!(path = %key, "invalidated cached addresses");
    }

    /// Deterministically clear everything at batch-scope exit
    pub fn clear(&self) {
        self.documents.invalidate_all();
        self.sections.invalidate_all();
    }

    /// Entry-count snapshot
    #[must_use]
    pub fn stats(&self) -> AddressCacheStats {
        self.documents.run_pending_tasks();
        self.sections.run_pending_tasks();
        AddressCacheStats {
            documents: self.documents.entry_count(),
            sections: self.sections.entry_count(),
        }
    }
}

impl Default for AddressCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_parses_are_cached_by_normalized_key() {
        let cache = AddressCache::new();

        let first = cache.document("guide").unwrap();
        let second = cache.document("//guide.md").unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.stats().documents, 1);
    }

    #[test]
    fn failed_parses_are_not_cached() {
        let cache = AddressCache::new();
        assert!(cache.document("..").is_err());
        assert_eq!(cache.stats().documents, 0);
    }

    #[test]
    fn section_entries_are_keyed_by_full_path() {
        let cache = AddressCache::new();
        cache.section("#setup", Some("/guide.md")).unwrap();
        cache.section("/guide.md#setup", None).unwrap();
        assert_eq!(cache.stats().sections, 1);
    }

    #[test]
    fn invalidate_document_drops_its_sections_only() {
        let cache = AddressCache::new();
        cache.document("/guide.md").unwrap();
        cache.section("/guide.md#setup", None).unwrap();
        cache.section("/guide.md#tasks/one", None).unwrap();
        cache.section("/other.md#setup", None).unwrap();

        cache.invalidate_document("guide");

        let stats = cache.stats();
        assert_eq!(stats.documents, 0);
        assert_eq!(stats.sections, 1);
    }

    #[test]
    fn clear_empties_both_caches() {
        let cache = AddressCache::new();
        cache.document("/a.md").unwrap();
        cache.section("/a.md#x", None).unwrap();

        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.documents, 0);
        assert_eq!(stats.sections, 0);
    }

    #[test]
    fn idle_window_expires_entries_lazily() {
        let cache = AddressCache::with_config(AddressCacheConfig {
            capacity: 16,
            idle_window: Duration::from_millis(10),
        });

        cache.document("/a.md").unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.stats().documents, 0);
    }

    #[test]
    fn task_parses_populate_the_section_cache() {
        let cache = AddressCache::new();
        let task = cache.task("#tasks/setup", Some("/guide.md")).unwrap();
        assert_eq!(task.task_slug(), "setup");
        assert_eq!(cache.stats().sections, 1);
    }
}
