//! mdspace link validator
//!
//! Validates `@reference` links in a document or across a corpus, scores
//! link health, and proposes fixes. Broken links are report data, never
//! errors; errors are reserved for infrastructure failures.

#![warn(unreachable_pub)]

mod classify;
mod report;
mod validate;

pub use classify::{classify_link, LinkKind};
pub use report::{
    auto_fix_links, validate_document_links, validate_system_links, AutoFixReport, BrokenLink,
    DocumentLinkReport, SuggestedLinkFix, SystemLinkReport,
};
pub use validate::{validate_single_link, LinkValidationResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
