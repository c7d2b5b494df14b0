//! mdspace reference engine
//!
//! Extracts `@reference` tokens from markdown content, normalizes them
//! against a context document, and recursively loads referenced content
//! into bounded hierarchical trees (cycle-safe, node-capped, depth-capped,
//! time-boxed).
//!
//! # Example
//!
//! ```ignore
//! use mdspace_refs::{extract_references, normalize_references, ReferenceLoader};
//!
//! let tokens = extract_references("Read @#setup and @/api/auth.md#login first.");
//! let refs = normalize_references(&tokens, "/guide.md")?;
//! let tree = ReferenceLoader::new().load_references(&refs, &provider).await;
//! ```

#![warn(unreachable_pub)]

mod extract;
mod loader;
mod normalize;

pub use extract::extract_references;
pub use loader::{
    flatten_hierarchy, hierarchy_stats, HierarchicalContent, HierarchyStats, LoaderLimits,
    ReferenceLoader,
};
pub use normalize::{normalize_reference, normalize_references, NormalizedReference};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
