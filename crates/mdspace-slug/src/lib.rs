//! Hierarchical slug utilities
//!
//! Pure string algorithms for the slug grammar used by markdown addressing:
//! - Component grammar: `[a-z0-9][a-z0-9_-]*[a-z0-9]` (single characters allowed)
//! - Hierarchical slugs join components with `/` (e.g. `api/auth/jwt`)
//!
//! No I/O, no async, no shared state. Everything here is cheap enough to
//! recompute on demand.

#![warn(unreachable_pub)]

mod hierarchy;
mod slug;

pub use hierarchy::HierarchicalSlug;
pub use slug::{
    is_ancestor, is_direct_child, is_valid_component, is_valid_slug_path, join_slugs, parent_slug,
    slug_depth, slugify, split_slug, SlugError,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
