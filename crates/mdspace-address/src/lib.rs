//! mdspace addressing system
//!
//! Parses raw path/section/task strings into validated, normalized address
//! values; owns the batch-scoped address cache and the error taxonomy shared
//! by every mdspace crate.
//!
//! # Example
//!
//! ```
//! use mdspace_address::AddressCache;
//!
//! let cache = AddressCache::new();
//! let section = cache.section("@/api/auth.md#login", None)?;
//! assert_eq!(section.full_path, "/api/auth.md#login");
//! # Ok::<(), mdspace_address::AddressingError>(())
//! ```

#![warn(unreachable_pub)]

mod address;
mod cache;
mod error;

pub use address::{
    namespace_of, normalize_document_path, parse_document_address, parse_section_address,
    parse_task_address, DocumentAddress, SectionAddress, TaskAddress, TASKS_SLUG,
};
pub use cache::{AddressCache, AddressCacheConfig, AddressCacheStats};
pub use error::{AddressingError, ErrorPayload, Result};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
