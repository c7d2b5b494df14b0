//! mdspace task operations
//!
//! Task lifecycle over markdown sections nested under a `Tasks` heading:
//! creation, editing, completion, and enumeration with status parsing and
//! hierarchical roll-ups. State is caller-driven; no transition graph is
//! enforced.

#![warn(unreachable_pub)]

mod model;
mod operations;
mod status;

pub use model::{HierarchicalContext, HierarchicalSummary, TaskListing, TaskViewData};
pub use operations::{
    complete_task, create_task, edit_task, ensure_tasks_section, list_tasks, ListTasksOptions,
};
pub use status::{
    extract_dependencies, extract_field, extract_status, update_task_status, FieldMatch,
    FieldStyle, TaskStatus,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
