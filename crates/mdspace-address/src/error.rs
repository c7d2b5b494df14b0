//! Error taxonomy for addressing, reference, and task operations
//!
//! One base enum covers every failure kind the core surfaces. Each variant
//! carries structured context so calling tools can render recovery guidance
//! without extra round trips, and maps to a stable machine-readable code via
//! [`AddressingError::code`].
//!
//! Propagation policy:
//! - Address-parsing failures propagate immediately.
//! - Per-reference loading failures are swallowed and logged upstream.
//! - "Found problems" in validation are report data, never errors.

use mdspace_provider::ProviderError;
use serde::Serialize;

/// Base error for the mdspace core
#[derive(Debug, Clone, thiserror::Error)]
pub enum AddressingError {
    /// Document does not exist
    #[error("document not found: {path}")]
    DocumentNotFound {
        /// Requested document path
        path: String,
    },

    /// Section does not exist within an existing document
    #[error("section not found: {slug} in {document_path}")]
    SectionNotFound {
        /// Document the lookup ran against
        document_path: String,
        /// Requested section slug
        slug: String,
        /// Sections that do exist, for recovery guidance
        available: Vec<String>,
    },

    /// Input cannot be parsed into a valid address
    #[error("invalid address '{input}': {reason}")]
    InvalidAddress {
        /// Raw caller input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Section address is valid but not under the tasks heading
    #[error("section '{slug}' in {document_path} is not a task")]
    NotATask {
        /// Document containing the section
        document_path: String,
        /// Section slug that failed the tasks-descendant check
        slug: String,
    },

    /// Task section is missing or empty
    #[error("task not found: {slug} in {document_path}")]
    TaskNotFound {
        /// Document the lookup ran against
        document_path: String,
        /// Task slug (relative to the tasks heading)
        slug: String,
    },

    /// Document lacks a depth-1 title heading required for task setup
    #[error("document {document_path} has no title heading")]
    NoTitleHeading {
        /// Offending document
        document_path: String,
    },

    /// Task creation failed
    #[error("task creation failed in {document_path}: {reason}")]
    TaskCreateFailed {
        /// Target document
        document_path: String,
        /// Failure detail
        reason: String,
    },

    /// Task edit failed
    #[error("task edit failed for {slug} in {document_path}: {reason}")]
    TaskEditFailed {
        /// Target document
        document_path: String,
        /// Task slug
        slug: String,
        /// Failure detail
        reason: String,
    },

    /// Task enumeration failed
    #[error("task listing failed for {document_path}: {reason}")]
    TaskListFailed {
        /// Target document
        document_path: String,
        /// Failure detail
        reason: String,
    },

    /// Task completion failed
    #[error("task completion failed for {slug} in {document_path}: {reason}")]
    TaskCompleteFailed {
        /// Target document
        document_path: String,
        /// Task slug
        slug: String,
        /// Failure detail
        reason: String,
    },

    /// Analysis produced partial results before failing
    #[error("analysis of {document_path} halted: {reason}")]
    DocumentAnalysisError {
        /// Document under analysis
        document_path: String,
        /// Failure detail
        reason: String,
    },

    /// Provider infrastructure failure
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Serializable error payload surfaced to calling tools
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Human-readable message
    pub message: String,
    /// Stable machine-readable code
    pub code: &'static str,
    /// Structured recovery context
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl AddressingError {
    /// Stable machine-readable code for this error kind
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            Self::SectionNotFound { .. } => "SECTION_NOT_FOUND",
            Self::InvalidAddress { .. } => "INVALID_ADDRESS",
            Self::NotATask { .. } => "NOT_A_TASK",
            Self::TaskNotFound { .. } => "TASK_NOT_FOUND",
            Self::NoTitleHeading { .. } => "NO_TITLE_HEADING",
            Self::TaskCreateFailed { .. } => "TASK_CREATE_FAILED",
            Self::TaskEditFailed { .. } => "TASK_EDIT_FAILED",
            Self::TaskListFailed { .. } => "TASK_LIST_FAILED",
            Self::TaskCompleteFailed { .. } => "TASK_COMPLETE_FAILED",
            Self::DocumentAnalysisError { .. } => "DOCUMENT_ANALYSIS_ERROR",
            Self::Provider(_) => "PROVIDER_ERROR",
        }
    }

    /// Structured context entries for programmatic recovery
    #[must_use]
    pub fn context(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::DocumentNotFound { path } => vec![("path", path.clone())],
            Self::SectionNotFound {
                document_path,
                slug,
                available,
            } => vec![
                ("documentPath", document_path.clone()),
                ("slug", slug.clone()),
                ("availableSections", available.join(", ")),
            ],
            Self::InvalidAddress { input, reason } => vec![
                ("input", input.clone()),
                ("reason", reason.clone()),
            ],
            Self::NotATask {
                document_path,
                slug,
            }
            | Self::TaskNotFound {
                document_path,
                slug,
            } => vec![
                ("documentPath", document_path.clone()),
                ("slug", slug.clone()),
            ],
            Self::NoTitleHeading { document_path } => {
                vec![("documentPath", document_path.clone())]
            }
            Self::TaskCreateFailed {
                document_path,
                reason,
            }
            | Self::TaskListFailed {
                document_path,
                reason,
            }
            | Self::DocumentAnalysisError {
                document_path,
                reason,
            } => vec![
                ("documentPath", document_path.clone()),
                ("reason", reason.clone()),
            ],
            Self::TaskEditFailed {
                document_path,
                slug,
                reason,
            }
            | Self::TaskCompleteFailed {
                document_path,
                slug,
                reason,
            } => vec![
                ("documentPath", document_path.clone()),
                ("slug", slug.clone()),
                ("reason", reason.clone()),
            ],
            Self::Provider(err) => vec![("detail", err.to_string())],
        }
    }

    /// Payload shape consumed by the tool layer
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        let context = self
            .context()
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();

        ErrorPayload {
            message: self.to_string(),
            code: self.code(),
            context,
        }
    }
}

/// Convenience alias used across the core crates
pub type Result<T> = std::result::Result<T, AddressingError>;
