//! View types produced by task enumeration

use crate::status::TaskStatus;
use indexmap::IndexMap;
use mdspace_refs::HierarchicalContent;
use mdspace_slug::{parent_slug, split_slug};
use serde::Serialize;

/// Structural context derived from a hierarchical task slug
///
/// Computed purely from the slug relative to the `tasks` heading; present
/// only when that slug contains `/`. For `backend/auth/jwt` the phase is
/// `backend`, the category `auth`, and the task name `jwt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchicalContext {
    /// Full slug relative to the tasks heading
    pub full_path: String,
    /// Parent slug, when the task is nested more than one level
    pub parent_path: Option<String>,
    /// First slug component
    pub phase: String,
    /// Second component, when at least three are present
    pub category: Option<String>,
    /// Final slug component
    pub task_name: String,
    /// Component count
    pub depth: usize,
}

impl HierarchicalContext {
    /// Derive context from a task slug, or `None` for flat slugs
    #[must_use]
    pub fn from_task_slug(slug: &str) -> Option<Self> {
        let parts = split_slug(slug);
        if parts.len() < 2 {
            return None;
        }
        Some(Self {
            full_path: slug.to_string(),
            parent_path: parent_slug(slug).map(str::to_string),
            phase: parts[0].to_string(),
            category: (parts.len() >= 3).then(|| parts[1].to_string()),
            task_name: parts[parts.len() - 1].to_string(),
            depth: parts.len(),
        })
    }
}

/// One task as seen by enumeration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskViewData {
    /// Slug relative to the tasks heading
    pub slug: String,
    /// Heading title
    pub title: String,
    /// Parsed status field
    pub status: TaskStatus,
    /// `Link:` field, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// `Dependencies:` field entries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Present when the slug is hierarchical
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchical_context: Option<HierarchicalContext>,
    /// Loaded reference trees, when loading was requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub referenced_documents: Vec<HierarchicalContent>,
}

/// Phase/category roll-up over hierarchical tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchicalSummary {
    /// Task counts per phase, in first-seen order
    pub phase_counts: IndexMap<String, usize>,
    /// Task counts per category, in first-seen order
    pub category_counts: IndexMap<String, usize>,
    /// Incomplete hierarchical task slugs, lexicographically ordered
    pub critical_path: Vec<String>,
}

/// Result of a task enumeration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskListing {
    /// Document the tasks were read from
    pub document_path: String,
    /// Tasks in document order, after any status filter
    pub tasks: Vec<TaskViewData>,
    /// Slug of the first actionable task, in document order
    pub next_task: Option<String>,
    /// Present when any listed task slug is hierarchical
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchical_summary: Option<HierarchicalSummary>,
}

impl TaskListing {
    pub(crate) fn summarize(&mut self) {
        self.next_task = self
            .tasks
            .iter()
            .find(|task| task.status.is_actionable())
            .map(|task| task.slug.clone());

        if !self.tasks.iter().any(|t| t.hierarchical_context.is_some()) {
            self.hierarchical_summary = None;
            return;
        }

        let mut phase_counts: IndexMap<String, usize> = IndexMap::new();
        let mut category_counts: IndexMap<String, usize> = IndexMap::new();
        let mut critical_path: Vec<String> = Vec::new();

        for task in &self.tasks {
            let Some(context) = &task.hierarchical_context else {
                continue;
            };
            *phase_counts.entry(context.phase.clone()).or_insert(0) += 1;
            if let Some(category) = &context.category {
                *category_counts.entry(category.clone()).or_insert(0) += 1;
            }
            if !task.status.is_complete() {
                critical_path.push(task.slug.clone());
            }
        }
        critical_path.sort();

        self.hierarchical_summary = Some(HierarchicalSummary {
            phase_counts,
            category_counts,
            critical_path,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flat_slug_has_no_context() {
        assert_eq!(HierarchicalContext::from_task_slug("ship"), None);
    }

    #[test]
    fn two_level_slug_yields_phase_and_name() {
        let context = HierarchicalContext::from_task_slug("backend/auth").unwrap();
        assert_eq!(context.phase, "backend");
        assert_eq!(context.category, None);
        assert_eq!(context.task_name, "auth");
        assert_eq!(context.parent_path.as_deref(), Some("backend"));
        assert_eq!(context.depth, 2);
    }

    #[test]
    fn three_level_slug_adds_category() {
        let context = HierarchicalContext::from_task_slug("backend/auth/jwt").unwrap();
        assert_eq!(context.phase, "backend");
        assert_eq!(context.category.as_deref(), Some("auth"));
        assert_eq!(context.task_name, "jwt");
        assert_eq!(context.parent_path.as_deref(), Some("backend/auth"));
    }

    fn task(slug: &str, status: TaskStatus) -> TaskViewData {
        TaskViewData {
            slug: slug.to_string(),
            title: slug.to_string(),
            status,
            link: None,
            dependencies: Vec::new(),
            hierarchical_context: HierarchicalContext::from_task_slug(slug),
            referenced_documents: Vec::new(),
        }
    }

    #[test]
    fn next_task_is_first_actionable_in_document_order() {
        let mut listing = TaskListing {
            document_path: "/plan.md".to_string(),
            tasks: vec![
                task("one", TaskStatus::Completed),
                task("two", TaskStatus::Pending),
                task("three", TaskStatus::Blocked),
            ],
            next_task: None,
            hierarchical_summary: None,
        };
        listing.summarize();
        assert_eq!(listing.next_task.as_deref(), Some("two"));
        assert!(listing.hierarchical_summary.is_none());
    }

    #[test]
    fn summary_counts_phases_and_sorts_critical_path() {
        let mut listing = TaskListing {
            document_path: "/plan.md".to_string(),
            tasks: vec![
                task("backend/db/schema", TaskStatus::Completed),
                task("frontend/forms", TaskStatus::Pending),
                task("backend/auth/jwt", TaskStatus::InProgress),
            ],
            next_task: None,
            hierarchical_summary: None,
        };
        listing.summarize();

        let summary = listing.hierarchical_summary.unwrap();
        assert_eq!(summary.phase_counts["backend"], 2);
        assert_eq!(summary.phase_counts["frontend"], 1);
        assert_eq!(summary.category_counts["db"], 1);
        assert_eq!(summary.category_counts["auth"], 1);
        assert_eq!(
            summary.critical_path,
            vec!["backend/auth/jwt", "frontend/forms"]
        );
        assert_eq!(listing.next_task.as_deref(), Some("frontend/forms"));
    }
}
