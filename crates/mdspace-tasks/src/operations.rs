//! Task lifecycle operations over the document provider
//!
//! Every mutation invalidates both the provider's own cache hook and the
//! caller's address cache, so stale addresses are never served after a
//! structural edit. Enumeration failures mid-listing also invalidate
//! before the error propagates.

use crate::model::{HierarchicalContext, TaskListing, TaskViewData};
use crate::status::{extract_dependencies, extract_field, extract_status, update_task_status, TaskStatus};
use chrono::Utc;
use mdspace_address::{AddressCache, AddressingError, DocumentAddress, Result, TASKS_SLUG};
use mdspace_provider::{Document, DocumentProvider, Heading, InsertMode, WriteOptions};
use mdspace_refs::ReferenceLoader;
use mdspace_slug::{is_ancestor, join_slugs, slugify};
use tracing::debug;

/// Knobs for [`list_tasks`]
#[derive(Debug, Clone, Default)]
pub struct ListTasksOptions {
    /// Keep only tasks with this status
    pub status_filter: Option<TaskStatus>,
    /// Resolve `@references` inside each task body (off by default)
    pub load_references: bool,
}

/// Slug under the tasks heading for a possibly-relative task slug
fn full_task_slug(slug: &str) -> String {
    if slug == TASKS_SLUG || is_ancestor(TASKS_SLUG, slug) {
        slug.to_string()
    } else {
        join_slugs(&[TASKS_SLUG, slug])
    }
}

/// Task slug relative to the tasks heading
fn relative_task_slug(slug: &str) -> &str {
    slug.strip_prefix("tasks/").unwrap_or(slug)
}

async fn require_document(
    provider: &dyn DocumentProvider,
    address: &DocumentAddress,
) -> Result<Document> {
    provider
        .get_document(&address.path)
        .await?
        .ok_or_else(|| AddressingError::DocumentNotFound {
            path: address.path.clone(),
        })
}

fn find_tasks_heading(document: &Document) -> Option<&Heading> {
    document
        .headings
        .iter()
        .find(|h| h.slug == TASKS_SLUG || h.title.eq_ignore_ascii_case("tasks"))
}

async fn invalidate(provider: &dyn DocumentProvider, cache: &AddressCache, path: &str) {
    provider.invalidate_document(path).await;
    cache.invalidate_document(path);
}

/// Ensure the document carries a tasks heading, creating one if absent
///
/// Idempotent: an existing heading is matched by slug `tasks` or by a
/// case-insensitive `Tasks` title. A created heading is appended as a
/// child of the document's title heading.
///
/// # Errors
/// `NoTitleHeading` when the heading must be created but the document has
/// no depth-1 heading; `DocumentNotFound` when the document is absent.
pub async fn ensure_tasks_section(
    provider: &dyn DocumentProvider,
    cache: &AddressCache,
    path: &str,
) -> Result<String> {
    let address = cache.document(path)?;
    let document = require_document(provider, &address).await?;

    if let Some(heading) = find_tasks_heading(&document) {
        return Ok(heading.slug.clone());
    }

    let title = document
        .title_heading()
        .ok_or_else(|| AddressingError::NoTitleHeading {
            document_path: address.path.clone(),
        })?;

    provider
        .insert_section(
            &address.path,
            &title.slug,
            InsertMode::AppendChild,
            None,
            "Tasks",
            "",
            WriteOptions::default(),
        )
        .await?;
    invalidate(provider, cache, &address.path).await;
    debug!(path = %address.path, "created tasks section");

    Ok(TASKS_SLUG.to_string())
}

/// Create a task under the tasks heading
///
/// The slug is derived from the title. With `after_slug` the task is
/// inserted after that sibling; otherwise it is appended to the tasks
/// section. Returns the new task's full slug.
///
/// # Errors
/// `TaskCreateFailed` on a degenerate title, a duplicate slug, or a
/// missing anchor sibling; `NoTitleHeading` as per
/// [`ensure_tasks_section`].
pub async fn create_task(
    provider: &dyn DocumentProvider,
    cache: &AddressCache,
    path: &str,
    title: &str,
    content: &str,
    after_slug: Option<&str>,
) -> Result<String> {
    let address = cache.document(path)?;
    let tasks_slug = ensure_tasks_section(provider, cache, &address.path).await?;

    let name = slugify(title);
    if name.is_empty() {
        return Err(AddressingError::TaskCreateFailed {
            document_path: address.path,
            reason: format!("title '{title}' produces an empty slug"),
        });
    }
    let slug = join_slugs(&[&tasks_slug, &name]);

    let document = require_document(provider, &address).await?;
    if document.heading(&slug).is_some() {
        return Err(AddressingError::TaskCreateFailed {
            document_path: address.path,
            reason: format!("task '{name}' already exists"),
        });
    }

    let (anchor, mode) = match after_slug {
        Some(after) => (full_task_slug(after), InsertMode::InsertAfter),
        None => (tasks_slug, InsertMode::AppendChild),
    };

    provider
        .insert_section(
            &address.path,
            &anchor,
            mode,
            None,
            title,
            content,
            WriteOptions::default(),
        )
        .await
        .map_err(|err| AddressingError::TaskCreateFailed {
            document_path: address.path.clone(),
            reason: err.to_string(),
        })?;
    invalidate(provider, cache, &address.path).await;
    debug!(path = %address.path, slug = %slug, "created task");

    Ok(slug)
}

/// Replace a task's body wholesale
///
/// # Errors
/// `TaskNotFound` when no heading carries the slug; `TaskEditFailed` when
/// the provider rejects the write.
pub async fn edit_task(
    provider: &dyn DocumentProvider,
    cache: &AddressCache,
    path: &str,
    slug: &str,
    content: &str,
) -> Result<()> {
    let address = cache.document(path)?;
    let task = cache.task(&full_task_slug(slug), Some(&address.path))?;
    let full = task.section.slug;

    let document = require_document(provider, &address).await?;
    if document.heading(&full).is_none() {
        return Err(AddressingError::TaskNotFound {
            document_path: address.path,
            slug: relative_task_slug(&full).to_string(),
        });
    }

    provider
        .update_section(&address.path, &full, content, WriteOptions::default())
        .await
        .map_err(|err| AddressingError::TaskEditFailed {
            document_path: address.path.clone(),
            slug: relative_task_slug(&full).to_string(),
            reason: err.to_string(),
        })?;
    invalidate(provider, cache, &address.path).await;
    debug!(path = %address.path, slug = %full, "edited task");

    Ok(())
}

/// Mark a task completed, preserving its status-line style
///
/// Rewrites the status field to `completed` with today's date and appends
/// the note. Re-completing accumulates another note block.
///
/// # Errors
/// `TaskNotFound` when the section is missing or empty;
/// `TaskCompleteFailed` when the rewritten body cannot be written back.
pub async fn complete_task(
    provider: &dyn DocumentProvider,
    cache: &AddressCache,
    path: &str,
    slug: &str,
    note: Option<&str>,
) -> Result<()> {
    let address = cache.document(path)?;
    let task = cache.task(&full_task_slug(slug), Some(&address.path))?;
    let full = task.section.slug;

    let content = provider
        .get_section_content(&address.path, &full)
        .await?
        .filter(|body| !body.trim().is_empty())
        .ok_or_else(|| AddressingError::TaskNotFound {
            document_path: address.path.clone(),
            slug: relative_task_slug(&full).to_string(),
        })?;

    let updated = update_task_status(
        &content,
        &TaskStatus::Completed,
        note,
        Utc::now().date_naive(),
    );

    provider
        .update_section(&address.path, &full, &updated, WriteOptions::default())
        .await
        .map_err(|err| AddressingError::TaskCompleteFailed {
            document_path: address.path.clone(),
            slug: relative_task_slug(&full).to_string(),
            reason: err.to_string(),
        })?;
    invalidate(provider, cache, &address.path).await;
    debug!(path = %address.path, slug = %full, "completed task");

    Ok(())
}

/// Enumerate tasks under the tasks heading in document order
///
/// A document without a tasks heading yields an empty listing. Status,
/// `Link:`, and `Dependencies:` fields are parsed from each body; an
/// absent status reads as `pending`. Reference loading is opt-in.
///
/// # Errors
/// `DocumentNotFound` when the document is absent; `TaskListFailed` when a
/// body read fails mid-enumeration, after a best-effort cache
/// invalidation for the document.
pub async fn list_tasks(
    provider: &dyn DocumentProvider,
    cache: &AddressCache,
    path: &str,
    options: ListTasksOptions,
) -> Result<TaskListing> {
    let address = cache.document(path)?;
    let document = require_document(provider, &address).await?;

    let mut listing = TaskListing {
        document_path: address.path.clone(),
        tasks: Vec::new(),
        next_task: None,
        hierarchical_summary: None,
    };

    let Some(tasks_heading) = find_tasks_heading(&document) else {
        return Ok(listing);
    };

    let loader = ReferenceLoader::new();
    for heading in &document.headings {
        if !is_ancestor(&tasks_heading.slug, &heading.slug) {
            continue;
        }

        let body = match provider.get_section_content(&address.path, &heading.slug).await {
            Ok(body) => body.unwrap_or_default(),
            Err(err) => {
                invalidate(provider, cache, &address.path).await;
                return Err(AddressingError::TaskListFailed {
                    document_path: address.path,
                    reason: err.to_string(),
                });
            }
        };

        let status = extract_status(&body);
        if let Some(filter) = &options.status_filter {
            if status != *filter {
                continue;
            }
        }

        let referenced_documents = if options.load_references {
            match loader
                .load_references_from_content(&body, &address.path, provider)
                .await
            {
                Ok(roots) => roots,
                Err(err) => {
                    invalidate(provider, cache, &address.path).await;
                    return Err(AddressingError::TaskListFailed {
                        document_path: address.path,
                        reason: err.to_string(),
                    });
                }
            }
        } else {
            Vec::new()
        };

        let relative = relative_task_slug(&heading.slug).to_string();
        listing.tasks.push(TaskViewData {
            hierarchical_context: HierarchicalContext::from_task_slug(&relative),
            slug: relative,
            title: heading.title.clone(),
            status,
            link: extract_field(&body, "Link").map(|field| field.value),
            dependencies: extract_dependencies(&body),
            referenced_documents,
        });
    }

    listing.summarize();
    Ok(listing)
}
