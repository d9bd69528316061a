//! Flattens allocation documents into one ordered task list.
//!
//! Documents are consumed newest first (by resolved `created_at`; documents
//! without a usable creation date sort last). Within a document, allocations
//! and tasks keep their source order. The sort is stable, so identical input
//! always yields the identical list.
//!
//! Identifier rules within one extraction:
//! - a synthesized key seen again gets a `#n` suffix, so distinct entries that
//!   share document, email and title are never merged;
//! - an explicit source id seen again is dropped, keeping the occurrence from
//!   the most recent document.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::normalize::{normalize_id, resolve_date};
use crate::raw::{RawAllocation, RawAllocationDocument};
use crate::tasks::builder::{build_with_origin, ExtractionContext, IdOrigin};
use crate::types::Task;
use crate::util::emails_match;

/// Which slice of the document collection to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope<'a> {
    Organization(&'a str),
    Assignee(&'a str),
}

/// All tasks of every document belonging to an organization.
pub fn list_tasks_by_org(
    documents: &[RawAllocationDocument],
    org_id: &str,
    ctx: &ExtractionContext,
) -> Vec<Task> {
    collect_tasks(documents, TaskScope::Organization(org_id), ctx)
}

/// Tasks from allocations assigned to one employee email, across all documents.
///
/// Other employees' allocations in the same document never contribute.
pub fn list_tasks_by_email(
    documents: &[RawAllocationDocument],
    email: &str,
    ctx: &ExtractionContext,
) -> Vec<Task> {
    let ctx = ctx.clone().for_email(email.trim());
    collect_tasks(documents, TaskScope::Assignee(email), &ctx)
}

pub fn collect_tasks(
    documents: &[RawAllocationDocument],
    scope: TaskScope<'_>,
    ctx: &ExtractionContext,
) -> Vec<Task> {
    let mut ordered: Vec<(&RawAllocationDocument, Option<DateTime<Utc>>)> = documents
        .iter()
        .filter(|doc| document_in_scope(doc, scope))
        .map(|doc| (doc, resolve_date(doc.created_at.as_ref())))
        .collect();
    // Newest first; `None` < `Some`, so undated documents land at the end.
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    let mut ids = TaskIds::default();
    let mut tasks = Vec::new();

    for (doc, _) in ordered {
        for allocation in doc
            .allocations
            .iter()
            .filter(|allocation| allocation_in_scope(allocation, scope))
        {
            for entry in &allocation.tasks {
                let (mut task, origin) = build_with_origin(entry, allocation, doc, ctx);
                if ids.admit(&mut task, origin) {
                    tasks.push(task);
                }
            }
        }
    }

    log::debug!(
        "Extracted {} tasks from {} documents for {:?}",
        tasks.len(),
        documents.len(),
        scope
    );
    tasks
}

fn document_in_scope(doc: &RawAllocationDocument, scope: TaskScope<'_>) -> bool {
    match scope {
        TaskScope::Organization(org_id) => {
            let org_id = org_id.trim();
            !org_id.is_empty() && normalize_id(Some(&doc.organization_id)) == org_id
        }
        TaskScope::Assignee(_) => doc
            .allocations
            .iter()
            .any(|allocation| allocation_in_scope(allocation, scope)),
    }
}

fn allocation_in_scope(allocation: &RawAllocation, scope: TaskScope<'_>) -> bool {
    match scope {
        TaskScope::Organization(_) => true,
        TaskScope::Assignee(email) => match allocation.employee_email.as_deref() {
            Some(employee_email) => emails_match(employee_email, email),
            None => {
                log::debug!("Skipping allocation without employee email");
                false
            }
        },
    }
}

/// Tracks ids already emitted during one extraction.
#[derive(Default)]
struct TaskIds {
    seen: HashSet<String>,
}

impl TaskIds {
    /// Record the task's id, renaming or rejecting it on collision.
    fn admit(&mut self, task: &mut Task, origin: IdOrigin) -> bool {
        if self.seen.insert(task.id.clone()) {
            return true;
        }

        match origin {
            IdOrigin::Source => {
                log::warn!(
                    "Duplicate task id {:?} in document {}; keeping the most recent",
                    task.id,
                    task.allocation_id
                );
                false
            }
            IdOrigin::Synthesized => {
                let base = task.id.clone();
                let mut n = 2;
                while !self.seen.insert(format!("{}#{}", base, n)) {
                    n += 1;
                }
                log::warn!("Task key {:?} collided; using suffix #{}", base, n);
                task.id = format!("{}#{}", base, n);
                true
            }
        }
    }
}
