//! Builds one canonical [`Task`] from a raw task entry and its enclosing
//! allocation and document.

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_AGENT_LABEL;
use crate::normalize::{normalize_id, normalize_number, resolve_date};
use crate::raw::{RawAllocation, RawAllocationDocument, RawTaskEntry};
use crate::types::{Task, TaskPriority, TaskStatus};
use crate::util::{name_from_email, non_blank, normalize_email};

pub const UNTITLED_TASK: &str = "Untitled Task";
pub const NO_DESCRIPTION: &str = "No description";
pub const UNASSIGNED: &str = "Unassigned";

/// Caller-supplied context for one extraction pass.
///
/// `now` is the fallback for dates that cannot be resolved from the entry or
/// its document. Passing it in keeps repeated extraction deterministic.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub now: DateTime<Utc>,
    /// Email the caller is extracting for, if any
    pub filter_email: Option<String>,
    pub default_agent_label: String,
}

impl ExtractionContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            filter_email: None,
            default_agent_label: DEFAULT_AGENT_LABEL.to_string(),
        }
    }

    pub fn with_agent_label(mut self, label: impl Into<String>) -> Self {
        self.default_agent_label = label.into();
        self
    }

    pub fn for_email(mut self, email: impl Into<String>) -> Self {
        self.filter_email = Some(email.into());
        self
    }
}

/// Where a task's identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOrigin {
    /// The raw entry carried its own id
    Source,
    /// Derived from document id, employee email and title
    Synthesized,
}

/// Stable key for an entry that has no id of its own.
///
/// Same document, email and title always produce the same key.
pub fn synthesize_task_key(document_id: &str, employee_email: &str, title: &str) -> String {
    format!("{}_{}_{}", document_id, normalize_email(employee_email), title)
}

/// Build a canonical task. Missing or malformed fields fall back to defaults;
/// this never fails.
pub fn build_task(
    entry: &RawTaskEntry,
    allocation: &RawAllocation,
    document: &RawAllocationDocument,
    ctx: &ExtractionContext,
) -> Task {
    build_with_origin(entry, allocation, document, ctx).0
}

pub(crate) fn build_with_origin(
    entry: &RawTaskEntry,
    allocation: &RawAllocation,
    document: &RawAllocationDocument,
    ctx: &ExtractionContext,
) -> (Task, IdOrigin) {
    let document_id = normalize_id(document.id.as_ref());
    let allocation_email = non_blank(allocation.employee_email.as_deref());

    let title = non_blank(entry.title.as_deref())
        .unwrap_or(UNTITLED_TASK)
        .to_string();

    // The allocation's stored email beats the caller's filter string, which
    // only matched it case-insensitively.
    let assigned_to_email = non_blank(entry.assigned_to_email.as_deref())
        .or(allocation_email)
        .or_else(|| non_blank(ctx.filter_email.as_deref()))
        .unwrap_or_default()
        .to_string();

    let assigned_to = non_blank(entry.assigned_to.as_deref())
        .or_else(|| non_blank(allocation.employee_name.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| match name_from_email(&assigned_to_email) {
            name if name.is_empty() => UNASSIGNED.to_string(),
            name => name,
        });

    let source_id = normalize_id(entry.id.as_ref());
    let (id, origin) = if source_id.is_empty() {
        let key_email = allocation_email.unwrap_or(assigned_to_email.as_str());
        (
            synthesize_task_key(&document_id, key_email, &title),
            IdOrigin::Synthesized,
        )
    } else {
        (source_id, IdOrigin::Source)
    };

    let priority = parse_or_default(entry.priority.as_deref(), TaskPriority::from_wire, "priority");
    let status = parse_or_default(entry.status.as_deref(), TaskStatus::from_wire, "status");

    let entry_created = resolve_date(entry.created_at.as_ref());
    let (created_at, created_at_inferred) = match entry_created {
        Some(dt) => (dt, false),
        None => (
            resolve_date(document.created_at.as_ref()).unwrap_or(ctx.now),
            true,
        ),
    };
    let updated_at = resolve_date(entry.updated_at.as_ref()).unwrap_or(created_at);

    let (due_date, due_date_inferred) = match resolve_date(entry.due_date.as_ref()) {
        Some(dt) => (dt, false),
        None => (
            resolve_date(document.requirement_deadline.as_ref()).unwrap_or(ctx.now),
            true,
        ),
    };

    let task = Task {
        id,
        title,
        description: non_blank(entry.description.as_deref())
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
        priority,
        estimated_duration_hours: normalize_number(entry.estimated_duration_hours.as_ref()),
        due_date,
        status,
        assigned_to,
        assigned_to_email,
        created_by_agent: non_blank(entry.created_by_agent.as_deref())
            .unwrap_or(ctx.default_agent_label.as_str())
            .to_string(),
        organization_id: normalize_id(Some(&document.organization_id)),
        detail: non_blank(entry.detail.as_deref()).map(str::to_string),
        created_at,
        updated_at,
        allocation_id: document_id,
        created_at_inferred,
        due_date_inferred,
    };

    (task, origin)
}

fn parse_or_default<T: Default>(
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    field: &str,
) -> T {
    match non_blank(value) {
        None => T::default(),
        Some(raw) => parse(raw).unwrap_or_else(|| {
            log::debug!("Unknown task {} {:?}; using default", field, raw);
            T::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn document(value: serde_json::Value) -> RawAllocationDocument {
        serde_json::from_value(value).unwrap()
    }

    fn jane_document() -> RawAllocationDocument {
        document(json!({
            "_id": {"$oid": "doc1"},
            "organization_id": {"$oid": "org1"},
            "created_at": {"$date": "2024-01-01T00:00:00Z"},
            "allocations": [{
                "employee_name": "Jane Doe",
                "employee_email": "jane@co.com",
                "tasks": [{
                    "title": "Design schema",
                    "description": "Tables for billing",
                    "priority": "high",
                    "status": "in_progress",
                    "estimated_duration_hours": {"$numberInt": "8"},
                    "due_date": {"$date": "2024-01-10T00:00:00Z"}
                }]
            }]
        }))
    }

    #[test]
    fn builds_fully_specified_entry() {
        let doc = jane_document();
        let allocation = &doc.allocations[0];
        let task = build_task(&allocation.tasks[0], allocation, &doc, &ExtractionContext::new(now()));

        assert_eq!(task.id, "doc1_jane@co.com_Design schema");
        assert_eq!(task.title, "Design schema");
        assert_eq!(task.description, "Tables for billing");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.estimated_duration_hours, 8.0);
        assert_eq!(task.due_date, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(task.assigned_to, "Jane Doe");
        assert_eq!(task.assigned_to_email, "jane@co.com");
        assert_eq!(task.organization_id, "org1");
        assert_eq!(task.allocation_id, "doc1");
        assert_eq!(task.created_by_agent, DEFAULT_AGENT_LABEL);
        assert!(!task.due_date_inferred);
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let doc = document(json!({
            "_id": "doc2",
            "organization_id": "org1",
            "allocations": [{"tasks": [{}]}]
        }));
        let allocation = &doc.allocations[0];
        let task = build_task(&allocation.tasks[0], allocation, &doc, &ExtractionContext::new(now()));

        assert_eq!(task.title, UNTITLED_TASK);
        assert_eq!(task.description, NO_DESCRIPTION);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.estimated_duration_hours, 0.0);
        assert_eq!(task.assigned_to, UNASSIGNED);
        assert_eq!(task.assigned_to_email, "");
        assert_eq!(task.detail, None);
        assert_eq!(task.created_at, now());
        assert_eq!(task.due_date, now());
        assert!(task.created_at_inferred);
        assert!(task.due_date_inferred);
    }

    #[test]
    fn unknown_enum_values_fall_back_to_defaults() {
        let doc = document(json!({
            "organization_id": "org1",
            "allocations": [{"tasks": [{"priority": "urgent", "status": "archived"}]}]
        }));
        let allocation = &doc.allocations[0];
        let task = build_task(&allocation.tasks[0], allocation, &doc, &ExtractionContext::new(now()));
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn source_id_wins_over_synthesized_key() {
        let doc = document(json!({
            "_id": "doc3",
            "organization_id": "org1",
            "allocations": [{
                "employee_email": "a@x.com",
                "tasks": [{"id": "task-77", "title": "Keep me"}, {"id": "  ", "title": "Blank id"}]
            }]
        }));
        let allocation = &doc.allocations[0];
        let ctx = ExtractionContext::new(now());

        let (kept, origin) = build_with_origin(&allocation.tasks[0], allocation, &doc, &ctx);
        assert_eq!(kept.id, "task-77");
        assert_eq!(origin, IdOrigin::Source);

        let (blank, origin) = build_with_origin(&allocation.tasks[1], allocation, &doc, &ctx);
        assert_eq!(blank.id, "doc3_a@x.com_Blank id");
        assert_eq!(origin, IdOrigin::Synthesized);
    }

    #[test]
    fn synthesized_key_is_deterministic() {
        let doc = jane_document();
        let allocation = &doc.allocations[0];
        let first = build_task(&allocation.tasks[0], allocation, &doc, &ExtractionContext::new(now()));
        let later = ExtractionContext::new(now() + chrono::Duration::days(30));
        let second = build_task(&allocation.tasks[0], allocation, &doc, &later);
        assert_eq!(first.id, second.id);
        assert_eq!(synthesize_task_key("d", "Jane@Co.com", "T"), "d_jane@co.com_T");
    }

    #[test]
    fn dates_fall_back_to_document_context() {
        let doc = document(json!({
            "_id": "doc4",
            "organization_id": "org1",
            "created_at": {"$date": {"$numberLong": "1704067200000"}},
            "requirement_deadline": "2024-02-15",
            "allocations": [{"tasks": [{"title": "No dates"}]}]
        }));
        let allocation = &doc.allocations[0];
        let task = build_task(&allocation.tasks[0], allocation, &doc, &ExtractionContext::new(now()));

        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(task.updated_at, task.created_at);
        assert_eq!(task.due_date, Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap());
        assert!(task.created_at_inferred);
        assert!(task.due_date_inferred);
    }

    #[test]
    fn assignee_falls_back_to_filter_email_then_derived_name() {
        let doc = document(json!({
            "_id": "doc5",
            "organization_id": "org1",
            "allocations": [{"tasks": [{"title": "Orphan"}]}]
        }));
        let allocation = &doc.allocations[0];
        let ctx = ExtractionContext::new(now()).for_email("sarah.chen@acme.com");
        let task = build_task(&allocation.tasks[0], allocation, &doc, &ctx);

        assert_eq!(task.assigned_to_email, "sarah.chen@acme.com");
        assert_eq!(task.assigned_to, "Sarah Chen");
        assert_eq!(task.id, "doc5_sarah.chen@acme.com_Orphan");
    }

    #[test]
    fn stored_allocation_email_beats_filter_string() {
        let doc = document(json!({
            "_id": "doc7",
            "organization_id": "org1",
            "allocations": [{"employee_email": "ben@x.com", "tasks": [{"title": "Mine"}]}]
        }));
        let allocation = &doc.allocations[0];
        let ctx = ExtractionContext::new(now()).for_email("BEN@X.com");
        let task = build_task(&allocation.tasks[0], allocation, &doc, &ctx);
        assert_eq!(task.assigned_to_email, "ben@x.com");
    }

    #[test]
    fn entry_values_override_allocation_context() {
        let doc = document(json!({
            "_id": "doc6",
            "organization_id": "org1",
            "allocations": [{
                "employee_name": "Jane",
                "employee_email": "jane@co.com",
                "tasks": [{
                    "title": "Delegated",
                    "assigned_to": "Bob",
                    "assigned_to_email": "bob@co.com",
                    "created_by_agent": "Manual",
                    "details": "Pair with Jane"
                }]
            }]
        }));
        let allocation = &doc.allocations[0];
        let ctx = ExtractionContext::new(now()).with_agent_label("Planner");
        let task = build_task(&allocation.tasks[0], allocation, &doc, &ctx);

        assert_eq!(task.assigned_to, "Bob");
        assert_eq!(task.assigned_to_email, "bob@co.com");
        assert_eq!(task.created_by_agent, "Manual");
        assert_eq!(task.detail.as_deref(), Some("Pair with Jane"));
        // Key uses the allocation's employee, not the entry's assignee.
        assert_eq!(task.id, "doc6_jane@co.com_Delegated");
    }
}
