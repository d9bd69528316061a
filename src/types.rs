use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse the stored form. Case and separators are forgiving; unknown
    /// values give `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        match wire_key(value).as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Task progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// Parse the stored form (`in_progress`, `in-progress`, `In Progress`, ...).
    pub fn from_wire(value: &str) -> Option<Self> {
        match wire_key(value).as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

fn wire_key(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['-', ' '], "_")
}

/// A single canonical task, flattened out of an allocation document.
///
/// Every scalar is already resolved: nothing downstream inspects wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub estimated_duration_hours: f64,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub assigned_to: String,
    pub assigned_to_email: String,
    pub created_by_agent: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Id of the allocation document this task was extracted from
    pub allocation_id: String,
    /// True when `created_at` came from a fallback rather than the entry itself
    #[serde(default)]
    pub created_at_inferred: bool,
    /// True when `due_date` came from a fallback rather than the entry itself
    #[serde(default)]
    pub due_date_inferred: bool,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Not completed and past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_date < now
    }

    /// Whole days past due, or `None` if the task is not overdue.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.is_overdue(now) {
            Some((now - self.due_date).num_days())
        } else {
            None
        }
    }
}

/// Task counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub blocked: usize,
}

impl TaskStats {
    pub fn count_for(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
            TaskStatus::Blocked => self.blocked,
        }
    }
}

/// Estimated effort hours for one assignee
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssigneeHours {
    pub assigned_to: String,
    pub assigned_to_email: String,
    pub total_hours: f64,
    pub completed_hours: f64,
    pub task_count: usize,
}

/// Effort-hour totals and the productivity ratio
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionStats {
    pub total_hours: f64,
    pub completed_hours: f64,
    /// `completed_hours / total_hours`, or 0 when there are no hours
    pub productivity: f64,
    pub hours_by_assignee: Vec<AssigneeHours>,
}

/// Horizontal placement of one task bar inside a timeline window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLayout {
    pub left_percent: f64,
    pub width_percent: f64,
    pub visible: bool,
}

/// Layouts keyed by task id
pub type LayoutMap = HashMap<String, TaskLayout>;
