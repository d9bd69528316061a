//! Task extraction: raw allocation entries become canonical tasks, scoped by
//! organization or assignee, with aggregate statistics on top.

pub mod aggregate;
pub mod builder;
pub mod stats;

pub use aggregate::{list_tasks_by_email, list_tasks_by_org, TaskScope};
pub use builder::{build_task, synthesize_task_key, ExtractionContext};
pub use stats::{compute_production_stats, compute_stats, overdue_tasks};
