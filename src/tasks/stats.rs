//! Aggregate statistics over a task list.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::types::{AssigneeHours, ProductionStats, Task, TaskStats, TaskStatus};
use crate::util::normalize_email;

/// Count tasks by status. Every task lands in exactly one bucket.
pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..TaskStats::default()
    };

    for task in tasks {
        match task.status {
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Blocked => stats.blocked += 1,
        }
    }

    stats
}

/// Tasks past due and not completed, most overdue first.
pub fn overdue_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    let mut overdue: Vec<&Task> = tasks.iter().filter(|t| t.is_overdue(now)).collect();
    overdue.sort_by_key(|t| t.due_date);
    overdue
}

/// Sum estimated hours overall and for completed tasks only.
///
/// Productivity is `completed / total`, and 0.0 when there are no hours.
pub fn compute_production_stats(tasks: &[Task]) -> ProductionStats {
    let mut total_hours = 0.0;
    let mut completed_hours = 0.0;
    let mut by_email: BTreeMap<String, AssigneeHours> = BTreeMap::new();

    for task in tasks {
        let hours = task.estimated_duration_hours;
        let done = task.is_completed();

        total_hours += hours;
        if done {
            completed_hours += hours;
        }

        let entry = by_email
            .entry(normalize_email(&task.assigned_to_email))
            .or_insert_with(|| AssigneeHours {
                assigned_to: task.assigned_to.clone(),
                assigned_to_email: task.assigned_to_email.trim().to_string(),
                ..AssigneeHours::default()
            });
        entry.total_hours += hours;
        if done {
            entry.completed_hours += hours;
        }
        entry.task_count += 1;
    }

    ProductionStats {
        total_hours,
        completed_hours,
        productivity: productivity(completed_hours, total_hours),
        hours_by_assignee: by_email.into_values().collect(),
    }
}

fn productivity(completed: f64, total: f64) -> f64 {
    if total > 0.0 {
        completed / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskPriority;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn task(id: &str, status: TaskStatus, hours: f64, email: &str, due: u32) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: "No description".to_string(),
            priority: TaskPriority::Medium,
            estimated_duration_hours: hours,
            due_date: day(due),
            status,
            assigned_to: email.split('@').next().unwrap_or_default().to_string(),
            assigned_to_email: email.to_string(),
            created_by_agent: "AI Task Allocator".to_string(),
            organization_id: "org1".to_string(),
            detail: None,
            created_at: day(1),
            updated_at: day(1),
            allocation_id: "doc1".to_string(),
            created_at_inferred: false,
            due_date_inferred: false,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("t1", TaskStatus::Pending, 4.0, "b@x.com", 5),
            task("t2", TaskStatus::InProgress, 2.0, "a@x.com", 20),
            task("t3", TaskStatus::Completed, 6.0, "a@x.com", 3),
            task("t4", TaskStatus::Blocked, 0.0, "b@x.com", 8),
            task("t5", TaskStatus::Completed, 2.0, "B@X.com", 9),
        ]
    }

    #[test]
    fn status_counts_sum_to_total() {
        let stats = compute_stats(&sample());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.blocked, 1);

        let summed: usize = TaskStatus::ALL.iter().map(|s| stats.count_for(*s)).sum();
        assert_eq!(summed, stats.total);
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(compute_stats(&[]), TaskStats::default());

        let production = compute_production_stats(&[]);
        assert_eq!(production.total_hours, 0.0);
        assert_eq!(production.productivity, 0.0);
        assert!(production.hours_by_assignee.is_empty());
    }

    #[test]
    fn productivity_is_completed_over_total() {
        let production = compute_production_stats(&sample());
        assert_eq!(production.total_hours, 14.0);
        assert_eq!(production.completed_hours, 8.0);
        assert!((production.productivity - 8.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn zero_hours_never_divides() {
        let tasks = vec![task("t1", TaskStatus::Completed, 0.0, "a@x.com", 5)];
        let production = compute_production_stats(&tasks);
        assert_eq!(production.productivity, 0.0);
        assert!(production.productivity.is_finite());
    }

    #[test]
    fn hours_group_by_normalized_email() {
        let production = compute_production_stats(&sample());
        let emails: Vec<&str> = production
            .hours_by_assignee
            .iter()
            .map(|h| h.assigned_to_email.as_str())
            .collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com"]);

        let b = &production.hours_by_assignee[1];
        assert_eq!(b.task_count, 3);
        assert_eq!(b.total_hours, 6.0);
        assert_eq!(b.completed_hours, 2.0);
    }

    #[test]
    fn overdue_excludes_completed_and_sorts_oldest_first() {
        let tasks = sample();
        let ids: Vec<&str> = overdue_tasks(&tasks, day(10))
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["t1", "t4"]);
    }
}
