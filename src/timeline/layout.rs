//! Projects task date ranges onto a timeline window as percentage geometry.
//!
//! A task spans `created_at..due_date`. Both ends are clipped to the window,
//! then expressed as offsets of the window width. Minimum bar widths are a
//! presentation concern; the reported width can be zero.

use chrono::{DateTime, Utc};

use crate::timeline::window::TimelineWindow;
use crate::types::{LayoutMap, Task, TaskLayout};

/// Geometry of one task inside `window`.
pub fn layout_task(task: &Task, window: &TimelineWindow) -> TaskLayout {
    layout_range(task.created_at, task.due_date, window.start(), window.end())
}

/// Geometry for every task, keyed by task id.
pub fn layout_tasks(tasks: &[Task], window: &TimelineWindow) -> LayoutMap {
    let (window_start, window_end) = (window.start(), window.end());

    let layouts: LayoutMap = tasks
        .iter()
        .map(|task| {
            (
                task.id.clone(),
                layout_range(task.created_at, task.due_date, window_start, window_end),
            )
        })
        .collect();

    log::debug!(
        "Laid out {} tasks against window starting {} ({} visible)",
        layouts.len(),
        window.anchor(),
        layouts.values().filter(|l| l.visible).count()
    );
    layouts
}

fn layout_range(
    created_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> TaskLayout {
    let visible = due_date >= window_start && created_at <= window_end;

    let span_ms = (window_end - window_start).num_milliseconds() as f64;
    if span_ms <= 0.0 {
        return TaskLayout {
            left_percent: 0.0,
            width_percent: 0.0,
            visible,
        };
    }

    let start = created_at.max(window_start);
    let end = due_date.min(window_end);

    let left_percent = percent_of(start - window_start, span_ms).clamp(0.0, 100.0);
    let width_percent = percent_of(end - start, span_ms)
        .max(0.0)
        .min(100.0 - left_percent);

    TaskLayout {
        left_percent,
        width_percent,
        visible,
    }
}

fn percent_of(delta: chrono::Duration, span_ms: f64) -> f64 {
    delta.num_milliseconds() as f64 / span_ms * 100.0
}
