//! Gantt-style timeline: the navigable 14-day window and task bar geometry.

pub mod layout;
pub mod window;

pub use layout::{layout_task, layout_tasks};
pub use window::{shift_window, start_of_week, Direction, TimelineDay, TimelineWindow};
