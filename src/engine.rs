//! Engine facade consumed by dashboard rendering code.
//!
//! Holds an already-fetched document collection and the engine config. Every
//! method is a pure computation over those inputs; the timeline window is
//! passed in and returned, never stored.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::normalize::{normalize_id, resolve_date};
use crate::raw::{parse_documents, OptimizationMetrics, RawAllocationDocument};
use crate::tasks::{self, ExtractionContext};
use crate::timeline::{self, Direction, TimelineWindow};
use crate::types::{LayoutMap, ProductionStats, Task, TaskStats};

/// Per-document overview for the manager view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub requirement: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    pub employee_count: usize,
    pub task_count: usize,
    pub metrics: OptimizationMetrics,
}

pub struct TaskEngine {
    documents: Vec<RawAllocationDocument>,
    config: EngineConfig,
    timezone: Tz,
    /// Pinned clock; `None` reads the system clock per call
    now: Option<DateTime<Utc>>,
}

impl TaskEngine {
    pub fn new(
        documents: Vec<RawAllocationDocument>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let timezone = config.tz()?;
        Ok(Self {
            documents,
            config,
            timezone,
            now: None,
        })
    }

    /// Decode a JSON array of documents and build an engine over it.
    pub fn from_json(json: &str, config: EngineConfig) -> Result<Self, EngineError> {
        let documents = parse_documents(json)?;
        log::info!("Loaded {} allocation documents", documents.len());
        Self::new(documents, config)
    }

    /// Read a JSON export of documents from disk.
    pub fn from_path(path: &Path, config: EngineConfig) -> Result<Self, EngineError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json, config)
    }

    /// Pin the clock used for date fallbacks and the current window.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn documents(&self) -> &[RawAllocationDocument] {
        &self.documents
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn context(&self) -> ExtractionContext {
        ExtractionContext::new(self.now())
            .with_agent_label(self.config.default_agent_label.clone())
    }

    pub fn list_tasks_by_org(&self, org_id: &str) -> Vec<Task> {
        tasks::list_tasks_by_org(&self.documents, org_id, &self.context())
    }

    pub fn list_tasks_by_email(&self, email: &str) -> Vec<Task> {
        tasks::list_tasks_by_email(&self.documents, email, &self.context())
    }

    pub fn compute_stats(&self, tasks: &[Task]) -> TaskStats {
        tasks::compute_stats(tasks)
    }

    pub fn production_stats(&self, tasks: &[Task]) -> ProductionStats {
        tasks::compute_production_stats(tasks)
    }

    pub fn overdue_tasks<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks::overdue_tasks(tasks, self.now())
    }

    /// Window for the current week in the configured timezone.
    pub fn current_window(&self) -> TimelineWindow {
        TimelineWindow::current(self.now(), self.config.week_start, self.timezone)
    }

    /// Window for the week containing `date`.
    pub fn window_for(&self, date: NaiveDate) -> TimelineWindow {
        TimelineWindow::for_date(date, self.config.week_start, self.timezone)
    }

    pub fn layout_tasks(&self, tasks: &[Task], window: &TimelineWindow) -> LayoutMap {
        timeline::layout_tasks(tasks, window)
    }

    /// Shift by a direction string from the presentation layer.
    pub fn shift_window(
        &self,
        window: &TimelineWindow,
        direction: &str,
    ) -> Result<TimelineWindow, EngineError> {
        let direction: Direction = direction.parse()?;
        Ok(timeline::shift_window(window, direction))
    }

    /// Documents of an organization, newest first.
    pub fn document_summaries(&self, org_id: &str) -> Vec<AllocationSummary> {
        let org_id = org_id.trim();
        if org_id.is_empty() {
            return Vec::new();
        }
        let mut summaries: Vec<AllocationSummary> = self
            .documents
            .iter()
            .filter(|doc| normalize_id(Some(&doc.organization_id)) == org_id)
            .map(summarize)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }
}

fn summarize(doc: &RawAllocationDocument) -> AllocationSummary {
    AllocationSummary {
        id: normalize_id(doc.id.as_ref()),
        created_at: resolve_date(doc.created_at.as_ref()),
        requirement: doc.original_requirement.clone(),
        success: doc.success.unwrap_or(doc.error.is_none()),
        error: doc.error.clone(),
        employee_count: doc.allocations.len(),
        task_count: doc.allocations.iter().map(|a| a.tasks.len()).sum(),
        metrics: doc
            .optimization_metrics
            .as_ref()
            .map(|m| m.normalized())
            .unwrap_or_default(),
    }
}
