//! User context handed to prompt construction.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::analytics::{
    extract, AggregateResult, AnalyticsEngine, ProductivityPatterns, TaskMetric, TimeWindow,
    WindowFilter,
};
use crate::types::{TaskStatus, UserSnapshot};

/// Task counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    fn tally<'a>(tasks: impl IntoIterator<Item = &'a TaskMetric>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.cancelled
    }
}

/// Everything TidyBot knows about the user when building a prompt.
#[derive(Debug, Clone, Serialize)]
pub struct TidyBotContext {
    pub now: DateTime<Utc>,
    #[serde(skip)]
    pub offset: FixedOffset,
    /// Tasks created in the trend window, newest first
    pub recent: Vec<TaskMetric>,
    /// Tasks completed in the burnout window, most recently completed first
    pub completed: Vec<TaskMetric>,
    /// Category names in creation order
    pub categories: Vec<String>,
    /// Open tasks past their deadline, earliest deadline first
    pub overdue: Vec<TaskMetric>,
    /// Status counts over `recent`
    pub weekly_status: StatusCounts,
    pub analytics: AggregateResult,
    pub patterns: ProductivityPatterns,
}

impl TidyBotContext {
    /// Build the context for one user at `now`.
    pub fn build(snapshot: &UserSnapshot, engine: &AnalyticsEngine, now: DateTime<Utc>) -> Self {
        let policy = engine.policy();
        let extraction = extract(snapshot, None);

        let recent_window = TimeWindow::ending_at(now, policy.trend_window_days);
        let mut recent: Vec<TaskMetric> = extraction
            .select(WindowFilter::created(recent_window))
            .into_iter()
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let completed_window = TimeWindow::ending_at(now, policy.burnout_window_days);
        let mut completed: Vec<TaskMetric> = extraction
            .select(WindowFilter::completed(completed_window))
            .into_iter()
            .filter(|m| m.is_completed())
            .cloned()
            .collect();
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

        let mut overdue: Vec<TaskMetric> = extraction
            .iter()
            .filter(|m| m.is_overdue(now))
            .cloned()
            .collect();
        overdue.sort_by(|a, b| a.deadline.cmp(&b.deadline));

        let mut categories: Vec<_> = snapshot.categories.iter().collect();
        categories.sort_by_key(|c| c.created_at);

        Self {
            now,
            offset: *engine.offset(),
            weekly_status: StatusCounts::tally(&recent),
            recent,
            completed,
            categories: categories.into_iter().map(|c| c.name.clone()).collect(),
            overdue,
            analytics: engine.compute(snapshot, now),
            patterns: engine.patterns(snapshot, now),
        }
    }

    /// Open tasks created in the trend window.
    pub fn open_recent(&self) -> impl Iterator<Item = &TaskMetric> {
        self.recent.iter().filter(|m| m.is_open())
    }
}
