//! Metric extraction
//!
//! Normalizes raw task records into [`TaskMetric`]s carrying only what the
//! aggregation steps need. Records that fail validation are skipped and
//! counted rather than aborting the whole computation.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::{Category, HistoryEntry, Priority, Task, TaskStatus, UserSnapshot};

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days`-long window ending (exclusively) at `end`. The start
    /// saturates at the earliest representable instant.
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: saturating_sub(end, Duration::days(days as i64)),
            end,
        }
    }

    /// The window of equal length immediately before this one.
    pub fn previous(&self) -> Self {
        let len = self.end - self.start;
        Self {
            start: saturating_sub(self.start, len),
            end: self.start,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Length in whole days (at least 1).
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }
}

fn saturating_sub(ts: DateTime<Utc>, len: Duration) -> DateTime<Utc> {
    ts.checked_sub_signed(len).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Which timestamp a window filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowField {
    /// Task creation time
    Created,
    /// Task completion time (tasks without one never match)
    Completed,
}

/// A window plus the timestamp it filters on.
#[derive(Debug, Clone, Copy)]
pub struct WindowFilter {
    pub window: TimeWindow,
    pub field: WindowField,
}

impl WindowFilter {
    pub fn created(window: TimeWindow) -> Self {
        Self {
            window,
            field: WindowField::Created,
        }
    }

    pub fn completed(window: TimeWindow) -> Self {
        Self {
            window,
            field: WindowField::Completed,
        }
    }

    pub fn matches(&self, metric: &TaskMetric) -> bool {
        let ts = match self.field {
            WindowField::Created => Some(metric.created_at),
            WindowField::Completed => metric.completed_at,
        };
        ts.is_some_and(|ts| self.window.contains(ts))
    }
}

/// Why a task record was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NegativeEstimate(i64),
    NegativeActual(i64),
    UnknownCategory(String),
    /// Completion timestamp present without COMPLETED status, or missing with it
    CompletionMismatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NegativeEstimate(m) => write!(f, "negative estimated duration ({m})"),
            SkipReason::NegativeActual(m) => write!(f, "negative actual duration ({m})"),
            SkipReason::UnknownCategory(id) => write!(f, "unknown category {id}"),
            SkipReason::CompletionMismatch => {
                write!(f, "completion timestamp does not match status")
            }
        }
    }
}

/// Normalized view of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskMetric {
    pub task_id: String,
    pub title: String,
    pub category_name: String,
    pub category_color: String,
    /// Position of the category in creation order
    pub category_rank: usize,
    pub status: TaskStatus,
    pub priority: Priority,
    pub estimated_minutes: Option<u32>,
    pub actual_minutes: Option<u32>,
    /// Actual if present, else estimate, else 0
    pub duration_used: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Start of the close-out history entry, if one exists
    pub started_at: Option<DateTime<Utc>>,
}

impl TaskMetric {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Open with a deadline strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.deadline.is_some_and(|d| d < now)
    }

    /// Open and HIGH/URGENT.
    pub fn is_high_priority_backlog(&self) -> bool {
        self.is_open() && self.priority.is_high()
    }
}

/// Output of [`extract`]: the valid metrics plus a count of skipped records.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub metrics: Vec<TaskMetric>,
    pub skipped: usize,
}

impl Extraction {
    /// Metrics matching `filter`, in input order.
    pub fn select(&self, filter: WindowFilter) -> Vec<&TaskMetric> {
        self.metrics.iter().filter(|m| filter.matches(m)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskMetric> {
        self.metrics.iter()
    }
}

/// Extract metrics from a snapshot, optionally keeping only tasks inside a
/// window.
///
/// Pure: no I/O and no mutation of the input.
pub fn extract(snapshot: &UserSnapshot, filter: Option<WindowFilter>) -> Extraction {
    let categories = category_index(&snapshot.categories);
    let history = history_index(&snapshot.history);

    let mut extraction = Extraction::default();

    for task in &snapshot.tasks {
        match normalize(task, &categories, &history) {
            Ok(metric) => {
                if filter.map_or(true, |f| f.matches(&metric)) {
                    extraction.metrics.push(metric);
                }
            }
            Err(reason) => {
                tracing::warn!(task_id = %task.id, reason = %reason, "Skipping invalid task record");
                extraction.skipped += 1;
            }
        }
    }

    tracing::debug!(
        tasks = snapshot.tasks.len(),
        extracted = extraction.metrics.len(),
        skipped = extraction.skipped,
        "Extracted task metrics"
    );

    extraction
}

fn normalize(
    task: &Task,
    categories: &HashMap<&str, (usize, &Category)>,
    history: &HashMap<&str, &HistoryEntry>,
) -> Result<TaskMetric, SkipReason> {
    let estimated_minutes = checked_minutes(task.estimated_minutes, SkipReason::NegativeEstimate)?;
    let actual_minutes = checked_minutes(task.actual_minutes, SkipReason::NegativeActual)?;

    if (task.status == TaskStatus::Completed) != task.completed_at.is_some() {
        return Err(SkipReason::CompletionMismatch);
    }

    let (rank, category) = categories
        .get(task.category_id.as_str())
        .copied()
        .ok_or_else(|| SkipReason::UnknownCategory(task.category_id.clone()))?;

    let started_at = history.get(task.id.as_str()).map(|h| h.started_at);

    Ok(TaskMetric {
        task_id: task.id.clone(),
        title: task.title.clone(),
        category_name: category.name.clone(),
        category_color: category.color.clone(),
        category_rank: rank,
        status: task.status,
        priority: task.priority,
        estimated_minutes,
        actual_minutes,
        duration_used: task.duration_used(),
        deadline: task.deadline,
        created_at: task.created_at,
        completed_at: task.completed_at,
        started_at,
    })
}

fn checked_minutes(
    value: Option<i64>,
    reason: fn(i64) -> SkipReason,
) -> Result<Option<u32>, SkipReason> {
    match value {
        None => Ok(None),
        Some(m) if m < 0 => Err(reason(m)),
        Some(m) => Ok(Some(m.min(u32::MAX as i64) as u32)),
    }
}

/// Categories keyed by id, with their rank in creation order.
fn category_index(categories: &[Category]) -> HashMap<&str, (usize, &Category)> {
    let mut ordered: Vec<&Category> = categories.iter().collect();
    ordered.sort_by_key(|c| c.created_at);
    ordered
        .into_iter()
        .enumerate()
        .map(|(rank, c)| (c.id.as_str(), (rank, c)))
        .collect()
}

/// Well-formed history entries keyed by task id; the first one wins.
fn history_index(history: &[HistoryEntry]) -> HashMap<&str, &HistoryEntry> {
    let mut index = HashMap::new();
    for entry in history {
        if !entry.is_well_formed() {
            tracing::warn!(
                entry_id = %entry.id,
                task_id = %entry.task_id,
                "Ignoring history entry that ends before it starts"
            );
            continue;
        }
        index.entry(entry.task_id.as_str()).or_insert(entry);
    }
    index
}
