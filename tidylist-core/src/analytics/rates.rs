//! Rates, trends and risk signals.
//!
//! Every ratio here has an explicit zero-input result, so nothing divides by
//! zero.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::extract::TaskMetric;
use crate::config::{Band, BurnoutThresholds};

/// `round(part / whole * 100)`, or 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

/// Percentage of items with status COMPLETED; 0 for an empty set.
pub fn completion_rate<'a, I>(items: I) -> u32
where
    I: IntoIterator<Item = &'a TaskMetric>,
{
    let (total, completed) = items.into_iter().fold((0u64, 0u64), |(t, c), m| {
        (t + 1, c + m.is_completed() as u64)
    });
    percentage(completed, total)
}

/// Current rate minus previous rate, in percentage points.
pub fn weekly_change(current_rate: u32, previous_rate: u32) -> i32 {
    current_rate as i32 - previous_rate as i32
}

/// Open tasks whose deadline is strictly before `now`.
pub fn overdue_count<'a, I>(items: I, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a TaskMetric>,
{
    items.into_iter().filter(|m| m.is_overdue(now)).count()
}

/// Open HIGH/URGENT tasks.
pub fn high_priority_count<'a, I>(items: I) -> usize
where
    I: IntoIterator<Item = &'a TaskMetric>,
{
    items
        .into_iter()
        .filter(|m| m.is_high_priority_backlog())
        .count()
}

/// Mean duration-used (rounded minutes) over COMPLETED tasks with a
/// non-zero duration; 0 when there are none.
pub fn average_task_minutes<'a, I>(items: I) -> u32
where
    I: IntoIterator<Item = &'a TaskMetric>,
{
    let (count, total) = items
        .into_iter()
        .filter(|m| m.is_completed() && m.duration_used > 0)
        .fold((0u64, 0u64), |(n, sum), m| (n + 1, sum + m.duration_used as u64));
    if count == 0 {
        0
    } else {
        (total as f64 / count as f64).round() as u32
    }
}

// ============================================
// Burnout
// ============================================

/// Three-level burnout risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BurnoutRisk {
    Low,
    Medium,
    High,
}

impl BurnoutRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            BurnoutRisk::Low => "LOW",
            BurnoutRisk::Medium => "MEDIUM",
            BurnoutRisk::High => "HIGH",
        }
    }
}

/// Numeric inputs of the burnout heuristic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BurnoutSignals {
    /// Completed tasks in the window
    pub completed_tasks: usize,
    /// Σ duration-used of those tasks
    pub total_minutes: u64,
    /// Average per completed task with a duration
    pub average_minutes: u32,
    /// Open tasks past their deadline (not windowed)
    pub overdue: usize,
}

impl BurnoutSignals {
    /// Collect signals from tasks completed inside the burnout window and
    /// the overdue count over all tasks.
    pub fn collect<'a, I>(completed_in_window: I, overdue: usize) -> Self
    where
        I: IntoIterator<Item = &'a TaskMetric>,
    {
        let done: Vec<&TaskMetric> = completed_in_window
            .into_iter()
            .filter(|m| m.is_completed())
            .collect();
        Self {
            completed_tasks: done.len(),
            total_minutes: done.iter().map(|m| m.duration_used as u64).sum(),
            average_minutes: average_task_minutes(done.iter().copied()),
            overdue,
        }
    }
}

/// Grade of one signal against its band.
fn grade(value: u64, band: Band) -> u8 {
    if value >= band.high {
        2
    } else if value >= band.medium {
        1
    } else {
        0
    }
}

/// Map signals to a risk label.
///
/// HIGH when any signal reaches its `high` band or two reach `medium`;
/// MEDIUM when exactly one reaches `medium`; LOW otherwise.
pub fn assess_burnout(signals: &BurnoutSignals, thresholds: &BurnoutThresholds) -> BurnoutRisk {
    let grades = [
        grade(signals.total_minutes, thresholds.total_minutes),
        grade(signals.average_minutes as u64, thresholds.average_minutes),
        grade(signals.overdue as u64, thresholds.overdue),
    ];

    let elevated = grades.iter().filter(|&&g| g >= 1).count();
    if grades.contains(&2) || elevated >= 2 {
        BurnoutRisk::High
    } else if elevated == 1 {
        BurnoutRisk::Medium
    } else {
        BurnoutRisk::Low
    }
}
