//! Dashboard statistics: task counts plus this week's time per category.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc};
use serde::Serialize;

use super::aggregate::by_category;
use super::extract::{Extraction, TimeWindow, WindowFilter};
use super::rates::percentage;

/// One slice of the weekly category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub color: String,
    pub minutes: u64,
    /// `round(minutes / total * 100)`, 0 when the total is 0. Each share
    /// rounds on its own, so the shares can add up to 101.
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// PENDING plus IN_PROGRESS
    pub pending_tasks: usize,
    /// Minutes of work completed this week
    pub total_minutes: u64,
    pub week: TimeWindow,
    /// Sorted by category creation order
    pub weekly_breakdown: Vec<CategoryShare>,
}

/// The calendar week containing `now`: Sunday 00:00 to the next Sunday 00:00
/// in `offset`.
pub fn calendar_week(now: DateTime<Utc>, offset: &FixedOffset) -> TimeWindow {
    let local = now.with_timezone(offset);
    let days_since_sunday = local.weekday().num_days_from_sunday() as i64;
    let sunday = local.date_naive() - Duration::days(days_since_sunday);
    let local_midnight = sunday.and_time(NaiveTime::MIN);
    let start =
        (local_midnight - Duration::seconds(offset.local_minus_utc() as i64)).and_utc();
    TimeWindow::new(start, start + Duration::days(7))
}

pub fn compute(extraction: &Extraction, now: DateTime<Utc>, offset: &FixedOffset) -> DashboardStats {
    let week = calendar_week(now, offset);

    let total_tasks = extraction.metrics.len();
    let completed_tasks = extraction.iter().filter(|m| m.is_completed()).count();
    let pending_tasks = extraction.iter().filter(|m| m.is_open()).count();

    let done_this_week = extraction.select(WindowFilter::completed(week));
    let mut groups = by_category(done_this_week.iter().copied());
    groups.sort_by_key(|g| g.key.rank);

    let total_minutes = groups.total_minutes();
    let weekly_breakdown = groups
        .into_vec()
        .into_iter()
        .map(|g| CategoryShare {
            percentage: percentage(g.total_minutes, total_minutes),
            name: g.key.name,
            color: g.key.color,
            minutes: g.total_minutes,
        })
        .collect();

    DashboardStats {
        total_tasks,
        completed_tasks,
        pending_tasks,
        total_minutes,
        week,
        weekly_breakdown,
    }
}

/// Render minutes as `1h 30m`, `2h` or `45m`.
pub fn format_minutes(minutes: u64) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
