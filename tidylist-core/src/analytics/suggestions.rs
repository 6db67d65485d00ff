//! Contextual suggestions
//!
//! Short, ordered nudges about what to do next. Like recommendations they
//! are keys plus a count; the caller renders the text.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use serde::Serialize;

use super::extract::{Extraction, TimeWindow, WindowFilter};
use super::rates::{completion_rate, overdue_count};
use crate::config::SuggestionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKey {
    OverdueCatchUp,
    BusyDay,
    HighPriorityUpcoming,
    ImproveProductivity,
    DailyTips,
}

impl SuggestionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKey::OverdueCatchUp => "OVERDUE_CATCH_UP",
            SuggestionKey::BusyDay => "BUSY_DAY",
            SuggestionKey::HighPriorityUpcoming => "HIGH_PRIORITY_UPCOMING",
            SuggestionKey::ImproveProductivity => "IMPROVE_PRODUCTIVITY",
            SuggestionKey::DailyTips => "DAILY_TIPS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub key: SuggestionKey,
    /// What the suggestion is about: a task count, or a rate for
    /// IMPROVE_PRODUCTIVITY
    pub count: u64,
}

/// Local calendar day containing `now`.
fn today(now: DateTime<Utc>, offset: &FixedOffset) -> TimeWindow {
    let midnight = now
        .with_timezone(offset)
        .date_naive()
        .and_time(NaiveTime::MIN);
    let start = (midnight - Duration::seconds(offset.local_minus_utc() as i64)).and_utc();
    TimeWindow::new(start, start + Duration::days(1))
}

/// Evaluate the rules in order and keep the first `max_suggestions`.
pub fn compute(
    extraction: &Extraction,
    now: DateTime<Utc>,
    config: &SuggestionConfig,
    trend_days: u32,
    offset: &FixedOffset,
) -> Vec<Suggestion> {
    let mut out = Vec::new();

    let overdue = overdue_count(extraction.iter(), now);
    if overdue > 0 {
        out.push(Suggestion {
            key: SuggestionKey::OverdueCatchUp,
            count: overdue as u64,
        });
    }

    let day = today(now, offset);
    let created_today = extraction
        .select(WindowFilter::created(day))
        .into_iter()
        .filter(|m| m.is_open())
        .count();
    if created_today > config.busy_day_tasks {
        out.push(Suggestion {
            key: SuggestionKey::BusyDay,
            count: created_today as u64,
        });
    }

    // Inclusive at both ends
    let horizon = now
        .checked_add_signed(Duration::days(config.upcoming_days as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let upcoming = extraction
        .iter()
        .filter(|m| m.is_high_priority_backlog())
        .filter(|m| m.deadline.is_some_and(|d| d >= now && d <= horizon))
        .count();
    if upcoming > 0 {
        out.push(Suggestion {
            key: SuggestionKey::HighPriorityUpcoming,
            count: upcoming as u64,
        });
    }

    // From local midnight `trend_days` ago; an empty set rates 0
    let recent_window = TimeWindow::new(TimeWindow::ending_at(day.start, trend_days).start, day.end);
    let recent = extraction.select(WindowFilter::created(recent_window));
    let rate = completion_rate(recent.iter().copied());
    if (rate as i64) < config.low_completion_rate as i64 {
        out.push(Suggestion {
            key: SuggestionKey::ImproveProductivity,
            count: rate as u64,
        });
    }

    if out.is_empty() {
        out.push(Suggestion {
            key: SuggestionKey::DailyTips,
            count: 0,
        });
    }

    out.truncate(config.max_suggestions.max(1));
    out
}
