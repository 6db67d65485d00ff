//! Productivity patterns over the rolling window: when work starts, which
//! days it gets finished, and how often each category comes up.

use chrono::{DateTime, FixedOffset, Utc, Weekday};
use serde::Serialize;

use super::aggregate::{by_category, by_hour, by_weekday};
use super::extract::{Extraction, TimeWindow, WindowFilter};

const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub count: usize,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPattern {
    pub name: String,
    pub color: String,
    pub count: usize,
    pub total_minutes: u64,
    pub average_minutes: u32,
    /// Completions per day over the window
    pub per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityPatterns {
    pub window: TimeWindow,
    /// Indexed by hour of day (0-23), from the start of work
    pub hourly: [Slot; 24],
    /// Indexed by weekday, Sunday = 0, from the completion time
    pub daily: [Slot; 7],
    pub peak_hour: Option<u32>,
    pub busiest_day: Option<Weekday>,
    pub categories: Vec<CategoryPattern>,
}

/// Patterns over tasks completed in the `days` before `now`.
pub fn compute(
    extraction: &Extraction,
    now: DateTime<Utc>,
    days: u32,
    offset: &FixedOffset,
) -> ProductivityPatterns {
    let window = TimeWindow::ending_at(now, days);
    let done = extraction.select(WindowFilter::completed(window));

    let mut hourly = [Slot::default(); 24];
    for group in by_hour(done.iter().copied(), offset).iter() {
        if let Some(slot) = hourly.get_mut(group.key as usize) {
            *slot = Slot {
                count: group.count,
                minutes: group.total_minutes,
            };
        }
    }

    let mut daily = [Slot::default(); 7];
    for group in by_weekday(done.iter().copied(), offset).iter() {
        daily[group.key.num_days_from_sunday() as usize] = Slot {
            count: group.count,
            minutes: group.total_minutes,
        };
    }

    let peak_hour = busiest(&hourly).map(|i| i as u32);
    let busiest_day = busiest(&daily).map(|i| WEEK[i]);

    let window_days = window.days() as f64;
    let mut groups = by_category(done.iter().copied());
    groups.sort_by_key(|g| g.key.rank);
    let categories = groups
        .iter()
        .map(|g| CategoryPattern {
            name: g.key.name.clone(),
            color: g.key.color.clone(),
            count: g.count,
            total_minutes: g.total_minutes,
            average_minutes: g.average_minutes(),
            per_day: g.count as f64 / window_days,
        })
        .collect();

    ProductivityPatterns {
        window,
        hourly,
        daily,
        peak_hour,
        busiest_day,
        categories,
    }
}

/// Index of the slot with the most completions; earliest wins ties.
fn busiest(slots: &[Slot]) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.count > 0)
        .fold(None, |best: Option<(usize, usize)>, (i, s)| match best {
            Some((_, n)) if n >= s.count => best,
            _ => Some((i, s.count)),
        })
        .map(|(i, _)| i)
}
