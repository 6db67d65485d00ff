//! Week-over-week insights, risk counts and recommendations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::extract::{Extraction, TimeWindow, WindowFilter};
use super::rates::{
    assess_burnout, average_task_minutes, completion_rate, high_priority_count, overdue_count,
    weekly_change, BurnoutRisk, BurnoutSignals,
};
use super::recommend::{self, RecommendationInput, RecommendationKey};
use crate::config::AnalyticsConfig;

/// Completion rates and average durations of two adjacent windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTrend {
    pub current: TimeWindow,
    pub previous: TimeWindow,
    pub current_rate: u32,
    pub previous_rate: u32,
    /// `current_rate - previous_rate`
    pub weekly_change: i32,
    pub average_task_minutes: u32,
    pub previous_average_task_minutes: u32,
    /// `average_task_minutes - previous_average_task_minutes`
    pub time_change: i64,
}

impl WeeklyTrend {
    /// Windows select tasks by creation time.
    pub fn compute(extraction: &Extraction, now: DateTime<Utc>, days: u32) -> Self {
        let current = TimeWindow::ending_at(now, days);
        let previous = current.previous();

        let this_week = extraction.select(WindowFilter::created(current));
        let last_week = extraction.select(WindowFilter::created(previous));

        let current_rate = completion_rate(this_week.iter().copied());
        let previous_rate = completion_rate(last_week.iter().copied());
        let average = average_task_minutes(this_week.iter().copied());
        let previous_average = average_task_minutes(last_week.iter().copied());

        Self {
            current,
            previous,
            current_rate,
            previous_rate,
            weekly_change: weekly_change(current_rate, previous_rate),
            average_task_minutes: average,
            previous_average_task_minutes: previous_average,
            time_change: average as i64 - previous_average as i64,
        }
    }
}

/// Burnout label plus the signals that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnoutAssessment {
    pub risk: BurnoutRisk,
    pub window: TimeWindow,
    pub signals: BurnoutSignals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub trend: WeeklyTrend,
    pub overdue_count: usize,
    pub high_priority_count: usize,
    pub burnout: BurnoutAssessment,
    pub recommendations: Vec<RecommendationKey>,
}

pub fn compute(extraction: &Extraction, now: DateTime<Utc>, policy: &AnalyticsConfig) -> Insights {
    let trend = WeeklyTrend::compute(extraction, now, policy.trend_window_days);
    let overdue = overdue_count(extraction.iter(), now);
    let high_priority = high_priority_count(extraction.iter());

    let burnout_window = TimeWindow::ending_at(now, policy.burnout_window_days);
    let recent = extraction.select(WindowFilter::completed(burnout_window));
    let signals = BurnoutSignals::collect(recent.iter().copied(), overdue);
    let burnout = BurnoutAssessment {
        risk: assess_burnout(&signals, &policy.burnout),
        window: burnout_window,
        signals,
    };

    let recommendations = recommend::select(
        &RecommendationInput {
            completion_rate: trend.current_rate,
            weekly_change: trend.weekly_change,
            overdue_count: overdue,
            high_priority_count: high_priority,
            average_task_minutes: trend.average_task_minutes,
        },
        &policy.recommendations,
    );

    Insights {
        trend,
        overdue_count: overdue,
        high_priority_count: high_priority,
        burnout,
        recommendations,
    }
}
