//! Analytics engine
//!
//! The façade over the analytics pipeline:
//!
//! ```text
//! UserSnapshot ──► extract ──► aggregate ──► rates ──► recommend ──► AggregateResult
//!                                                                        │
//!                              dashboard / insights / patterns / TidyBot ◄┘
//! ```
//!
//! The engine holds only immutable policy. Every call is a pure function of
//! the snapshot and the `now` it is given, so one engine can serve any
//! number of users or threads without locking.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tidylist_core::analytics::AnalyticsEngine;
//!
//! let engine = AnalyticsEngine::new(config.analytics.clone())?;
//! let snapshot = db.load_snapshot(&config.profile.user_id)?;
//! let result = engine.compute(&snapshot, Utc::now());
//! println!("{}% done this week", result.insights.trend.current_rate);
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::time::Instant;

use super::dashboard::{self, DashboardStats};
use super::extract::{extract, Extraction};
use super::insights::{self, Insights};
use super::patterns::{self, ProductivityPatterns};
use super::suggestions::{self, Suggestion};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::types::UserSnapshot;

/// Everything derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub generated_at: DateTime<Utc>,
    pub dashboard: DashboardStats,
    pub insights: Insights,
    /// Task records excluded because they failed validation
    pub skipped_records: usize,
}

/// Pure analytics over user snapshots.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    policy: AnalyticsConfig,
    offset: FixedOffset,
}

impl AnalyticsEngine {
    /// Create an engine, validating the policy once up front.
    pub fn new(policy: AnalyticsConfig) -> Result<Self> {
        policy.validate()?;
        let offset = policy.offset()?;
        Ok(Self { policy, offset })
    }

    pub fn policy(&self) -> &AnalyticsConfig {
        &self.policy
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    fn extract(&self, snapshot: &UserSnapshot) -> Extraction {
        extract(snapshot, None)
    }

    /// Dashboard, insights and recommendations in one pass.
    pub fn compute(&self, snapshot: &UserSnapshot, now: DateTime<Utc>) -> AggregateResult {
        let start = Instant::now();
        let extraction = self.extract(snapshot);

        let result = AggregateResult {
            generated_at: now,
            dashboard: dashboard::compute(&extraction, now, &self.offset),
            insights: insights::compute(&extraction, now, &self.policy),
            skipped_records: extraction.skipped,
        };

        tracing::debug!(
            tasks = snapshot.tasks.len(),
            skipped = result.skipped_records,
            burnout = result.insights.burnout.risk.as_str(),
            duration_us = start.elapsed().as_micros() as u64,
            "Computed aggregate result"
        );

        result
    }

    /// Hour/day/category patterns over the burnout window.
    pub fn patterns(&self, snapshot: &UserSnapshot, now: DateTime<Utc>) -> ProductivityPatterns {
        patterns::compute(
            &self.extract(snapshot),
            now,
            self.policy.burnout_window_days,
            &self.offset,
        )
    }

    /// Ordered contextual suggestions, capped by policy.
    pub fn suggestions(&self, snapshot: &UserSnapshot, now: DateTime<Utc>) -> Vec<Suggestion> {
        suggestions::compute(
            &self.extract(snapshot),
            now,
            &self.policy.suggestions,
            self.policy.trend_window_days,
            &self.offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::recommend::RecommendationKey;
    use crate::analytics::testutil::{category, completed, now, task, SnapshotBuilder};
    use crate::types::TaskStatus;
    use chrono::Duration;

    fn engine() -> AnalyticsEngine {
        AnalyticsEngine::new(AnalyticsConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_policy() {
        let policy = AnalyticsConfig {
            burnout_window_days: 0,
            ..AnalyticsConfig::default()
        };
        assert!(AnalyticsEngine::new(policy).is_err());
    }

    #[test]
    fn test_new_rejects_policies_outside_date_range() {
        let offset = AnalyticsConfig {
            utc_offset_minutes: 40_000_000,
            ..AnalyticsConfig::default()
        };
        assert!(AnalyticsEngine::new(offset).is_err());

        let window = AnalyticsConfig {
            burnout_window_days: 200_000_000,
            ..AnalyticsConfig::default()
        };
        assert!(AnalyticsEngine::new(window).is_err());

        let widest = AnalyticsConfig {
            trend_window_days: crate::config::MAX_WINDOW_DAYS,
            burnout_window_days: crate::config::MAX_WINDOW_DAYS,
            ..AnalyticsConfig::default()
        };
        let engine = AnalyticsEngine::new(widest).unwrap();
        let snapshot = UserSnapshot::default();
        assert_eq!(engine.compute(&snapshot, now()).dashboard.total_tasks, 0);
        assert!(engine.patterns(&snapshot, now()).peak_hour.is_none());
        assert!(!engine.suggestions(&snapshot, now()).is_empty());
    }

    #[test]
    fn test_compute_reports_skipped_records() {
        let mut broken = task("broken", "c", TaskStatus::Pending);
        broken.actual_minutes = Some(-10);

        let snapshot = SnapshotBuilder::new()
            .category(category("c", "Work", now() - Duration::days(10)))
            .task(completed("ok", "c", now() - Duration::hours(1), 40))
            .task(broken)
            .build();

        let result = engine().compute(&snapshot, now());
        assert_eq!(result.skipped_records, 1);
        assert_eq!(result.dashboard.total_tasks, 1);
        assert_eq!(result.dashboard.total_minutes, 40);
        assert_eq!(result.generated_at, now());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let snapshot = SnapshotBuilder::new()
            .category(category("c", "Work", now() - Duration::days(10)))
            .task(completed("a", "c", now() - Duration::hours(5), 200))
            .task(task("b", "c", TaskStatus::InProgress))
            .build();

        let engine = engine();
        let first = engine.compute(&snapshot, now());
        let second = engine.compute(&snapshot, now());
        assert_eq!(first, second);
        assert!(first
            .insights
            .recommendations
            .contains(&RecommendationKey::LongAverageTask));
    }

    #[test]
    fn test_result_serializes_for_json_output() {
        let result = engine().compute(&UserSnapshot::default(), now());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["dashboard"]["total_tasks"], 0);
        assert_eq!(json["insights"]["burnout"]["risk"], "LOW");
        assert_eq!(json["insights"]["recommendations"][0], "LOW_COMPLETION");
    }
}
