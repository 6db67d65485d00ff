//! Task analytics for TidyList
//!
//! A pure, synchronous transform from a user's [`UserSnapshot`](crate::UserSnapshot)
//! to derived productivity metrics:
//! - Dashboard counts and this week's time per category
//! - Week-over-week completion rates and average task duration
//! - Overdue and high-priority backlog counts
//! - Burnout risk from configurable threshold bands
//! - Recommendation and suggestion keys (display text lives in [`crate::locale`])
//! - Hour/day/category productivity patterns
//!
//! Nothing in here performs I/O. Records that fail validation are skipped
//! and counted instead of failing the computation.
//!
//! See [`engine`] for the entry point.

pub mod aggregate;
pub mod dashboard;
pub mod engine;
pub mod extract;
pub mod history;
pub mod insights;
pub mod patterns;
pub mod rates;
pub mod recommend;
pub mod suggestions;

#[cfg(test)]
pub(crate) mod testutil;

pub use dashboard::{CategoryShare, DashboardStats};
pub use engine::{AggregateResult, AnalyticsEngine};
pub use extract::{extract, Extraction, TaskMetric, TimeWindow, WindowFilter};
pub use history::{
    compare_estimate, EstimateComparison, HistoryPage, HistoryRecord, PageRequest, Pagination,
};
pub use insights::{BurnoutAssessment, Insights, WeeklyTrend};
pub use patterns::{CategoryPattern, ProductivityPatterns, Slot};
pub use rates::{BurnoutRisk, BurnoutSignals};
pub use recommend::{RecommendationInput, RecommendationKey};
pub use suggestions::{Suggestion, SuggestionKey};
