//! Recommendation selection
//!
//! Maps computed rates to an ordered list of keys. Display text is the
//! caller's business (see [`crate::locale`]).

use serde::Serialize;

use crate::config::RecommendationThresholds;

/// Identifies one recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationKey {
    LowCompletion,
    ProductivityDrop,
    ManyOverdue,
    TooManyHighPriority,
    LongAverageTask,
    /// Emitted alone when no other rule fires
    MaintainConsistency,
}

impl RecommendationKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKey::LowCompletion => "LOW_COMPLETION",
            RecommendationKey::ProductivityDrop => "PRODUCTIVITY_DROP",
            RecommendationKey::ManyOverdue => "MANY_OVERDUE",
            RecommendationKey::TooManyHighPriority => "TOO_MANY_HIGH_PRIORITY",
            RecommendationKey::LongAverageTask => "LONG_AVERAGE_TASK",
            RecommendationKey::MaintainConsistency => "MAINTAIN_CONSISTENCY",
        }
    }
}

impl std::fmt::Display for RecommendationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The numbers the rules look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationInput {
    pub completion_rate: u32,
    pub weekly_change: i32,
    pub overdue_count: usize,
    pub high_priority_count: usize,
    pub average_task_minutes: u32,
}

/// Evaluate every rule in order; fall back to MAINTAIN_CONSISTENCY.
pub fn select(
    input: &RecommendationInput,
    thresholds: &RecommendationThresholds,
) -> Vec<RecommendationKey> {
    let rules = [
        (
            (input.completion_rate as i64) < thresholds.low_completion_rate as i64,
            RecommendationKey::LowCompletion,
        ),
        (
            input.weekly_change < thresholds.productivity_drop,
            RecommendationKey::ProductivityDrop,
        ),
        (
            input.overdue_count > thresholds.many_overdue,
            RecommendationKey::ManyOverdue,
        ),
        (
            input.high_priority_count > thresholds.too_many_high_priority,
            RecommendationKey::TooManyHighPriority,
        ),
        (
            input.average_task_minutes > thresholds.long_average_minutes,
            RecommendationKey::LongAverageTask,
        ),
    ];

    let mut keys: Vec<RecommendationKey> = rules
        .into_iter()
        .filter_map(|(fires, key)| fires.then_some(key))
        .collect();

    if keys.is_empty() {
        keys.push(RecommendationKey::MaintainConsistency);
    }

    tracing::debug!(?input, ?keys, "Selected recommendations");
    keys
}
