//! Core domain types for TidyList
//!
//! These types mirror the records owned by the storage layer. The analytics
//! engine only ever reads them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Task** | A user-owned unit of work with status, priority, timing and category |
//! | **Category** | A user-defined grouping for tasks, with color and icon metadata |
//! | **HistoryEntry** | The immutable close-out record of a completed task |
//! | **Duration-used** | Actual duration if recorded, else the estimate, else zero |
//! | **Snapshot** | Every task, category and history entry of one user, already fetched |
//! | **Exchange** | One logged TidyBot prompt/response pair |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default display color for new categories.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Default display icon for new categories.
pub const DEFAULT_CATEGORY_ICON: &str = "📝";

// ============================================
// Priority
// ============================================

/// Task priority, ordered from least to most pressing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    /// HIGH and URGENT tasks count towards the high-priority backlog.
    pub fn is_high(&self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "URGENT" => Ok(Priority::Urgent),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

// ============================================
// Task status
// ============================================

/// Task lifecycle status.
///
/// Transitions are driven by the user (PENDING → IN_PROGRESS → COMPLETED,
/// COMPLETED back to anything, CANCELLED from anywhere); nothing here
/// enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// PENDING or IN_PROGRESS.
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }

    /// Position used when listing tasks (open work first).
    pub fn sort_rank(&self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed => 2,
            TaskStatus::Cancelled => 3,
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "PENDING" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("unknown task status: {}", s)),
        }
    }
}

// ============================================
// Category
// ============================================

/// A user-defined grouping for tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Display color (hex)
    pub color: String,
    /// Display icon
    pub icon: String,
    /// When the category was created; dashboards sort by this
    pub created_at: DateTime<Utc>,
}

// ============================================
// Task
// ============================================

/// A unit of work.
///
/// Durations are kept as signed integers because that is what storage
/// hands back; the analytics extractor rejects negative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Owning user
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Category reference (required)
    pub category_id: String,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Estimated duration in minutes
    pub estimated_minutes: Option<i64>,
    /// Actual recorded duration in minutes
    pub actual_minutes: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Set iff `status == Completed`
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Actual duration if present, else the estimate, else zero.
    ///
    /// Zero and negative values are treated as absent.
    pub fn duration_used(&self) -> u32 {
        self.actual_minutes
            .filter(|m| *m > 0)
            .or(self.estimated_minutes.filter(|m| *m > 0))
            .map(|m| m.min(u32::MAX as i64) as u32)
            .unwrap_or(0)
    }

    /// Open (PENDING/IN_PROGRESS) with a deadline strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.deadline.is_some_and(|d| d < now)
    }
}

// ============================================
// History
// ============================================

/// Close-out record written once when a task is completed with an actual
/// duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// The task this entry closes out
    pub task_id: String,
    /// When work started (the task's creation time)
    pub started_at: DateTime<Utc>,
    /// When the task was completed; never before `started_at`
    pub ended_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl HistoryEntry {
    /// Whether `ended_at >= started_at`.
    pub fn is_well_formed(&self) -> bool {
        self.ended_at >= self.started_at
    }
}

// ============================================
// Snapshot
// ============================================

/// Everything the analytics engine needs for one user.
///
/// Produced by the storage layer, already scoped to the user. The engine
/// does not re-check ownership.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub history: Vec<HistoryEntry>,
}

// ============================================
// TidyBot exchange log
// ============================================

/// One question/answer round trip with the insight text provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyBotExchange {
    pub id: String,
    pub user_id: String,
    /// Request kind identifier (e.g. "chat", "weekly-insight")
    pub kind: String,
    /// Provider name (e.g. "gemini")
    pub provider: String,
    pub model: Option<String>,
    /// The user's message, for chat requests
    pub message: Option<String>,
    /// SHA-256 of the full prompt, hex encoded
    pub prompt_hash: String,
    pub response: String,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(status: TaskStatus) -> Task {
        Task {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            title: "Write report".to_string(),
            description: None,
            category_id: "c1".to_string(),
            priority: Priority::Medium,
            status,
            estimated_minutes: None,
            actual_minutes: None,
            deadline: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_duration_used_prefers_actual() {
        let mut t = task(TaskStatus::Completed);
        assert_eq!(t.duration_used(), 0);

        t.estimated_minutes = Some(60);
        assert_eq!(t.duration_used(), 60);

        t.actual_minutes = Some(45);
        assert_eq!(t.duration_used(), 45);
    }

    #[test]
    fn test_overdue_requires_open_status() {
        let now = Utc::now();
        let mut t = task(TaskStatus::Pending);
        t.deadline = Some(now - Duration::hours(1));
        assert!(t.is_overdue(now));

        t.status = TaskStatus::Completed;
        assert!(!t.is_overdue(now));

        t.status = TaskStatus::InProgress;
        t.deadline = Some(now);
        assert!(!t.is_overdue(now), "deadline equal to now is not overdue");
    }

    #[test]
    fn test_status_and_priority_parse() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("URGENT".parse::<Priority>(), Ok(Priority::Urgent));
        assert!("someday".parse::<Priority>().is_err());
        assert!(Priority::Urgent > Priority::High);
    }
}
