//! Fixtures shared by the analytics unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::types::{Category, HistoryEntry, Priority, Task, TaskStatus, UserSnapshot};

/// Fixed reference instant: Wednesday 2024-03-13 12:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap()
}

pub fn category(id: &str, name: &str, created_at: DateTime<Utc>) -> Category {
    Category {
        id: id.to_string(),
        user_id: "u1".to_string(),
        name: name.to_string(),
        color: format!("#{}", name.len()),
        icon: "📝".to_string(),
        created_at,
    }
}

pub fn task(id: &str, category_id: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        user_id: "u1".to_string(),
        title: format!("Task {id}"),
        description: None,
        category_id: category_id.to_string(),
        priority: Priority::Medium,
        status,
        estimated_minutes: None,
        actual_minutes: None,
        deadline: None,
        created_at: now(),
        completed_at: None,
    }
}

/// A COMPLETED task finished at `completed_at` with an actual duration.
pub fn completed(
    id: &str,
    category_id: &str,
    completed_at: DateTime<Utc>,
    actual_minutes: i64,
) -> Task {
    Task {
        actual_minutes: Some(actual_minutes),
        completed_at: Some(completed_at),
        created_at: completed_at - chrono::Duration::hours(1),
        ..task(id, category_id, TaskStatus::Completed)
    }
}

#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: UserSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.snapshot.categories.push(category);
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.snapshot.tasks.push(task);
        self
    }

    pub fn history(mut self, task_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let n = self.snapshot.history.len();
        self.snapshot.history.push(HistoryEntry {
            id: format!("h{n}"),
            task_id: task_id.to_string(),
            started_at: start,
            ended_at: end,
            note: None,
        });
        self
    }

    pub fn build(self) -> UserSnapshot {
        self.snapshot
    }
}
