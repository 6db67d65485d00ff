//! Integration tests for the storage → snapshot → analytics pipeline
//!
//! These drive the public API only: a file-backed database, the analytics
//! engine over its snapshots, and TidyBot with a canned text provider.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;
use tidylist_core::analytics::{BurnoutRisk, EstimateComparison, PageRequest, RecommendationKey};
use tidylist_core::config::AnalyticsConfig;
use tidylist_core::db::{NewCategory, NewTask, TaskUpdate};
use tidylist_core::tidybot::{InsightKind, InsightTextProvider, TidyBot, TidyBotRequest};
use tidylist_core::{AnalyticsEngine, Database, Error, Locale, Priority, Task, TaskStatus};

const USER: &str = "user-1";

// ============================================
// Helpers
// ============================================

fn open_db(dir: &TempDir) -> Database {
    tidylist_core::logging::init_test();
    let path: PathBuf = dir.path().join("tidylist.db");
    let db = Database::open(&path).expect("failed to open database");
    db.migrate().expect("failed to migrate database");
    db
}

fn category(db: &Database, name: &str) -> String {
    db.create_category(
        USER,
        &NewCategory {
            name: name.to_string(),
            color: None,
            icon: None,
        },
    )
    .expect("failed to create category")
    .id
}

fn task(
    db: &Database,
    category_id: &str,
    title: &str,
    priority: Priority,
    estimate: Option<i64>,
    deadline: Option<DateTime<Utc>>,
) -> Task {
    db.create_task(
        USER,
        &NewTask {
            title: title.to_string(),
            description: None,
            category_id: category_id.to_string(),
            priority: Some(priority),
            estimated_minutes: estimate,
            deadline,
        },
    )
    .expect("failed to create task")
}

fn complete(db: &Database, id: &str, actual: Option<i64>) -> Task {
    db.update_task(
        USER,
        id,
        &TaskUpdate {
            status: Some(TaskStatus::Completed),
            actual_minutes: actual,
            ..Default::default()
        },
    )
    .expect("failed to complete task")
}

/// A moment safely after everything the test just wrote.
fn later() -> DateTime<Utc> {
    Utc::now() + Duration::seconds(1)
}

struct RecordingProvider {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl InsightTextProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> Option<&str> {
        Some("canned-1")
    }

    fn generate(&self, prompt: &str) -> tidylist_core::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("  Take a short break, then tackle the urgent report.  ".to_string())
    }
}

// ============================================
// Pipeline
// ============================================

#[test]
fn test_dashboard_and_insights_from_stored_tasks() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let engine = AnalyticsEngine::new(AnalyticsConfig::default()).unwrap();

    let work = category(&db, "Work");
    let home = category(&db, "Home");

    let report = task(&db, &work, "Report", Priority::Medium, Some(60), None);
    let laundry = task(&db, &home, "Laundry", Priority::Low, Some(30), None);
    task(&db, &work, "Plan sprint", Priority::High, None, None);
    task(
        &db,
        &work,
        "Invoice",
        Priority::Urgent,
        Some(20),
        Some(Utc::now() - Duration::hours(1)),
    );

    complete(&db, &report.id, Some(45));
    // No actual duration: the estimate stands in
    complete(&db, &laundry.id, None);

    let snapshot = db.load_snapshot(USER).unwrap();
    let result = engine.compute(&snapshot, later());
    assert_eq!(result.skipped_records, 0);

    let dashboard = &result.dashboard;
    assert_eq!(dashboard.total_tasks, 4);
    assert_eq!(dashboard.completed_tasks, 2);
    assert_eq!(dashboard.pending_tasks, 2);
    assert_eq!(dashboard.total_minutes, 75);

    let breakdown: Vec<_> = dashboard
        .weekly_breakdown
        .iter()
        .map(|s| (s.name.as_str(), s.minutes, s.percentage))
        .collect();
    assert_eq!(breakdown, [("Work", 45, 60), ("Home", 30, 40)]);

    let insights = &result.insights;
    assert_eq!(insights.trend.current_rate, 50);
    assert_eq!(insights.trend.previous_rate, 0);
    assert_eq!(insights.trend.weekly_change, 50);
    assert_eq!(insights.trend.average_task_minutes, 38);
    assert_eq!(insights.overdue_count, 1);
    assert_eq!(insights.high_priority_count, 2);
    assert_eq!(insights.burnout.risk, BurnoutRisk::Low);
    assert_eq!(insights.burnout.signals.completed_tasks, 2);
    assert_eq!(insights.burnout.signals.total_minutes, 75);
    assert_eq!(
        insights.recommendations,
        [RecommendationKey::MaintainConsistency]
    );
}

#[test]
fn test_empty_user_gets_zeroed_report() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let engine = AnalyticsEngine::new(AnalyticsConfig::default()).unwrap();

    let result = engine.compute(&db.load_snapshot(USER).unwrap(), later());
    assert_eq!(result.dashboard.total_tasks, 0);
    assert_eq!(result.dashboard.total_minutes, 0);
    assert!(result.dashboard.weekly_breakdown.is_empty());
    assert_eq!(result.insights.trend.current_rate, 0);
    assert_eq!(result.insights.burnout.risk, BurnoutRisk::Low);
    // 0% completion is below the default threshold
    assert_eq!(
        result.insights.recommendations,
        [RecommendationKey::LowCompletion]
    );
}

#[test]
fn test_thresholds_change_recommendations() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let work = category(&db, "Work");
    for i in 0..2 {
        task(&db, &work, &format!("Urgent {i}"), Priority::Urgent, None, None);
    }
    let done = task(&db, &work, "Done", Priority::Low, Some(10), None);
    complete(&db, &done.id, Some(10));

    let snapshot = db.load_snapshot(USER).unwrap();
    let now = later();

    let default = AnalyticsEngine::new(AnalyticsConfig::default()).unwrap();
    assert_eq!(
        default.compute(&snapshot, now).insights.recommendations,
        [RecommendationKey::LowCompletion]
    );

    let mut policy = AnalyticsConfig::default();
    policy.recommendations.low_completion_rate = 20;
    policy.recommendations.too_many_high_priority = 1;
    let strict = AnalyticsEngine::new(policy).unwrap();
    assert_eq!(
        strict.compute(&snapshot, now).insights.recommendations,
        [RecommendationKey::TooManyHighPriority]
    );
}

// ============================================
// History
// ============================================

#[test]
fn test_history_follows_completion_rules() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let work = category(&db, "Work");

    let slow = task(&db, &work, "Slow", Priority::Medium, Some(30), None);
    let untimed = task(&db, &work, "Untimed", Priority::Medium, Some(30), None);
    complete(&db, &slow.id, Some(50));
    complete(&db, &untimed.id, None);

    // Completing again does not add a second entry
    complete(&db, &slow.id, Some(55));

    let page = db.list_history(USER, PageRequest::new(1, 10).unwrap()).unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.pagination.total_pages, 1);

    let record = &page.records[0];
    assert_eq!(record.task.id, slow.id);
    assert_eq!(record.category.name, "Work");
    assert!(record.entry.ended_at >= record.entry.started_at);
    assert_eq!(record.comparison(), Some(EstimateComparison::Slower(25)));

    // Deleting the task removes its history
    db.delete_task(USER, &slow.id).unwrap();
    let page = db.list_history(USER, PageRequest::new(1, 10).unwrap()).unwrap();
    assert_eq!(page.pagination.total, 0);
    assert!(page.records.is_empty());
}

#[test]
fn test_history_page_beyond_end_is_empty() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let work = category(&db, "Work");
    for i in 0..3 {
        let t = task(&db, &work, &format!("Task {i}"), Priority::Low, None, None);
        complete(&db, &t.id, Some(5 + i));
    }

    let first = db.list_history(USER, PageRequest::new(1, 2).unwrap()).unwrap();
    assert_eq!(first.records.len(), 2);
    assert_eq!(first.pagination.total_pages, 2);
    // Newest first
    assert_eq!(first.records[0].task.title, "Task 2");

    let past = db.list_history(USER, PageRequest::new(5, 2).unwrap()).unwrap();
    assert!(past.records.is_empty());
    assert_eq!(past.pagination.total, 3);

    assert!(PageRequest::new(0, 10).is_err());
}

// ============================================
// Persistence
// ============================================

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let task_id = {
        let db = open_db(&dir);
        let home = category(&db, "Home");
        let t = task(&db, &home, "Water plants", Priority::Low, Some(5), None);
        complete(&db, &t.id, Some(4)).id
    };

    let db = open_db(&dir);
    let stored = db.get_task(USER, &task_id).unwrap().expect("task should persist");
    assert_eq!(stored.status, TaskStatus::Completed);
    assert_eq!(stored.actual_minutes, Some(4));
    assert!(stored.completed_at.is_some());
    let stats = db.get_storage_stats(USER).unwrap();
    assert_eq!((stats.categories, stats.tasks, stats.history_entries), (1, 1, 1));
    assert!(stats.database_size_bytes > 0);

    // Other users see nothing
    assert!(db.get_task("someone-else", &task_id).unwrap().is_none());
    assert!(db.load_snapshot("someone-else").unwrap().tasks.is_empty());
}

#[test]
fn test_category_in_use_is_reported_with_count() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let work = category(&db, "Work");
    task(&db, &work, "One", Priority::Low, None, None);
    task(&db, &work, "Two", Priority::Low, None, None);

    match db.delete_category(USER, &work) {
        Err(Error::CategoryInUse { task_count, .. }) => assert_eq!(task_count, 2),
        other => panic!("expected CategoryInUse, got {other:?}"),
    }
}

// ============================================
// TidyBot
// ============================================

#[test]
fn test_tidybot_answers_from_stored_data_and_logs() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let work = category(&db, "Work");
    task(
        &db,
        &work,
        "Quarterly report",
        Priority::Urgent,
        Some(90),
        Some(Utc::now() + Duration::days(1)),
    );

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let bot = TidyBot::new(
        AnalyticsEngine::new(AnalyticsConfig::default()).unwrap(),
        Locale::Indonesian,
        Box::new(RecordingProvider {
            prompts: Arc::clone(&prompts),
        }),
    );

    let request = TidyBotRequest::of_kind(InsightKind::ScheduleSuggestion);
    let reply = bot.ask(&db, USER, &request, later()).unwrap();
    assert_eq!(
        reply.response,
        "Take a short break, then tackle the urgent report."
    );
    assert_eq!(reply.provider, "recording");
    assert_eq!(reply.model.as_deref(), Some("canned-1"));

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Quarterly report (Work)"));
    assert!(prompts[0].contains("Respond in Indonesian"));

    let log = db.list_tidybot_exchanges(USER, 10).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].kind, "schedule-suggestion");
    assert_eq!(log[0].prompt_hash, reply.prompt_hash);
    assert!(log[0].message.is_none());
}

#[test]
fn test_tidybot_rejects_empty_chat_without_logging() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let bot = TidyBot::new(
        AnalyticsEngine::new(AnalyticsConfig::default()).unwrap(),
        Locale::English,
        Box::new(RecordingProvider {
            prompts: Arc::clone(&prompts),
        }),
    );

    let err = bot
        .ask(&db, USER, &TidyBotRequest::chat("   "), later())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert!(prompts.lock().unwrap().is_empty());
    assert!(db.list_tidybot_exchanges(USER, 10).unwrap().is_empty());
}
