//! Database repository layer
//!
//! Provides query and insert operations for all entity types. Every query is
//! scoped by `user_id`; a record owned by someone else behaves exactly like a
//! missing one.

use crate::analytics::{HistoryPage, HistoryRecord, PageRequest};
use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

/// Category with the number of tasks filed under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub task_count: i64,
}

/// Task joined with its category for list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    pub task: Task,
    pub category: Category,
}

/// Storage overview for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Size of the whole database file, all users included
    pub database_size_bytes: u64,
    pub categories: i64,
    pub tasks: i64,
    pub history_entries: i64,
    pub tidybot_exchanges: i64,
}

/// Fields for a new category. Color and icon fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Partial category update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Fields for a new task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category_id: String,
    /// Defaults to MEDIUM
    pub priority: Option<Priority>,
    pub estimated_minutes: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial task update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub estimated_minutes: Option<i64>,
    pub actual_minutes: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    /// Note for the history entry written on completion
    pub note: Option<String>,
}

/// Filter for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Filter by status
    pub status: Option<TaskStatus>,
    /// Filter by category ID
    pub category_id: Option<String>,
}

/// Column list for a category joined under the `c_` prefix.
const CATEGORY_JOIN_COLUMNS: &str = "c.id AS c_id, c.user_id AS c_user_id, c.name AS c_name, \
     c.color AS c_color, c.icon AS c_icon, c.created_at AS c_created_at";

/// Format a timestamp for storage.
fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_opt_ts(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Trimmed, non-empty text or an InvalidInput error naming `field`.
fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn non_negative(value: Option<i64>, field: &str) -> Result<Option<i64>> {
    match value {
        Some(m) if m < 0 => Err(Error::InvalidInput(format!(
            "{field} must not be negative (got {m})"
        ))),
        other => Ok(other),
    }
}

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    // ============================================
    // Category operations
    // ============================================

    /// Create a category for `user_id`
    pub fn create_category(&self, user_id: &str, new: &NewCategory) -> Result<Category> {
        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: required_text(&new.name, "category name")?,
            color: new
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            icon: new
                .icon
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
            created_at: Utc::now(),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO categories (id, user_id, name, color, icon, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                category.id,
                category.user_id,
                category.name,
                category.color,
                category.icon,
                ts(&category.created_at),
            ],
        )?;

        tracing::info!(category_id = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    /// Get a category by ID
    pub fn get_category(&self, user_id: &str, id: &str) -> Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM categories WHERE id = ? AND user_id = ?",
            [id, user_id],
            Self::row_to_category,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List categories in creation order, with task counts
    pub fn list_categories(&self, user_id: &str) -> Result<Vec<CategorySummary>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT c.*, COUNT(t.id) AS task_count
            FROM categories c
            LEFT JOIN tasks t ON t.category_id = c.id
            WHERE c.user_id = ?
            GROUP BY c.id
            ORDER BY c.created_at ASC, c.rowid ASC
            "#,
        )?;

        let summaries = stmt
            .query_map([user_id], |row| {
                Ok(CategorySummary {
                    category: Self::row_to_category(row)?,
                    task_count: row.get("task_count")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Update a category's name, color or icon
    pub fn update_category(
        &self,
        user_id: &str,
        id: &str,
        update: &CategoryUpdate,
    ) -> Result<Category> {
        let mut category = self
            .get_category(user_id, id)?
            .ok_or_else(|| Error::CategoryNotFound(id.to_string()))?;

        if let Some(name) = &update.name {
            category.name = required_text(name, "category name")?;
        }
        if let Some(color) = &update.color {
            category.color = color.clone();
        }
        if let Some(icon) = &update.icon {
            category.icon = icon.clone();
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE categories SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4 AND user_id = ?5",
            params![category.name, category.color, category.icon, id, user_id],
        )?;

        tracing::info!(category_id = %id, "Updated category");
        Ok(category)
    }

    /// Delete a category.
    ///
    /// Fails with [`Error::CategoryInUse`] while any task still references it.
    pub fn delete_category(&self, user_id: &str, id: &str) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM categories WHERE id = ? AND user_id = ?",
            [id, user_id],
            |r| r.get(0),
        )?;
        if exists == 0 {
            return Err(Error::CategoryNotFound(id.to_string()));
        }

        let task_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tasks WHERE category_id = ?",
            [id],
            |r| r.get(0),
        )?;
        if task_count > 0 {
            tracing::warn!(category_id = %id, task_count, "Refusing to delete category in use");
            return Err(Error::CategoryInUse {
                id: id.to_string(),
                task_count,
            });
        }

        tx.execute(
            "DELETE FROM categories WHERE id = ? AND user_id = ?",
            [id, user_id],
        )?;
        tx.commit()?;

        tracing::info!(category_id = %id, "Deleted category");
        Ok(())
    }

    fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
        let created_at_str: String = row.get("created_at")?;
        Ok(Category {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            icon: row.get("icon")?,
            created_at: parse_ts(&created_at_str),
        })
    }

    /// Category columns selected with [`CATEGORY_JOIN_COLUMNS`]
    fn row_to_joined_category(row: &Row) -> rusqlite::Result<Category> {
        let created_at_str: String = row.get("c_created_at")?;
        Ok(Category {
            id: row.get("c_id")?,
            user_id: row.get("c_user_id")?,
            name: row.get("c_name")?,
            color: row.get("c_color")?,
            icon: row.get("c_icon")?,
            created_at: parse_ts(&created_at_str),
        })
    }

    fn category_exists(conn: &Connection, user_id: &str, id: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE id = ? AND user_id = ?",
            [id, user_id],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    // ============================================
    // Task operations
    // ============================================

    /// Create a task in PENDING status
    pub fn create_task(&self, user_id: &str, new: &NewTask) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: required_text(&new.title, "title")?,
            description: new.description.clone().filter(|d| !d.trim().is_empty()),
            category_id: new.category_id.clone(),
            priority: new.priority.unwrap_or_default(),
            status: TaskStatus::Pending,
            estimated_minutes: non_negative(new.estimated_minutes, "estimated duration")?,
            actual_minutes: None,
            deadline: new.deadline,
            created_at: now,
            completed_at: None,
        };

        let conn = self.conn.lock().unwrap();
        if !Self::category_exists(&conn, user_id, &task.category_id)? {
            return Err(Error::CategoryNotFound(task.category_id));
        }

        conn.execute(
            r#"
            INSERT INTO tasks (id, user_id, title, description, category_id, priority, status,
                               estimated_minutes, actual_minutes, deadline, created_at,
                               updated_at, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                task.id,
                task.user_id,
                task.title,
                task.description,
                task.category_id,
                task.priority.as_str(),
                task.status.as_str(),
                task.estimated_minutes,
                task.actual_minutes,
                task.deadline.as_ref().map(ts),
                ts(&task.created_at),
                ts(&now),
                task.completed_at.as_ref().map(ts),
            ],
        )?;

        tracing::info!(task_id = %task.id, priority = task.priority.as_str(), "Created task");
        Ok(task)
    }

    /// Get a task by ID
    pub fn get_task(&self, user_id: &str, id: &str) -> Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        Self::get_task_with(&conn, user_id, id)
    }

    fn get_task_with(conn: &Connection, user_id: &str, id: &str) -> Result<Option<Task>> {
        conn.query_row(
            "SELECT * FROM tasks WHERE id = ? AND user_id = ?",
            [id, user_id],
            Self::row_to_task,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List tasks with their categories.
    ///
    /// Ordered by status (open work first), then priority (most pressing
    /// first), then newest first.
    pub fn list_tasks(&self, user_id: &str, filter: &TaskFilter) -> Result<Vec<TaskRow>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = format!(
            "SELECT t.*, {CATEGORY_JOIN_COLUMNS} FROM tasks t \
             JOIN categories c ON c.id = t.category_id \
             WHERE t.user_id = ?"
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string())];

        if let Some(status) = &filter.status {
            sql.push_str(" AND t.status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        if let Some(category_id) = &filter.category_id {
            sql.push_str(" AND t.category_id = ?");
            params.push(Box::new(category_id.clone()));
        }

        sql.push_str(
            r#"
            ORDER BY
                CASE t.status
                    WHEN 'PENDING' THEN 0
                    WHEN 'IN_PROGRESS' THEN 1
                    WHEN 'COMPLETED' THEN 2
                    ELSE 3
                END ASC,
                CASE t.priority
                    WHEN 'URGENT' THEN 3
                    WHEN 'HIGH' THEN 2
                    WHEN 'MEDIUM' THEN 1
                    ELSE 0
                END DESC,
                t.created_at DESC
            "#,
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok(TaskRow {
                    task: Self::row_to_task(row)?,
                    category: Self::row_to_joined_category(row)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Apply a partial update to a task.
    ///
    /// Status bookkeeping:
    /// - entering COMPLETED without a completion time stamps `completed_at`
    ///   and, when an actual duration is given, writes the task's single
    ///   history entry (start = creation, end = now)
    /// - an explicit change to any other status clears `completed_at`
    pub fn update_task(&self, user_id: &str, id: &str, update: &TaskUpdate) -> Result<Task> {
        let now = Utc::now();
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let existing = Self::get_task_with(&tx, user_id, id)?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let mut task = existing.clone();

        if let Some(title) = &update.title {
            task.title = required_text(title, "title")?;
        }
        if let Some(description) = &update.description {
            task.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
        }
        if let Some(category_id) = &update.category_id {
            if !Self::category_exists(&tx, user_id, category_id)? {
                return Err(Error::CategoryNotFound(category_id.clone()));
            }
            task.category_id = category_id.clone();
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(minutes) = non_negative(update.estimated_minutes, "estimated duration")? {
            task.estimated_minutes = Some(minutes);
        }
        if let Some(minutes) = non_negative(update.actual_minutes, "actual duration")? {
            task.actual_minutes = Some(minutes);
        }
        if let Some(deadline) = update.deadline {
            task.deadline = Some(deadline);
        }

        let newly_completed = update.status == Some(TaskStatus::Completed)
            && existing.completed_at.is_none();
        match update.status {
            Some(TaskStatus::Completed) => {
                task.status = TaskStatus::Completed;
                if newly_completed {
                    task.completed_at = Some(now);
                }
            }
            Some(status) => {
                task.status = status;
                task.completed_at = None;
            }
            None => {}
        }

        tx.execute(
            r#"
            UPDATE tasks SET
                title = ?1, description = ?2, category_id = ?3, priority = ?4, status = ?5,
                estimated_minutes = ?6, actual_minutes = ?7, deadline = ?8,
                updated_at = ?9, completed_at = ?10
            WHERE id = ?11 AND user_id = ?12
            "#,
            params![
                task.title,
                task.description,
                task.category_id,
                task.priority.as_str(),
                task.status.as_str(),
                task.estimated_minutes,
                task.actual_minutes,
                task.deadline.as_ref().map(ts),
                ts(&now),
                task.completed_at.as_ref().map(ts),
                id,
                user_id,
            ],
        )?;

        let has_actual = update.actual_minutes.is_some_and(|m| m > 0);
        if newly_completed && has_actual {
            let inserted = tx.execute(
                r#"
                INSERT OR IGNORE INTO task_history (id, task_id, started_at, ended_at, note)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    uuid::Uuid::new_v4().to_string(),
                    task.id,
                    ts(&task.created_at),
                    ts(&now.max(task.created_at)),
                    update.note.as_deref().filter(|n| !n.trim().is_empty()),
                ],
            )?;
            if inserted == 0 {
                tracing::debug!(task_id = %task.id, "History entry already present");
            } else {
                tracing::info!(task_id = %task.id, "Recorded task history");
            }
        }

        tx.commit()?;

        tracing::info!(
            task_id = %task.id,
            status = task.status.as_str(),
            "Updated task"
        );
        Ok(task)
    }

    /// Delete a task (its history entry goes with it)
    pub fn delete_task(&self, user_id: &str, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM tasks WHERE id = ? AND user_id = ?",
            [id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        tracing::info!(task_id = %id, "Deleted task");
        Ok(())
    }

    fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
        let priority_str: String = row.get("priority")?;
        let status_str: String = row.get("status")?;
        let created_at_str: String = row.get("created_at")?;

        Ok(Task {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category_id: row.get("category_id")?,
            priority: priority_str.parse().unwrap_or_default(),
            status: status_str.parse().unwrap_or_default(),
            estimated_minutes: row.get("estimated_minutes")?,
            actual_minutes: row.get("actual_minutes")?,
            deadline: parse_opt_ts(row.get("deadline")?),
            created_at: parse_ts(&created_at_str),
            completed_at: parse_opt_ts(row.get("completed_at")?),
        })
    }

    // ============================================
    // ID resolution
    // ============================================

    /// Resolve a unique task ID prefix to a full ID
    pub fn resolve_task_id(&self, user_id: &str, prefix: &str) -> Result<String> {
        self.resolve_id("tasks", user_id, prefix)
            .and_then(|id| id.ok_or_else(|| Error::TaskNotFound(prefix.to_string())))
    }

    /// Resolve a unique category ID prefix to a full ID
    pub fn resolve_category_id(&self, user_id: &str, prefix: &str) -> Result<String> {
        self.resolve_id("categories", user_id, prefix)
            .and_then(|id| id.ok_or_else(|| Error::CategoryNotFound(prefix.to_string())))
    }

    fn resolve_id(&self, table: &str, user_id: &str, prefix: &str) -> Result<Option<String>> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(Error::InvalidInput("id must not be empty".to_string()));
        }

        let conn = self.conn.lock().unwrap();

        // Exact match first, then prefix (UUID characters only, so no LIKE escaping)
        let exact: Option<String> = conn
            .query_row(
                &format!("SELECT id FROM {table} WHERE id = ? AND user_id = ?"),
                [prefix, user_id],
                |r| r.get(0),
            )
            .optional()?;
        if exact.is_some() {
            return Ok(exact);
        }
        if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Ok(None);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT id FROM {table} WHERE user_id = ? AND id LIKE ? || '%' LIMIT 2"
        ))?;
        let matches = stmt
            .query_map([user_id, prefix], |r| r.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only.clone())),
            _ => Err(Error::InvalidInput(format!(
                "id prefix '{prefix}' is ambiguous"
            ))),
        }
    }

    // ============================================
    // History operations
    // ============================================

    /// One page of history entries, newest completion first
    pub fn list_history(&self, user_id: &str, page: PageRequest) -> Result<HistoryPage> {
        let conn = self.conn.lock().unwrap();

        let total: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM task_history h
            JOIN tasks t ON t.id = h.task_id
            WHERE t.user_id = ?
            "#,
            [user_id],
            |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT h.id AS h_id, h.task_id AS h_task_id, h.started_at AS h_started_at,
                   h.ended_at AS h_ended_at, h.note AS h_note,
                   t.*, {CATEGORY_JOIN_COLUMNS}
            FROM task_history h
            JOIN tasks t ON t.id = h.task_id
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?
            ORDER BY h.ended_at DESC, h.rowid DESC
            LIMIT ? OFFSET ?
            "#
        ))?;

        let records = stmt
            .query_map(
                params![user_id, page.limit as i64, page.offset() as i64],
                |row| {
                    Ok(HistoryRecord {
                        entry: Self::row_to_joined_history(row)?,
                        task: Self::row_to_task(row)?,
                        category: Self::row_to_joined_category(row)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(HistoryPage {
            records,
            pagination: page.paginate(total.max(0) as u64),
        })
    }

    fn row_to_history(row: &Row) -> rusqlite::Result<HistoryEntry> {
        let started_at_str: String = row.get("started_at")?;
        let ended_at_str: String = row.get("ended_at")?;
        Ok(HistoryEntry {
            id: row.get("id")?,
            task_id: row.get("task_id")?,
            started_at: parse_ts(&started_at_str),
            ended_at: parse_ts(&ended_at_str),
            note: row.get("note")?,
        })
    }

    fn row_to_joined_history(row: &Row) -> rusqlite::Result<HistoryEntry> {
        let started_at_str: String = row.get("h_started_at")?;
        let ended_at_str: String = row.get("h_ended_at")?;
        Ok(HistoryEntry {
            id: row.get("h_id")?,
            task_id: row.get("h_task_id")?,
            started_at: parse_ts(&started_at_str),
            ended_at: parse_ts(&ended_at_str),
            note: row.get("h_note")?,
        })
    }

    // ============================================
    // Analytics snapshot
    // ============================================

    /// Everything the analytics engine needs for one user
    pub fn load_snapshot(&self, user_id: &str) -> Result<UserSnapshot> {
        let conn = self.conn.lock().unwrap();

        let categories = conn
            .prepare("SELECT * FROM categories WHERE user_id = ? ORDER BY created_at, rowid")?
            .query_map([user_id], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let tasks = conn
            .prepare("SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at, rowid")?
            .query_map([user_id], Self::row_to_task)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let history = conn
            .prepare(
                r#"
                SELECT h.*
                FROM task_history h
                JOIN tasks t ON t.id = h.task_id
                WHERE t.user_id = ?
                ORDER BY h.ended_at, h.rowid
                "#,
            )?
            .query_map([user_id], Self::row_to_history)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(
            user_id,
            tasks = tasks.len(),
            categories = categories.len(),
            history = history.len(),
            "Loaded snapshot"
        );

        Ok(UserSnapshot {
            tasks,
            categories,
            history,
        })
    }

    // ============================================
    // TidyBot exchange log
    // ============================================

    /// Record one TidyBot exchange
    pub fn insert_tidybot_exchange(&self, exchange: &TidyBotExchange) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO tidybot_exchanges (id, user_id, kind, provider, model, message,
                                           prompt_hash, response, duration_ms, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                exchange.id,
                exchange.user_id,
                exchange.kind,
                exchange.provider,
                exchange.model,
                exchange.message,
                exchange.prompt_hash,
                exchange.response,
                exchange.duration_ms,
                ts(&exchange.created_at),
            ],
        )?;
        Ok(())
    }

    /// Most recent TidyBot exchanges, newest first
    pub fn list_tidybot_exchanges(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<TidyBotExchange>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM tidybot_exchanges
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )?;

        let exchanges = stmt
            .query_map(params![user_id, limit as i64], |row| {
                let created_at_str: String = row.get("created_at")?;
                Ok(TidyBotExchange {
                    id: row.get("id")?,
                    user_id: row.get("user_id")?,
                    kind: row.get("kind")?,
                    provider: row.get("provider")?,
                    model: row.get("model")?,
                    message: row.get("message")?,
                    prompt_hash: row.get("prompt_hash")?,
                    response: row.get("response")?,
                    duration_ms: row.get("duration_ms")?,
                    created_at: parse_ts(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(exchanges)
    }

    // ============================================
    // Storage health
    // ============================================

    /// Get the database file size in bytes
    pub fn get_database_size(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let page_count: i64 = conn.query_row("PRAGMA page_count", [], |r| r.get(0))?;
        let page_size: i64 = conn.query_row("PRAGMA page_size", [], |r| r.get(0))?;
        Ok((page_count * page_size).max(0) as u64)
    }

    /// Row counts for `user_id` plus the database size.
    pub fn get_storage_stats(&self, user_id: &str) -> Result<StorageStats> {
        let database_size_bytes = self.get_database_size()?;

        let conn = self.conn.lock().unwrap();
        let count = |sql: &str| -> Result<i64> {
            conn.query_row(sql, params![user_id], |r| r.get(0))
                .map_err(Error::from)
        };

        Ok(StorageStats {
            database_size_bytes,
            categories: count("SELECT COUNT(*) FROM categories WHERE user_id = ?")?,
            tasks: count("SELECT COUNT(*) FROM tasks WHERE user_id = ?")?,
            history_entries: count(
                r#"
                SELECT COUNT(*) FROM task_history h
                JOIN tasks t ON t.id = h.task_id
                WHERE t.user_id = ?
                "#,
            )?,
            tidybot_exchanges: count("SELECT COUNT(*) FROM tidybot_exchanges WHERE user_id = ?")?,
        })
    }
}
