//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.
//! Timestamps are RFC 3339 strings in UTC with a fixed number of fractional
//! digits, so lexical order is chronological order.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: categories, tasks, history
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id               TEXT PRIMARY KEY,
        user_id          TEXT NOT NULL,
        name             TEXT NOT NULL,
        color            TEXT NOT NULL DEFAULT '#3B82F6',
        icon             TEXT NOT NULL DEFAULT '📝',
        created_at       DATETIME NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id                TEXT PRIMARY KEY,
        user_id           TEXT NOT NULL,
        title             TEXT NOT NULL,
        description       TEXT,
        -- A category with tasks cannot be deleted
        category_id       TEXT NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
        priority          TEXT NOT NULL DEFAULT 'MEDIUM',
        status            TEXT NOT NULL DEFAULT 'PENDING',
        estimated_minutes INTEGER,
        actual_minutes    INTEGER,
        deadline          DATETIME,
        created_at        DATETIME NOT NULL,
        updated_at        DATETIME NOT NULL,
        completed_at      DATETIME
    );

    -- At most one close-out record per task
    CREATE TABLE IF NOT EXISTS task_history (
        id               TEXT PRIMARY KEY,
        task_id          TEXT NOT NULL UNIQUE REFERENCES tasks(id) ON DELETE CASCADE,
        started_at       DATETIME NOT NULL,
        ended_at         DATETIME NOT NULL,
        note             TEXT,
        CHECK (ended_at >= started_at)
    );

    CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_user_status ON tasks(user_id, status);
    CREATE INDEX IF NOT EXISTS idx_history_ended ON task_history(ended_at);
    "#,
    // Version 2: TidyBot exchange log
    r#"
    CREATE TABLE IF NOT EXISTS tidybot_exchanges (
        id               TEXT PRIMARY KEY,
        user_id          TEXT NOT NULL,
        kind             TEXT NOT NULL,
        provider         TEXT NOT NULL,
        model            TEXT,
        message          TEXT,
        prompt_hash      TEXT NOT NULL,
        response         TEXT NOT NULL,
        duration_ms      INTEGER NOT NULL,
        created_at       DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_tidybot_user ON tidybot_exchanges(user_id, created_at);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        for table in ["categories", "tasks", "task_history", "tidybot_exchanges"] {
            let exists: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        run_migrations(&conn).unwrap();

        // (table, on_delete)
        let fk_list: Vec<(String, String)> = conn
            .prepare("PRAGMA foreign_key_list(tasks)")
            .unwrap()
            .query_map([], |row| {
                Ok((row.get::<_, String>(2)?, row.get::<_, String>(6)?))
            })
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();
        assert!(fk_list
            .iter()
            .any(|(table, on_delete)| table == "categories" && on_delete == "RESTRICT"));

        let fk_list: Vec<(String, String)> = conn
            .prepare("PRAGMA foreign_key_list(task_history)")
            .unwrap()
            .query_map([], |row| {
                Ok((row.get::<_, String>(2)?, row.get::<_, String>(6)?))
            })
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();
        assert!(fk_list
            .iter()
            .any(|(table, on_delete)| table == "tasks" && on_delete == "CASCADE"));
    }
}
