//! Error types for tidylist-core

use thiserror::Error;

/// Main error type for the tidylist-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Insight text provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Task not found (or not owned by the requesting user)
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// Category not found (or not owned by the requesting user)
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// Category still has tasks attached and cannot be deleted
    #[error("category {id} still has {task_count} task(s)")]
    CategoryInUse { id: String, task_count: i64 },

    /// A record failed validation before being written
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A TidyBot request was malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for tidylist-core
pub type Result<T> = std::result::Result<T, Error>;
