//! Database layer for TidyList
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries, always scoped to one user
//! - The TidyBot exchange log

pub mod repo;
pub mod schema;

pub use repo::{
    CategorySummary, CategoryUpdate, Database, NewCategory, NewTask, StorageStats, TaskFilter,
    TaskRow, TaskUpdate,
};
