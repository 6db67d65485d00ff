//! # tidylist-core
//!
//! Core library for TidyList - a personal task manager with time tracking
//! and productivity insights.
//!
//! This library provides:
//! - Domain types for tasks, categories and history entries
//! - Database storage layer with SQLite
//! - The task analytics engine (dashboard, insights, recommendations)
//! - TidyBot prompt construction over a pluggable text provider
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows in one direction:
//! - **Storage:** SQLite tables owned by [`Database`], always scoped to one user
//! - **Analytics:** [`AnalyticsEngine`] turns a [`UserSnapshot`] into derived
//!   metrics without any I/O
//! - **Presentation:** callers render keys through [`Locale`] or hand the
//!   metrics to [`tidybot`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use tidylist_core::{AnalyticsEngine, Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! // Compute this week's numbers
//! let engine = AnalyticsEngine::new(config.analytics.clone()).expect("invalid analytics policy");
//! let snapshot = db.load_snapshot(&config.profile.user_id).expect("failed to load tasks");
//! let result = engine.compute(&snapshot, chrono::Utc::now());
//! println!("{} tasks, {}% completed this week",
//!     result.dashboard.total_tasks, result.insights.trend.current_rate);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{AggregateResult, AnalyticsEngine};
pub use config::Config;
pub use db::{Database, TaskFilter};
pub use error::{Error, Result};
pub use locale::Locale;
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod locale;
pub mod logging;
pub mod tidybot;
pub mod types;
