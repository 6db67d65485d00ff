//! Shared terminal rendering helpers.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tidylist_core::TaskStatus;

/// Output format for commands that print records or reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// First 8 characters of an id, enough to address it by prefix.
pub fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

pub fn local_time(ts: DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string()
}

pub fn local_date(ts: DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%Y-%m-%d").to_string()
}

pub fn optional_minutes(minutes: Option<i64>) -> String {
    minutes
        .map(|m| format!("{m}m"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
        TaskStatus::Cancelled => "[-]",
    }
}

/// Horizontal bar scaled so `max` fills `width` cells.
pub fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cells = ((value as f64 / max as f64) * width as f64).round().max(1.0) as usize;
    "█".repeat(cells.min(width))
}

/// `512 B`, `3.5 KB`, `1.2 MB`.
pub fn human_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
