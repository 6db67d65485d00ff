//! History view types: pagination and estimate-vs-actual comparison.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{Category, HistoryEntry, Task};

/// Default page size for history listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// How the actual duration compared with the estimate, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstimateComparison {
    /// Finished this many minutes under (or exactly on) the estimate
    Faster(u32),
    /// Took this many minutes longer than estimated
    Slower(u32),
}

/// Compare actual with estimated duration. `None` unless both are present
/// and positive; a zero counts as not recorded, as in
/// [`Task::duration_used`].
pub fn compare_estimate(estimated: Option<i64>, actual: Option<i64>) -> Option<EstimateComparison> {
    let (est, act) = (estimated?, actual?);
    if est <= 0 || act <= 0 {
        return None;
    }
    let diff = est.abs_diff(act).min(u32::MAX as u64) as u32;
    Some(if act <= est {
        EstimateComparison::Faster(diff)
    } else {
        EstimateComparison::Slower(diff)
    })
}

/// A history entry joined with its task and category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub entry: HistoryEntry,
    pub task: Task,
    pub category: Category,
}

impl HistoryRecord {
    pub fn comparison(&self) -> Option<EstimateComparison> {
        compare_estimate(self.task.estimated_minutes, self.task.actual_minutes)
    }
}

/// A validated page request (1-based page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(Error::InvalidInput("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(Error::InvalidInput("limit must be at least 1".to_string()));
        }
        Ok(Self { page, limit })
    }

    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub fn paginate(&self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: (total + self.limit as u64 - 1) / self.limit as u64,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    pub pagination: Pagination,
}
