//! Query filter and aggregate statistics over the buffer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::entry::{LogCategory, LogEntry, LogLevel};

/// Filter for querying buffered entries
///
/// All fields optional; present fields are AND-combined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFilter {
    pub level: Option<LogLevel>,
    pub category: Option<LogCategory>,
    pub request_id: Option<String>,
    pub user_id: Option<String>,
    pub loft_id: Option<String>,
    pub reservation_id: Option<String>,
    /// Case-insensitive substring match against message or serialized data
    pub search_term: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_category(mut self, category: LogCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// Whether an entry satisfies every present criterion
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.level.is_some_and(|lvl| entry.level != lvl) {
            return false;
        }
        if self.category.is_some_and(|cat| entry.category != cat) {
            return false;
        }

        let ctx = entry.context.as_ref();
        if let Some(request_id) = &self.request_id {
            if ctx.and_then(|c| c.request_id.as_ref()) != Some(request_id) {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if ctx.and_then(|c| c.user_id.as_ref()) != Some(user_id) {
                return false;
            }
        }
        if let Some(loft_id) = &self.loft_id {
            if ctx.and_then(|c| c.loft_id.as_ref()) != Some(loft_id) {
                return false;
            }
        }
        if let Some(reservation_id) = &self.reservation_id {
            if ctx.and_then(|c| c.reservation_id.as_ref()) != Some(reservation_id) {
                return false;
            }
        }

        if let Some(term) = &self.search_term {
            let needle = term.to_lowercase();
            let in_message = entry.message.to_lowercase().contains(&needle);
            let in_data = entry
                .data
                .as_ref()
                .and_then(|d| serde_json::to_string(d).ok())
                .is_some_and(|s| s.to_lowercase().contains(&needle));
            if !in_message && !in_data {
                return false;
            }
        }

        if self.start_time.is_some_and(|start| entry.timestamp < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| entry.timestamp > end) {
            return false;
        }

        true
    }
}

/// Aggregate statistics over the currently buffered entries
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total: usize,
    /// Per-level counts; every level present, absent ones at 0
    pub by_level: HashMap<LogLevel, usize>,
    /// Per-category counts; every category present, absent ones at 0
    pub by_category: HashMap<LogCategory, usize>,
    /// Error/Critical entries within the trailing window
    pub recent_errors: usize,
}

impl LogStats {
    /// Empty statistics with all enum keys pre-initialized
    pub fn empty() -> Self {
        Self {
            total: 0,
            by_level: LogLevel::ALL.iter().map(|lvl| (*lvl, 0)).collect(),
            by_category: LogCategory::ALL.iter().map(|cat| (*cat, 0)).collect(),
            recent_errors: 0,
        }
    }
}
