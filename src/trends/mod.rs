//! Trend analysis module
//!
//! This module handles calendar-day trend calculations:
//! - Daily bucketing of usage entries for the productivity chart
//! - Trailing 7/30/90 day windows for the member detail view

pub mod daily;

use serde::{Deserialize, Serialize};

use crate::metrics::format::calculate_percentage;
use crate::models::DailyUsageEntry;

pub use daily::{aggregate_by_day, fill_missing_days, filter_by_window};

/// One calendar day's team activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    /// Date in YYYY-MM-DD format
    pub date: String,
    /// Chart label, e.g. "Feb 05"
    pub label: String,
    pub total_lines: u64,
    pub ai_assisted_lines: u64,
    /// Chat + composer + agent requests
    pub requests: u64,
    /// Entries flagged active on this day
    pub active_users: u64,
    pub accepts: u64,
    pub applies: u64,
}

impl DailyTrend {
    /// Create a new empty DailyTrend for a given date
    pub fn new(date: String, label: String) -> Self {
        Self {
            date,
            label,
            total_lines: 0,
            ai_assisted_lines: 0,
            requests: 0,
            active_users: 0,
            accepts: 0,
            applies: 0,
        }
    }

    /// Add an entry's activity to this day
    pub fn add_entry(&mut self, entry: &DailyUsageEntry) {
        self.total_lines = self.total_lines.saturating_add(entry.total_lines_added);
        self.ai_assisted_lines = self.ai_assisted_lines.saturating_add(entry.accepted_lines_added);
        self.requests = self.requests.saturating_add(entry.total_ai_requests());
        self.accepts = self.accepts.saturating_add(entry.total_accepts);
        self.applies = self.applies.saturating_add(entry.total_applies);
        if entry.is_active {
            self.active_users += 1;
        }
    }

    pub fn acceptance_rate(&self) -> f64 {
        calculate_percentage(self.accepts as f64, self.applies as f64)
    }

    pub fn ai_adoption_rate(&self) -> f64 {
        calculate_percentage(self.ai_assisted_lines as f64, self.total_lines as f64)
    }
}

/// Trailing window on the member detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Last30Days
    }
}

impl TimeWindow {
    pub fn days(&self) -> i64 {
        match self {
            TimeWindow::Last7Days => 7,
            TimeWindow::Last30Days => 30,
            TimeWindow::Last90Days => 90,
        }
    }
}

impl From<&str> for TimeWindow {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "7d" => TimeWindow::Last7Days,
            "90d" => TimeWindow::Last90Days,
            _ => TimeWindow::Last30Days,
        }
    }
}
