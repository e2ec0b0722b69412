//! Daily trend calculations
//!
//! Buckets usage entries by calendar day for trend charts.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};

use super::{DailyTrend, TimeWindow};
use crate::models::{DailyUsageEntry, DateRange};

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn day_label(day: NaiveDate) -> String {
    day.format("%b %d").to_string()
}

/// Aggregate usage by day.
///
/// Entries that land on the same day are summed, never dropped. Output is
/// sorted by date.
pub fn aggregate_by_day(entries: &[DailyUsageEntry]) -> Vec<DailyTrend> {
    let mut daily_map: BTreeMap<NaiveDate, DailyTrend> = BTreeMap::new();

    for entry in entries {
        if let Some(day) = entry.day() {
            daily_map
                .entry(day)
                .or_insert_with(|| DailyTrend::new(day_key(day), day_label(day)))
                .add_entry(entry);
        }
    }

    daily_map.into_values().collect()
}

/// Fill in missing days of `range` with zero values
pub fn fill_missing_days(trends: &mut Vec<DailyTrend>, range: &DateRange) {
    let existing: HashSet<String> = trends.iter().map(|t| t.date.clone()).collect();

    let mut current = range.start_date();
    while current <= range.end_date() {
        let key = day_key(current);
        if !existing.contains(&key) {
            trends.push(DailyTrend::new(key, day_label(current)));
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    trends.sort_by(|a, b| a.date.cmp(&b.date));
}

/// Entries dated within the trailing window ending at `now`
pub fn filter_by_window(
    entries: &[DailyUsageEntry],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<DailyUsageEntry> {
    let cutoff = (now - ChronoDuration::days(window.days())).timestamp_millis();
    entries.iter().filter(|e| e.date >= cutoff).cloned().collect()
}
