//! JSON export functionality
//!
//! Pretty-printed output with two-space indentation. Fields appear in the
//! order the report struct declares them.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::AnalyticsError;

/// Serialize a report document to pretty JSON
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, AnalyticsError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AnalyticsError::Serialization(format!("Failed to serialize JSON: {}", e)))
}

/// UTC timestamp with millisecond precision and a `Z` suffix
pub fn iso_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write whole numbers without a fractional part (`5` instead of `5.0`)
pub fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
