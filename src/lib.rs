//! Cursor Team Analytics - Reporting Core
//!
//! This library provides the aggregation and export engine behind the
//! Cursor team analytics dashboard. It handles:
//! - Validating vendor payloads (members, daily usage, spending)
//! - Team / member allow-list filtering
//! - Per-member and team-wide usage rollups
//! - Cost efficiency and ranking views
//! - Daily trend bucketing
//! - Summary, roster, spending and daily-usage exports (CSV / JSON)

pub mod cache;
pub mod config;
pub mod export;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod trends;

/// Error type for every fallible operation in the crate
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unknown export data type: {0}")]
    UnknownDataType(String),

    #[error("Invalid export format: {0}. Use 'csv' or 'json'")]
    InvalidFormat(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// Serialized as its message so a UI layer can show it directly
impl serde::Serialize for AnalyticsError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Install the fmt subscriber at the given level.
///
/// Unknown level names fall back to INFO. Calling this twice is harmless.
pub fn init_logging(level: &str) {
    let level = level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    if tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init()
        .is_ok()
    {
        tracing::info!("Logging initialized at {}", level);
    }
}
