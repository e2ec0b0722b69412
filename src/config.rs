//! Configuration
//!
//! Loaded from `<config_dir>/cursor-analytics/config.json`. Every field has a
//! default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::export::get_export_directory;
use crate::models::DateRange;
use crate::AnalyticsError;

/// Staleness windows per data source, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub members_ttl_secs: u64,
    pub usage_ttl_secs: u64,
    pub spending_ttl_secs: u64,
    pub teams_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            members_ttl_secs: 300,
            usage_ttl_secs: 120,
            spending_ttl_secs: 300,
            teams_ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn members_ttl(&self) -> Duration {
        Duration::from_secs(self.members_ttl_secs)
    }

    pub fn usage_ttl(&self) -> Duration {
        Duration::from_secs(self.usage_ttl_secs)
    }

    pub fn spending_ttl(&self) -> Duration {
        Duration::from_secs(self.spending_ttl_secs)
    }

    pub fn teams_ttl(&self) -> Duration {
        Duration::from_secs(self.teams_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Where exports are written; Downloads, Documents or temp when unset
    pub export_dir: Option<PathBuf>,
    pub cache: CacheConfig,
    /// Trailing window used when no date range is given
    pub default_window_days: u32,
    pub log_level: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            cache: CacheConfig::default(),
            default_window_days: 30,
            log_level: "info".to_string(),
        }
    }
}

impl AnalyticsConfig {
    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, AnalyticsError> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| AnalyticsError::Config(format!("Failed to read {:?}: {}", path, e)))?;

        serde_json::from_str(&text)
            .map_err(|e| AnalyticsError::Config(format!("Failed to parse {:?}: {}", path, e)))
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        let path = default_config_path();
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(get_export_directory)
    }

    /// Trailing default window ending on `today`
    pub fn default_range(&self, today: NaiveDate) -> Result<DateRange, AnalyticsError> {
        DateRange::last_n_days(today, self.default_window_days).map_err(|e| {
            AnalyticsError::Config(format!(
                "default_window_days = {}: {}",
                self.default_window_days, e
            ))
        })
    }
}

/// Get the default config path
pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("cursor-analytics").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.default_window_days, 30);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache.usage_ttl(), Duration::from_secs(120));
        assert_eq!(config.cache.members_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyticsConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level": "debug", "cache": {"usage_ttl_secs": 5}}"#).unwrap();

        let config = AnalyticsConfig::load(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.cache.usage_ttl_secs, 5);
        assert_eq!(config.cache.spending_ttl_secs, 300);
        assert_eq!(config.default_window_days, 30);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AnalyticsConfig::load(&path).unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
    }

    #[test]
    fn test_export_dir_override() {
        let config = AnalyticsConfig {
            export_dir: Some(PathBuf::from("/tmp/reports")),
            ..Default::default()
        };
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/reports"));
        assert!(AnalyticsConfig::default().export_dir().to_str().is_some());
    }

    #[test]
    fn test_default_range() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
        let range = AnalyticsConfig::default().default_range(today).unwrap();
        assert_eq!(range.end_date(), today);
        assert_eq!(range.start_date(), NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
    }

    #[test]
    fn test_oversized_window_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"default_window_days": 4000000000}"#).unwrap();

        let config = AnalyticsConfig::load(&path).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
        let err = config.default_range(today).unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("cursor-analytics/config.json"));
    }
}
