//! Daily usage types
//!
//! One entry per (member, day) from the vendor's daily usage endpoint,
//! plus the inclusive date range a report covers.

use chrono::{DateTime, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{normalize_email, VendorRecord};
use crate::AnalyticsError;

/// A member's activity for one calendar day.
///
/// Counters default to 0 when the vendor omits them. An entry without an
/// email is unattributed activity: it counts toward team totals but never
/// toward a per-member breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageEntry {
    /// Epoch milliseconds, truncated to the day
    pub date: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub total_lines_added: u64,
    #[serde(default)]
    pub total_lines_deleted: u64,
    #[serde(default)]
    pub accepted_lines_added: u64,
    #[serde(default)]
    pub accepted_lines_deleted: u64,
    #[serde(default)]
    pub total_applies: u64,
    #[serde(default)]
    pub total_accepts: u64,
    #[serde(default)]
    pub total_rejects: u64,
    #[serde(default)]
    pub total_tabs_shown: u64,
    #[serde(default)]
    pub total_tabs_accepted: u64,
    #[serde(default)]
    pub composer_requests: u64,
    #[serde(default)]
    pub chat_requests: u64,
    #[serde(default)]
    pub agent_requests: u64,
    #[serde(default)]
    pub cmdk_usages: u64,
    #[serde(default)]
    pub subscription_included_reqs: u64,
    #[serde(default)]
    pub api_key_reqs: u64,
    #[serde(default)]
    pub usage_based_reqs: u64,
    #[serde(default)]
    pub bugbot_usages: u64,
    #[serde(default)]
    pub most_used_model: Option<String>,
    #[serde(default)]
    pub apply_most_used_extension: Option<String>,
    #[serde(default)]
    pub tab_most_used_extension: Option<String>,
    #[serde(default)]
    pub client_version: Option<String>,
}

impl DailyUsageEntry {
    /// Create an empty entry for a member on a day
    pub fn new(email: Option<&str>, day: NaiveDate) -> Self {
        Self {
            date: day_to_millis(day),
            email: email.map(normalize_email),
            ..Default::default()
        }
    }

    /// Calendar day (UTC) of this entry
    pub fn day(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.date).map(|dt| dt.date_naive())
    }

    /// Chat + composer + agent requests
    pub fn total_ai_requests(&self) -> u64 {
        self.chat_requests
            .saturating_add(self.composer_requests)
            .saturating_add(self.agent_requests)
    }

    /// Email if the entry is attributed to a member
    pub fn member_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

impl VendorRecord for DailyUsageEntry {
    fn normalized(mut self) -> Self {
        self.email = self
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty());
        self
    }
}

/// Epoch millis at UTC midnight of `day`
pub fn day_to_millis(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// Reporting period requested from the vendor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePeriod {
    pub start_date: i64,
    pub end_date: i64,
}

/// Response body of the daily usage endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageResponse {
    pub data: Vec<DailyUsageEntry>,
    #[serde(default)]
    pub period: UsagePeriod,
}

/// Inclusive calendar range, `start_date <= end_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDateRange")]
pub struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = AnalyticsError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start_date, raw.end_date)
    }
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, AnalyticsError> {
        if start_date > end_date {
            return Err(AnalyticsError::InvalidDateRange {
                start: start_date.to_string(),
                end: end_date.to_string(),
            });
        }
        Ok(Self { start_date, end_date })
    }

    /// `end_date - days ..= end_date`, the dashboard's default window.
    /// Fails when the start would fall outside chrono's date range.
    pub fn last_n_days(end_date: NaiveDate, days: u32) -> Result<Self, AnalyticsError> {
        let start_date = end_date
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                AnalyticsError::MalformedInput(format!(
                    "{} days before {} is out of range",
                    days, end_date
                ))
            })?;
        Ok(Self { start_date, end_date })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Number of calendar days covered; a same-day range is 1
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date
    }

    /// Period in the epoch-millis form the vendor expects
    pub fn to_period(&self) -> UsagePeriod {
        UsagePeriod {
            start_date: day_to_millis(self.start_date),
            end_date: day_to_millis(self.end_date),
        }
    }
}
