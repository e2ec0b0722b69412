//! Data models module
//!
//! Contains the read-only snapshots fetched per dashboard session:
//! - Team members and roles
//! - Daily usage entries and date ranges
//! - Spending records
//! - Locally managed team groups
//!
//! Vendor payloads are validated here, at the boundary, so the rest of the
//! crate can work with concrete types.

pub mod member;
pub mod spend;
pub mod team;
pub mod usage;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AnalyticsError;

pub use member::{Role, TeamMember, TeamMembersResponse};
pub use spend::{SpendingResponse, TeamMemberSpend, DEFAULT_HARD_LIMIT_OVERRIDE_DOLLARS};
pub use team::{find_team, TeamGroup};
pub use usage::{DailyUsageEntry, DailyUsageResponse, DateRange, UsagePeriod};

/// Lower-case and trim an email so it can be used as a join key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A record received from the vendor API or the team store
pub trait VendorRecord: DeserializeOwned {
    /// Bring join keys into canonical form
    fn normalized(self) -> Self;
}

/// Parse a JSON array into typed records.
///
/// Fails fast when the value is not an array or when any element does not
/// match the record type; emails are normalized on the way in.
pub fn parse_records<T: VendorRecord>(value: &Value, what: &str) -> Result<Vec<T>, AnalyticsError> {
    let items = value.as_array().ok_or_else(|| {
        AnalyticsError::MalformedInput(format!(
            "expected an array of {}, found {}",
            what,
            json_kind(value)
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item)
                .map(VendorRecord::normalized)
                .map_err(|e| {
                    AnalyticsError::MalformedInput(format!("{} record {}: {}", what, index, e))
                })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Everything one dashboard session works with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    pub members: Vec<TeamMember>,
    pub usage: Vec<DailyUsageEntry>,
    pub spending: Vec<TeamMemberSpend>,
    /// Start of the current billing cycle (epoch millis), when known
    #[serde(default)]
    pub subscription_cycle_start: Option<i64>,
}

impl TeamSnapshot {
    /// Build a snapshot from already-parsed vendor responses
    pub fn from_responses(
        members: TeamMembersResponse,
        usage: DailyUsageResponse,
        spending: SpendingResponse,
    ) -> Self {
        Self {
            members: members
                .team_members
                .into_iter()
                .map(VendorRecord::normalized)
                .collect(),
            usage: usage.data.into_iter().map(VendorRecord::normalized).collect(),
            subscription_cycle_start: spending.subscription_cycle_start,
            spending: spending
                .team_member_spend
                .into_iter()
                .map(VendorRecord::normalized)
                .collect(),
        }
    }
}
