//! Spending types
//!
//! Per-member spend for the current subscription cycle

use serde::{Deserialize, Serialize};

use super::{normalize_email, VendorRecord};
use crate::metrics::format::ratio;

/// Limit override applied when the vendor reports none.
///
/// Business constant carried over from the dashboard; there is no derivation
/// for it beyond "the default seat limit is five dollars".
pub const DEFAULT_HARD_LIMIT_OVERRIDE_DOLLARS: f64 = 5.0;

/// Spend record for a single member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberSpend {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Older payloads carry the display name under this key
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub spend_cents: u64,
    #[serde(default)]
    pub fast_premium_requests: u64,
    #[serde(default)]
    pub hard_limit_override_dollars: Option<f64>,
}

impl TeamMemberSpend {
    pub fn new(email: &str, spend_cents: u64) -> Self {
        Self {
            email: normalize_email(email),
            spend_cents,
            ..Default::default()
        }
    }

    /// `name`, then `memberName`, then empty
    pub fn display_name(&self) -> &str {
        [self.name.as_deref(), self.member_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
            .unwrap_or("")
    }

    /// Role as written in exports; absent roles read as "member"
    pub fn role_label(&self) -> &str {
        self.role
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or("member")
    }

    pub fn spend_dollars(&self) -> f64 {
        self.spend_cents as f64 / 100.0
    }

    /// Dollars per fast premium request, 0 when there were none
    pub fn cost_per_request(&self) -> f64 {
        ratio(self.spend_dollars(), self.fast_premium_requests as f64)
    }

    /// Override in dollars; a missing or zero override reads as the default
    pub fn limit_override_dollars(&self) -> f64 {
        match self.hard_limit_override_dollars {
            Some(dollars) if dollars != 0.0 && dollars.is_finite() => dollars,
            _ => DEFAULT_HARD_LIMIT_OVERRIDE_DOLLARS,
        }
    }
}

impl VendorRecord for TeamMemberSpend {
    fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

/// Response body of the spending endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingResponse {
    #[serde(default)]
    pub subscription_cycle_start: Option<i64>,
    #[serde(default)]
    pub total_members: u32,
    #[serde(default)]
    pub total_pages: u32,
    pub team_member_spend: Vec<TeamMemberSpend>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limit_override_defaults() {
        let mut spend = TeamMemberSpend::new("a@x.com", 500);
        assert_eq!(spend.limit_override_dollars(), 5.0);

        spend.hard_limit_override_dollars = Some(0.0);
        assert_eq!(spend.limit_override_dollars(), 5.0);

        spend.hard_limit_override_dollars = Some(50.0);
        assert_eq!(spend.limit_override_dollars(), 50.0);
    }

    #[test]
    fn test_cost_per_request() {
        let mut spend = TeamMemberSpend::new("a@x.com", 1000);
        assert_eq!(spend.cost_per_request(), 0.0);

        spend.fast_premium_requests = 40;
        assert!((spend.cost_per_request() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_display_name_fallback() {
        let spend: TeamMemberSpend = serde_json::from_value(json!({
            "email": "a@x.com",
            "memberName": "Alice"
        }))
        .unwrap();
        assert_eq!(spend.display_name(), "Alice");

        let both: TeamMemberSpend = serde_json::from_value(json!({
            "email": "a@x.com",
            "name": "Al",
            "memberName": "Alice"
        }))
        .unwrap();
        assert_eq!(both.display_name(), "Al");

        assert_eq!(TeamMemberSpend::new("b@x.com", 0).display_name(), "");
    }

    #[test]
    fn test_role_label() {
        let mut spend = TeamMemberSpend::new("a@x.com", 0);
        assert_eq!(spend.role_label(), "member");
        spend.role = Some("owner".to_string());
        assert_eq!(spend.role_label(), "owner");
    }
}
