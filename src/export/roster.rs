//! Team-member and spending reports

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::json_export::whole_number;
use super::{iso_timestamp, PreparedReport};
use crate::metrics::format::fixed;
use crate::models::{TeamMember, TeamMemberSpend};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberCsvRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Role")]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberJsonRow {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembersReportJson {
    pub export_date: String,
    pub total_members: usize,
    pub members: Vec<MemberJsonRow>,
}

pub type TeamMembersReport = PreparedReport<MemberCsvRow, TeamMembersReportJson>;

/// One row per member, roles defaulting to "member"
pub fn prepare_team_members_report(members: &[TeamMember], now: &DateTime<Local>) -> TeamMembersReport {
    let rows: Vec<MemberJsonRow> = members
        .iter()
        .map(|m| MemberJsonRow {
            name: m.name.clone().unwrap_or_default(),
            email: m.email.clone(),
            role: m.role_label().to_string(),
        })
        .collect();

    PreparedReport {
        csv_rows: rows
            .iter()
            .map(|r| MemberCsvRow {
                name: r.name.clone(),
                email: r.email.clone(),
                role: r.role.clone(),
            })
            .collect(),
        json: TeamMembersReportJson {
            export_date: iso_timestamp(now),
            total_members: rows.len(),
            members: rows,
        },
    }
}

/// Formatted view of one spend record shared by both projections
#[derive(Debug, Clone, PartialEq)]
struct SpendFigures {
    name: String,
    email: String,
    role: String,
    spend_dollars: String,
    spend_cents: u64,
    premium_requests: u64,
    cost_per_request: String,
    limit_override: f64,
}

impl From<&TeamMemberSpend> for SpendFigures {
    fn from(s: &TeamMemberSpend) -> Self {
        Self {
            name: s.display_name().to_string(),
            email: s.email.clone(),
            role: s.role_label().to_string(),
            spend_dollars: fixed(s.spend_dollars(), 2),
            spend_cents: s.spend_cents,
            premium_requests: s.fast_premium_requests,
            cost_per_request: fixed(s.cost_per_request(), 4),
            limit_override: s.limit_override_dollars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendCsvRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Spend ($)")]
    pub spend: String,
    #[serde(rename = "Premium Requests")]
    pub premium_requests: u64,
    #[serde(rename = "Cost per Request ($)")]
    pub cost_per_request: String,
    #[serde(rename = "Limit Override ($)", serialize_with = "whole_number")]
    pub limit_override: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendJsonRow {
    pub name: String,
    pub email: String,
    pub role: String,
    pub spend_dollars: String,
    pub spend_cents: u64,
    pub fast_premium_requests: u64,
    #[serde(serialize_with = "whole_number")]
    pub hard_limit_override_dollars: f64,
    pub cost_per_request: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingReportJson {
    pub export_date: String,
    pub subscription_cycle_start: String,
    pub total_members: usize,
    pub total_pages: u32,
    pub spending: Vec<SpendJsonRow>,
}

pub type SpendingReport = PreparedReport<SpendCsvRow, SpendingReportJson>;

/// One row per spend record.
///
/// `cycle_start` is the vendor's subscription cycle start in epoch millis;
/// the export time stands in when it is missing.
pub fn prepare_spending_report(
    spending: &[TeamMemberSpend],
    cycle_start: Option<i64>,
    now: &DateTime<Local>,
) -> SpendingReport {
    let figures: Vec<SpendFigures> = spending.iter().map(SpendFigures::from).collect();

    let subscription_cycle_start = cycle_start
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|at| iso_timestamp(&at))
        .unwrap_or_else(|| iso_timestamp(now));

    PreparedReport {
        csv_rows: figures
            .iter()
            .map(|f| SpendCsvRow {
                name: f.name.clone(),
                email: f.email.clone(),
                role: f.role.clone(),
                spend: f.spend_dollars.clone(),
                premium_requests: f.premium_requests,
                cost_per_request: f.cost_per_request.clone(),
                limit_override: f.limit_override,
            })
            .collect(),
        json: SpendingReportJson {
            export_date: iso_timestamp(now),
            subscription_cycle_start,
            total_members: figures.len(),
            total_pages: 1,
            spending: figures
                .into_iter()
                .map(|f| SpendJsonRow {
                    name: f.name,
                    email: f.email,
                    role: f.role,
                    spend_dollars: f.spend_dollars,
                    spend_cents: f.spend_cents,
                    fast_premium_requests: f.premium_requests,
                    hard_limit_override_dollars: f.limit_override,
                    cost_per_request: f.cost_per_request,
                })
                .collect(),
        },
    }
}
