//! Summary report
//!
//! Single-row team overview for a period. Both projections are built from
//! one `SummaryFigures` value, so the CSV row and the JSON document always
//! carry the same numbers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{iso_timestamp, PreparedReport};
use crate::filter::filter_by_date_range;
use crate::metrics::format::{calculate_percentage, fixed, percentage, ratio};
use crate::metrics::{count_active_roster_members, UsageTotals};
use crate::models::{DateRange, TeamSnapshot};

/// Usage events included in the sampled section of the report
pub const SAMPLED_EVENTS_LIMIT: u64 = 100;

/// Every figure the summary report shows, already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFigures {
    pub report_date: String,
    pub report_time: String,
    pub generated_at: String,
    pub period_start: String,
    pub period_end: String,
    pub period_days: i64,
    pub total_members: u64,
    pub active_members: u64,
    /// One decimal with a `%` suffix
    pub activity_rate: String,
    /// Dollars with two decimals, no currency sign
    pub total_spend: String,
    pub avg_spend_per_member: String,
    pub avg_spend_per_active_member: String,
    pub totals: UsageTotals,
    /// Two decimals, no suffix
    pub ai_adoption_rate: String,
    pub acceptance_rate: String,
    pub tab_acceptance_rate: String,
    pub sampled_events: u64,
}

impl SummaryFigures {
    /// Compute the figures for `range`; usage outside the range is ignored
    pub fn compute(snapshot: &TeamSnapshot, range: &DateRange, now: &DateTime<Local>) -> Self {
        let usage = filter_by_date_range(&snapshot.usage, range);
        let totals = UsageTotals::from_entries(&usage);

        let total_members = snapshot.members.len() as u64;
        let active_members = count_active_roster_members(&usage, &snapshot.members) as u64;
        let total_spend =
            snapshot.spending.iter().map(|s| s.spend_cents).sum::<u64>() as f64 / 100.0;

        Self {
            report_date: now.format("%Y-%m-%d").to_string(),
            report_time: now.format("%H:%M:%S").to_string(),
            generated_at: iso_timestamp(now),
            period_start: range.start_date().format("%Y-%m-%d").to_string(),
            period_end: range.end_date().format("%Y-%m-%d").to_string(),
            period_days: range.days(),
            total_members,
            active_members,
            activity_rate: percentage(active_members as f64, total_members as f64, 1),
            total_spend: fixed(total_spend, 2),
            avg_spend_per_member: fixed(ratio(total_spend, total_members as f64), 2),
            avg_spend_per_active_member: fixed(ratio(total_spend, active_members as f64), 2),
            ai_adoption_rate: fixed(
                calculate_percentage(totals.accepted_lines_added as f64, totals.total_lines_added as f64),
                2,
            ),
            acceptance_rate: fixed(totals.acceptance_rate(), 2),
            tab_acceptance_rate: fixed(totals.tab_acceptance_rate(), 2),
            sampled_events: totals.event_count.min(SAMPLED_EVENTS_LIMIT),
            totals,
        }
    }
}

/// CSV projection of the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCsvRow {
    #[serde(rename = "Report Date")]
    pub report_date: String,
    #[serde(rename = "Report Time")]
    pub report_time: String,
    #[serde(rename = "Period Start")]
    pub period_start: String,
    #[serde(rename = "Period End")]
    pub period_end: String,
    #[serde(rename = "Period Days")]
    pub period_days: i64,
    #[serde(rename = "Total Members")]
    pub total_members: u64,
    #[serde(rename = "Active Members")]
    pub active_members: u64,
    #[serde(rename = "Activity Rate")]
    pub activity_rate: String,
    #[serde(rename = "Total Spend ($)")]
    pub total_spend: String,
    #[serde(rename = "Avg Spend/Member ($)")]
    pub avg_spend_per_member: String,
    #[serde(rename = "Avg Spend/Active Member ($)")]
    pub avg_spend_per_active_member: String,
    #[serde(rename = "Total Lines Added")]
    pub total_lines_added: u64,
    #[serde(rename = "AI Lines Accepted")]
    pub ai_lines_accepted: u64,
    #[serde(rename = "AI Adoption Rate (%)")]
    pub ai_adoption_rate: String,
    #[serde(rename = "Total AI Requests")]
    pub total_ai_requests: u64,
    #[serde(rename = "Composer Requests")]
    pub composer_requests: u64,
    #[serde(rename = "Chat Requests")]
    pub chat_requests: u64,
    #[serde(rename = "Agent Requests")]
    pub agent_requests: u64,
    #[serde(rename = "Total Applies")]
    pub total_applies: u64,
    #[serde(rename = "Total Accepts")]
    pub total_accepts: u64,
    #[serde(rename = "Total Rejects")]
    pub total_rejects: u64,
    #[serde(rename = "Overall Acceptance Rate (%)")]
    pub acceptance_rate: String,
    #[serde(rename = "Total Tabs Shown")]
    pub total_tabs_shown: u64,
    #[serde(rename = "Total Tabs Accepted")]
    pub total_tabs_accepted: u64,
    #[serde(rename = "Tab Acceptance Rate (%)")]
    pub tab_acceptance_rate: String,
    #[serde(rename = "Total Usage Events")]
    pub total_usage_events: u64,
    #[serde(rename = "Sampled Usage Events")]
    pub sampled_usage_events: u64,
}

impl From<&SummaryFigures> for SummaryCsvRow {
    fn from(f: &SummaryFigures) -> Self {
        Self {
            report_date: f.report_date.clone(),
            report_time: f.report_time.clone(),
            period_start: f.period_start.clone(),
            period_end: f.period_end.clone(),
            period_days: f.period_days,
            total_members: f.total_members,
            active_members: f.active_members,
            activity_rate: f.activity_rate.clone(),
            total_spend: f.total_spend.clone(),
            avg_spend_per_member: f.avg_spend_per_member.clone(),
            avg_spend_per_active_member: f.avg_spend_per_active_member.clone(),
            total_lines_added: f.totals.total_lines_added,
            ai_lines_accepted: f.totals.accepted_lines_added,
            ai_adoption_rate: f.ai_adoption_rate.clone(),
            total_ai_requests: f.totals.total_ai_requests(),
            composer_requests: f.totals.composer_requests,
            chat_requests: f.totals.chat_requests,
            agent_requests: f.totals.agent_requests,
            total_applies: f.totals.total_applies,
            total_accepts: f.totals.total_accepts,
            total_rejects: f.totals.total_rejects,
            acceptance_rate: f.acceptance_rate.clone(),
            total_tabs_shown: f.totals.total_tabs_shown,
            total_tabs_accepted: f.totals.total_tabs_accepted,
            tab_acceptance_rate: f.tab_acceptance_rate.clone(),
            total_usage_events: f.totals.event_count,
            sampled_usage_events: f.sampled_events,
        }
    }
}

/// JSON projection of the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReportJson {
    pub report_info: ReportInfo,
    pub team_metrics: TeamMetrics,
    pub financial_metrics: FinancialMetrics,
    pub productivity_metrics: ProductivityMetrics,
    pub acceptance_metrics: AcceptanceMetrics,
    pub usage_events: UsageEventCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
    pub generated_at: String,
    pub report_date: String,
    pub report_time: String,
    pub date_range: ReportPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: String,
    pub end: String,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMetrics {
    pub total_members: u64,
    pub active_members: u64,
    pub activity_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub total_spend: String,
    pub average_spend_per_member: String,
    pub average_spend_per_active_member: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityMetrics {
    pub total_lines_added: u64,
    #[serde(rename = "totalAILinesAccepted")]
    pub total_ai_lines_accepted: u64,
    pub ai_adoption_rate: String,
    pub total_requests: u64,
    pub composer_requests: u64,
    pub chat_requests: u64,
    pub agent_requests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceMetrics {
    pub total_applies: u64,
    pub total_accepts: u64,
    pub total_rejects: u64,
    pub acceptance_rate: String,
    pub total_tabs_shown: u64,
    pub total_tabs_accepted: u64,
    pub tab_acceptance_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEventCounts {
    pub total_events: u64,
    pub sampled_events: u64,
}

impl From<&SummaryFigures> for SummaryReportJson {
    fn from(f: &SummaryFigures) -> Self {
        Self {
            report_info: ReportInfo {
                generated_at: f.generated_at.clone(),
                report_date: f.report_date.clone(),
                report_time: f.report_time.clone(),
                date_range: ReportPeriod {
                    start: f.period_start.clone(),
                    end: f.period_end.clone(),
                    days: f.period_days,
                },
            },
            team_metrics: TeamMetrics {
                total_members: f.total_members,
                active_members: f.active_members,
                activity_rate: f.activity_rate.clone(),
            },
            financial_metrics: FinancialMetrics {
                total_spend: format!("${}", f.total_spend),
                average_spend_per_member: format!("${}", f.avg_spend_per_member),
                average_spend_per_active_member: format!("${}", f.avg_spend_per_active_member),
            },
            productivity_metrics: ProductivityMetrics {
                total_lines_added: f.totals.total_lines_added,
                total_ai_lines_accepted: f.totals.accepted_lines_added,
                ai_adoption_rate: format!("{}%", f.ai_adoption_rate),
                total_requests: f.totals.total_ai_requests(),
                composer_requests: f.totals.composer_requests,
                chat_requests: f.totals.chat_requests,
                agent_requests: f.totals.agent_requests,
            },
            acceptance_metrics: AcceptanceMetrics {
                total_applies: f.totals.total_applies,
                total_accepts: f.totals.total_accepts,
                total_rejects: f.totals.total_rejects,
                acceptance_rate: f.acceptance_rate.clone(),
                total_tabs_shown: f.totals.total_tabs_shown,
                total_tabs_accepted: f.totals.total_tabs_accepted,
                tab_acceptance_rate: f.tab_acceptance_rate.clone(),
            },
            usage_events: UsageEventCounts {
                total_events: f.totals.event_count,
                sampled_events: f.sampled_events,
            },
        }
    }
}

pub type SummaryReport = PreparedReport<SummaryCsvRow, SummaryReportJson>;

/// Assemble the summary report
pub fn prepare_summary_report(
    snapshot: &TeamSnapshot,
    range: &DateRange,
    now: &DateTime<Local>,
) -> SummaryReport {
    let figures = SummaryFigures::compute(snapshot, range, now);
    PreparedReport {
        csv_rows: vec![SummaryCsvRow::from(&figures)],
        json: SummaryReportJson::from(&figures),
    }
}
