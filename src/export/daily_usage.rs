//! Daily-usage report
//!
//! One row per usage entry with every raw counter, per-row acceptance
//! rates and the categorical fields.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{iso_timestamp, PreparedReport};
use crate::metrics::format::percentage;
use crate::models::DailyUsageEntry;

const NOT_AVAILABLE: &str = "N/A";

/// Rate as `"xx.xx%"`, or the bare `"0%"` when nothing was offered
fn row_rate(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        "0%".to_string()
    } else {
        percentage(numerator as f64, denominator as f64, 2)
    }
}

fn or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsageCsvRow {
    #[serde(rename = "Date")]
    pub date: i64,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Active")]
    pub active: String,
    #[serde(rename = "Lines Added")]
    pub lines_added: u64,
    #[serde(rename = "Lines Deleted")]
    pub lines_deleted: u64,
    #[serde(rename = "AI Lines Added")]
    pub ai_lines_added: u64,
    #[serde(rename = "AI Lines Deleted")]
    pub ai_lines_deleted: u64,
    #[serde(rename = "Total Applies")]
    pub total_applies: u64,
    #[serde(rename = "Total Accepts")]
    pub total_accepts: u64,
    #[serde(rename = "Total Rejects")]
    pub total_rejects: u64,
    #[serde(rename = "Acceptance Rate")]
    pub acceptance_rate: String,
    #[serde(rename = "Tabs Shown")]
    pub tabs_shown: u64,
    #[serde(rename = "Tabs Accepted")]
    pub tabs_accepted: u64,
    #[serde(rename = "Tab Acceptance Rate")]
    pub tab_acceptance_rate: String,
    #[serde(rename = "Composer Requests")]
    pub composer_requests: u64,
    #[serde(rename = "Chat Requests")]
    pub chat_requests: u64,
    #[serde(rename = "Agent Requests")]
    pub agent_requests: u64,
    #[serde(rename = "Cmd+K Usage")]
    pub cmdk_usage: u64,
    #[serde(rename = "Subscription Requests")]
    pub subscription_requests: u64,
    #[serde(rename = "API Key Requests")]
    pub api_key_requests: u64,
    #[serde(rename = "Usage-Based Requests")]
    pub usage_based_requests: u64,
    #[serde(rename = "Bugbot Usage")]
    pub bugbot_usage: u64,
    #[serde(rename = "Most Used Model")]
    pub most_used_model: String,
    #[serde(rename = "Apply Extension")]
    pub apply_extension: String,
    #[serde(rename = "Tab Extension")]
    pub tab_extension: String,
    #[serde(rename = "Client Version")]
    pub client_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageJsonRow {
    /// Epoch millis, as the vendor reports it
    pub date: i64,
    pub email: String,
    pub is_active: bool,
    pub total_lines_added: u64,
    pub total_lines_deleted: u64,
    pub accepted_lines_added: u64,
    pub accepted_lines_deleted: u64,
    pub total_applies: u64,
    pub total_accepts: u64,
    pub total_rejects: u64,
    pub acceptance_rate: String,
    pub total_tabs_shown: u64,
    pub total_tabs_accepted: u64,
    pub tab_acceptance_rate: String,
    pub composer_requests: u64,
    pub chat_requests: u64,
    pub agent_requests: u64,
    pub cmdk_usages: u64,
    pub subscription_included_reqs: u64,
    pub api_key_reqs: u64,
    pub usage_based_reqs: u64,
    pub bugbot_usages: u64,
    pub most_used_model: String,
    pub apply_most_used_extension: String,
    pub tab_most_used_extension: String,
    pub client_version: String,
}

impl From<&DailyUsageEntry> for DailyUsageJsonRow {
    fn from(e: &DailyUsageEntry) -> Self {
        Self {
            date: e.date,
            email: e.email.clone().unwrap_or_default(),
            is_active: e.is_active,
            total_lines_added: e.total_lines_added,
            total_lines_deleted: e.total_lines_deleted,
            accepted_lines_added: e.accepted_lines_added,
            accepted_lines_deleted: e.accepted_lines_deleted,
            total_applies: e.total_applies,
            total_accepts: e.total_accepts,
            total_rejects: e.total_rejects,
            acceptance_rate: row_rate(e.total_accepts, e.total_applies),
            total_tabs_shown: e.total_tabs_shown,
            total_tabs_accepted: e.total_tabs_accepted,
            tab_acceptance_rate: row_rate(e.total_tabs_accepted, e.total_tabs_shown),
            composer_requests: e.composer_requests,
            chat_requests: e.chat_requests,
            agent_requests: e.agent_requests,
            cmdk_usages: e.cmdk_usages,
            subscription_included_reqs: e.subscription_included_reqs,
            api_key_reqs: e.api_key_reqs,
            usage_based_reqs: e.usage_based_reqs,
            bugbot_usages: e.bugbot_usages,
            most_used_model: or_na(&e.most_used_model),
            apply_most_used_extension: or_na(&e.apply_most_used_extension),
            tab_most_used_extension: or_na(&e.tab_most_used_extension),
            client_version: or_na(&e.client_version),
        }
    }
}

impl From<&DailyUsageJsonRow> for DailyUsageCsvRow {
    fn from(r: &DailyUsageJsonRow) -> Self {
        Self {
            date: r.date,
            email: r.email.clone(),
            active: r.is_active.to_string(),
            lines_added: r.total_lines_added,
            lines_deleted: r.total_lines_deleted,
            ai_lines_added: r.accepted_lines_added,
            ai_lines_deleted: r.accepted_lines_deleted,
            total_applies: r.total_applies,
            total_accepts: r.total_accepts,
            total_rejects: r.total_rejects,
            acceptance_rate: r.acceptance_rate.clone(),
            tabs_shown: r.total_tabs_shown,
            tabs_accepted: r.total_tabs_accepted,
            tab_acceptance_rate: r.tab_acceptance_rate.clone(),
            composer_requests: r.composer_requests,
            chat_requests: r.chat_requests,
            agent_requests: r.agent_requests,
            cmdk_usage: r.cmdk_usages,
            subscription_requests: r.subscription_included_reqs,
            api_key_requests: r.api_key_reqs,
            usage_based_requests: r.usage_based_reqs,
            bugbot_usage: r.bugbot_usages,
            most_used_model: r.most_used_model.clone(),
            apply_extension: r.apply_most_used_extension.clone(),
            tab_extension: r.tab_most_used_extension.clone(),
            client_version: r.client_version.clone(),
        }
    }
}

/// Earliest and latest entry dates, epoch millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDateSpan {
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsageReportJson {
    pub export_date: String,
    pub date_range: EntryDateSpan,
    pub total_records: usize,
    pub data: Vec<DailyUsageJsonRow>,
}

pub type DailyUsageReport = PreparedReport<DailyUsageCsvRow, DailyUsageReportJson>;

pub fn prepare_daily_usage_report(entries: &[DailyUsageEntry], now: &DateTime<Local>) -> DailyUsageReport {
    let rows: Vec<DailyUsageJsonRow> = entries.iter().map(DailyUsageJsonRow::from).collect();

    PreparedReport {
        csv_rows: rows.iter().map(DailyUsageCsvRow::from).collect(),
        json: DailyUsageReportJson {
            export_date: iso_timestamp(now),
            date_range: EntryDateSpan {
                start_date: entries.iter().map(|e| e.date).min(),
                end_date: entries.iter().map(|e| e.date).max(),
            },
            total_records: rows.len(),
            data: rows,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::Value;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 2, 5, 9, 30, 15).unwrap()
    }

    fn entry(email: Option<&str>, day: u32) -> DailyUsageEntry {
        DailyUsageEntry::new(email, NaiveDate::from_ymd_opt(2026, 1, day).unwrap())
    }

    #[test]
    fn test_row_defaults() {
        let report = prepare_daily_usage_report(&[entry(None, 3)], &now());
        let row = &report.csv_rows[0];

        assert_eq!(row.date, 1_767_225_600_000 + 2 * 86_400_000);
        assert_eq!(row.email, "");
        assert_eq!(row.active, "false");
        assert_eq!(row.acceptance_rate, "0%");
        assert_eq!(row.tab_acceptance_rate, "0%");
        assert_eq!(row.most_used_model, "N/A");
        assert_eq!(row.client_version, "N/A");
    }

    #[test]
    fn test_row_rates() {
        let mut e = entry(Some("a@x.com"), 1);
        e.is_active = true;
        e.total_applies = 3;
        e.total_accepts = 2;
        e.total_tabs_shown = 8;
        e.total_tabs_accepted = 8;
        e.most_used_model = Some("claude-4-sonnet".to_string());

        let report = prepare_daily_usage_report(&[e], &now());
        let row = &report.json.data[0];

        assert!(row.is_active);
        assert_eq!(row.acceptance_rate, "66.67%");
        assert_eq!(row.tab_acceptance_rate, "100.00%");
        assert_eq!(row.most_used_model, "claude-4-sonnet");
        assert_eq!(report.csv_rows[0].active, "true");
    }

    #[test]
    fn test_date_span() {
        let entries = vec![entry(Some("a@x.com"), 5), entry(Some("a@x.com"), 1), entry(None, 3)];
        let report = prepare_daily_usage_report(&entries, &now());

        assert_eq!(report.json.date_range.start_date, Some(1_767_225_600_000));
        assert_eq!(report.json.date_range.end_date, Some(1_767_225_600_000 + 4 * 86_400_000));
        assert_eq!(report.json.total_records, 3);
    }

    #[test]
    fn test_empty_usage() {
        let report = prepare_daily_usage_report(&[], &now());
        assert_eq!(report.render(ExportFormat::Csv).unwrap(), "");

        let json: Value = serde_json::from_str(&report.render(ExportFormat::Json).unwrap()).unwrap();
        assert!(json["dateRange"]["startDate"].is_null());
        assert!(json["dateRange"]["endDate"].is_null());
        assert_eq!(json["totalRecords"], 0);
    }

    #[test]
    fn test_csv_header() {
        let csv = prepare_daily_usage_report(&[entry(Some("a@x.com"), 1)], &now())
            .render(ExportFormat::Csv)
            .unwrap();
        let header = csv.lines().next().unwrap();

        assert!(header.starts_with("Date,Email,Active,Lines Added,Lines Deleted,AI Lines Added"));
        assert!(header.ends_with("Most Used Model,Apply Extension,Tab Extension,Client Version"));
        assert!(header.contains("Cmd+K Usage"));
        assert_eq!(header.split(',').count(), 26);
    }

    #[test]
    fn test_csv_and_json_agree() {
        let mut e = entry(Some("a@x.com"), 2);
        e.total_lines_added = 40;
        e.accepted_lines_added = 12;
        e.total_applies = 4;
        e.total_accepts = 1;
        e.cmdk_usages = 6;
        let report = prepare_daily_usage_report(&[e], &now());

        let csv_text = report.render(ExportFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let parsed: DailyUsageCsvRow = reader.deserialize().next().unwrap().unwrap();

        let json: Value = serde_json::from_str(&report.render(ExportFormat::Json).unwrap()).unwrap();
        let row = &json["data"][0];

        assert_eq!(parsed.date, row["date"].as_i64().unwrap());
        assert!(csv_text.lines().nth(1).unwrap().starts_with("1767312000000,a@x.com,"));
        assert_eq!(parsed.lines_added, row["totalLinesAdded"].as_u64().unwrap());
        assert_eq!(parsed.ai_lines_added, row["acceptedLinesAdded"].as_u64().unwrap());
        assert_eq!(parsed.acceptance_rate, row["acceptanceRate"].as_str().unwrap());
        assert_eq!(parsed.cmdk_usage, row["cmdkUsages"].as_u64().unwrap());
        assert_eq!(parsed.active, row["isActive"].to_string());
    }
}
