//! Export module for CSV and JSON export functionality
//!
//! Assembles the four report kinds from a team snapshot and hands the
//! rendered artifact to a sink.

pub mod csv_export;
pub mod daily_usage;
pub mod json_export;
pub mod roster;
pub mod summary;

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::filter::{filter_by_date_range, MemberFilter};
use crate::models::{DateRange, TeamGroup, TeamSnapshot};
use crate::AnalyticsError;

pub use csv_export::to_csv_string;
pub use daily_usage::{prepare_daily_usage_report, DailyUsageReport};
pub use json_export::{iso_timestamp, to_json_string};
pub use roster::{prepare_spending_report, prepare_team_members_report, SpendingReport, TeamMembersReport};
pub use summary::{prepare_summary_report, SummaryFigures, SummaryReport};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(AnalyticsError::InvalidFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Json => "application/json;charset=utf-8;",
        }
    }
}

/// The four report kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportDataType {
    SummaryReport,
    TeamMembers,
    Spending,
    DailyUsage,
}

impl std::str::FromStr for ExportDataType {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportDataType::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| AnalyticsError::UnknownDataType(s.to_string()))
    }
}

impl ExportDataType {
    pub const ALL: [ExportDataType; 4] = [
        ExportDataType::SummaryReport,
        ExportDataType::TeamMembers,
        ExportDataType::Spending,
        ExportDataType::DailyUsage,
    ];

    /// Identifier used in requests and filenames
    pub fn slug(&self) -> &'static str {
        match self {
            ExportDataType::SummaryReport => "summary-report",
            ExportDataType::TeamMembers => "team-members",
            ExportDataType::Spending => "spending",
            ExportDataType::DailyUsage => "daily-usage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportDataType::SummaryReport => "Summary Report",
            ExportDataType::TeamMembers => "Team Members",
            ExportDataType::Spending => "Spending Data",
            ExportDataType::DailyUsage => "Daily Usage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExportDataType::SummaryReport => "Team totals, spend and acceptance rates for the period",
            ExportDataType::TeamMembers => "Member names, emails and roles",
            ExportDataType::Spending => "Per-member spend, premium requests and limits",
            ExportDataType::DailyUsage => "Raw per-member daily activity records",
        }
    }
}

/// Options for export operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub data_type: ExportDataType,
    pub date_range: DateRange,
    /// Team whose members scope the export; wins over `selected_members`
    #[serde(default)]
    pub selected_team: Option<String>,
    #[serde(default)]
    pub selected_members: Vec<String>,
}

impl ExportOptions {
    pub fn new(format: ExportFormat, data_type: ExportDataType, date_range: DateRange) -> Self {
        Self {
            format,
            data_type,
            date_range,
            selected_team: None,
            selected_members: Vec::new(),
        }
    }

    /// Build options from the string identifiers a UI sends
    pub fn parse(format: &str, data_type: &str, date_range: DateRange) -> Result<Self, AnalyticsError> {
        Ok(Self::new(format.parse()?, data_type.parse()?, date_range))
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.selected_team = Some(team.to_string());
        self
    }

    pub fn with_members<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_members = emails.into_iter().map(Into::into).collect();
        self
    }
}

/// An assembled report: CSV rows plus the JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedReport<R, J> {
    pub csv_rows: Vec<R>,
    pub json: J,
}

impl<R: Serialize, J: Serialize> PreparedReport<R, J> {
    pub fn render(&self, format: ExportFormat) -> Result<String, AnalyticsError> {
        match format {
            ExportFormat::Csv => to_csv_string(&self.csv_rows),
            ExportFormat::Json => to_json_string(&self.json),
        }
    }
}

/// Any of the four assembled reports
#[derive(Debug, Clone, PartialEq)]
pub enum ReportData {
    Summary(SummaryReport),
    TeamMembers(TeamMembersReport),
    Spending(SpendingReport),
    DailyUsage(DailyUsageReport),
}

impl ReportData {
    pub fn assemble(
        kind: ExportDataType,
        snapshot: &TeamSnapshot,
        range: &DateRange,
        now: &DateTime<Local>,
    ) -> Self {
        match kind {
            ExportDataType::SummaryReport => ReportData::Summary(prepare_summary_report(snapshot, range, now)),
            ExportDataType::TeamMembers => {
                ReportData::TeamMembers(prepare_team_members_report(&snapshot.members, now))
            }
            ExportDataType::Spending => ReportData::Spending(prepare_spending_report(
                &snapshot.spending,
                snapshot.subscription_cycle_start,
                now,
            )),
            ExportDataType::DailyUsage => {
                let usage = filter_by_date_range(&snapshot.usage, range);
                ReportData::DailyUsage(prepare_daily_usage_report(&usage, now))
            }
        }
    }

    /// Number of CSV data rows
    pub fn row_count(&self) -> usize {
        match self {
            ReportData::Summary(r) => r.csv_rows.len(),
            ReportData::TeamMembers(r) => r.csv_rows.len(),
            ReportData::Spending(r) => r.csv_rows.len(),
            ReportData::DailyUsage(r) => r.csv_rows.len(),
        }
    }

    pub fn render(&self, format: ExportFormat) -> Result<String, AnalyticsError> {
        match self {
            ReportData::Summary(r) => r.render(format),
            ReportData::TeamMembers(r) => r.render(format),
            ReportData::Spending(r) => r.render(format),
            ReportData::DailyUsage(r) => r.render(format),
        }
    }
}

/// A rendered export ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
    /// Data rows in the report, header excluded
    pub rows: usize,
}

/// Destination for rendered exports
pub trait ExportSink {
    /// Deliver the artifact and return where it went
    fn deliver(&self, artifact: &ExportArtifact) -> Result<String, AnalyticsError>;
}

/// Writes artifacts as files into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(get_export_directory())
    }
}

impl ExportSink for FileSink {
    fn deliver(&self, artifact: &ExportArtifact) -> Result<String, AnalyticsError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.filename);
        std::fs::write(&path, artifact.content.as_bytes())?;
        Ok(path.to_string_lossy().to_string())
    }
}

/// Get the default export directory (Downloads folder or temp dir)
pub fn get_export_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(std::env::temp_dir)
}

/// Generate a timestamped filename for exports
pub fn generate_export_filename(prefix: &str, extension: &str, at: &DateTime<Local>) -> String {
    let timestamp = at.format("%Y-%m-%d_%H-%M-%S");
    format!("{}_{}.{}", prefix, timestamp, extension)
}

/// Scope the snapshot to the selected team or members, assemble the
/// requested report and render it
pub fn prepare_export(
    snapshot: &TeamSnapshot,
    teams: &[TeamGroup],
    options: &ExportOptions,
    now: &DateTime<Local>,
) -> Result<ExportArtifact, AnalyticsError> {
    let filter = MemberFilter::resolve(teams, options.selected_team.as_deref(), &options.selected_members);
    let scoped = snapshot.filtered(&filter);

    let report = ReportData::assemble(options.data_type, &scoped, &options.date_range, now);
    let content = report.render(options.format)?;

    Ok(ExportArtifact {
        filename: generate_export_filename(options.data_type.slug(), options.format.extension(), now),
        mime_type: options.format.mime_type(),
        content,
        rows: report.row_count(),
    })
}

/// Prepare an export stamped with the current time and deliver it
pub fn export_data(
    snapshot: &TeamSnapshot,
    teams: &[TeamGroup],
    options: &ExportOptions,
    sink: &dyn ExportSink,
) -> Result<String, AnalyticsError> {
    let artifact = prepare_export(snapshot, teams, options, &Local::now())?;
    let location = sink.deliver(&artifact).map_err(|e| {
        tracing::error!("Failed to deliver {}: {}", artifact.filename, e);
        e
    })?;

    tracing::info!(
        "Exported {} ({}, {} rows) to {}",
        options.data_type.label(),
        options.format.extension(),
        artifact.rows,
        location
    );
    Ok(location)
}
