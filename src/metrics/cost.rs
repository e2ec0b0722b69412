//! Cost efficiency calculations
//!
//! Joins per-member spend with their line totals to get cost-per-line and
//! lines-per-dollar figures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::format::ratio;
use crate::models::{DailyUsageEntry, TeamMemberSpend};

/// Spend joined with output for one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEfficiency {
    pub email: String,
    pub name: String,
    pub spend_cents: u64,
    pub total_lines: u64,
    pub total_requests: u64,
    /// Dollars per line added, 0 with no lines
    pub cost_per_line: f64,
    /// Dollars per AI request, 0 with no requests
    pub cost_per_request: f64,
    /// Lines added per dollar, 0 with no spend
    pub efficiency: f64,
}

impl CostEfficiency {
    pub fn new(spend: &TeamMemberSpend, total_lines: u64, total_requests: u64) -> Self {
        let dollars = spend.spend_dollars();
        Self {
            email: spend.email.clone(),
            name: spend.display_name().to_string(),
            spend_cents: spend.spend_cents,
            total_lines,
            total_requests,
            cost_per_line: ratio(dollars, total_lines as f64),
            cost_per_request: ratio(dollars, total_requests as f64),
            efficiency: ratio(total_lines as f64, dollars),
        }
    }

    pub fn spend_dollars(&self) -> f64 {
        self.spend_cents as f64 / 100.0
    }
}

/// One efficiency row per spend record, in spend order
pub fn cost_efficiency(spending: &[TeamMemberSpend], entries: &[DailyUsageEntry]) -> Vec<CostEfficiency> {
    let mut output: HashMap<&str, (u64, u64)> = HashMap::new();
    for entry in entries {
        if let Some(email) = entry.member_email() {
            let slot = output.entry(email).or_default();
            slot.0 = slot.0.saturating_add(entry.total_lines_added);
            slot.1 = slot.1.saturating_add(entry.total_ai_requests());
        }
    }

    spending
        .iter()
        .map(|spend| {
            let (lines, requests) = output.get(spend.email.as_str()).copied().unwrap_or_default();
            CostEfficiency::new(spend, lines, requests)
        })
        .collect()
}

/// Headline figures for the cost analysis view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_spend_cents: u64,
    /// Mean cost-per-line across members with spend
    pub average_cost_per_line: f64,
    /// Highest lines-per-dollar among members with spend and output
    pub most_efficient: Option<CostEfficiency>,
}

/// Summarize rows, considering only members with spend
pub fn cost_summary(rows: &[CostEfficiency]) -> CostSummary {
    let spenders: Vec<&CostEfficiency> = rows.iter().filter(|r| r.spend_cents > 0).collect();

    let total_spend_cents: u64 = spenders.iter().map(|r| r.spend_cents).sum();
    let average_cost_per_line = ratio(
        spenders.iter().map(|r| r.cost_per_line).sum(),
        spenders.len() as f64,
    );

    // First of equals wins, matching the stable ranking order
    let mut most_efficient: Option<&CostEfficiency> = None;
    for row in spenders.iter().filter(|r| r.total_lines > 0) {
        if most_efficient.map_or(true, |best| row.efficiency > best.efficiency) {
            most_efficient = Some(row);
        }
    }

    CostSummary {
        total_spend_cents,
        average_cost_per_line,
        most_efficient: most_efficient.cloned(),
    }
}
