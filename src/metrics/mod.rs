//! Metrics calculation module
//!
//! This module handles all metric calculations:
//! - Formatting and safe-division primitives
//! - Team totals and per-member rollups
//! - Cost efficiency (cost per line, lines per dollar)
//! - Ranked top-N views

pub mod cost;
pub mod format;
pub mod member;
pub mod ranking;

pub use cost::{cost_efficiency, cost_summary, CostEfficiency, CostSummary};
pub use format::{calculate_percentage, count, count_in, currency, currency_in, percentage, ratio};
pub use member::{
    aggregate_by_member, compare_to_team, count_active_members, count_active_roster_members,
    member_stats, roster_stats,
    team_averages, team_totals, MemberStats, PerformanceComparison, Standing, TeamAverages,
    UsageTotals,
};
