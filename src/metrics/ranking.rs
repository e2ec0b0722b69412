//! Top-N views
//!
//! Every ranking sorts descending on one metric with a stable sort, so
//! members with equal scores keep their input order. The truncation sizes
//! are the dashboard's display limits.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::cost::CostEfficiency;
use super::member::{feature_usage, MemberFeatureUsage};
use crate::models::{DailyUsageEntry, TeamMember};

/// Top performers / adoption leaders / most efficient
pub const TOP_MEMBERS_LIMIT: usize = 5;
/// Top spenders chart
pub const TOP_SPENDERS_LIMIT: usize = 20;
/// Member directory and adoption heatmap
pub const DIRECTORY_LIMIT: usize = 50;

/// A roster member with the score they were ranked on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMember {
    pub email: String,
    /// Display name, "Unknown" when absent
    pub name: String,
    pub score: f64,
}

/// Stable descending sort on `key`, truncated to `limit`
pub fn top_n_by<T, F>(mut items: Vec<T>, limit: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    items.truncate(limit);
    items
}

fn member_scores<F>(members: &[TeamMember], entries: &[DailyUsageEntry], score: F) -> Vec<RankedMember>
where
    F: Fn(&DailyUsageEntry) -> u64,
{
    members
        .iter()
        .map(|member| RankedMember {
            email: member.email.clone(),
            name: member
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            score: entries
                .iter()
                .filter(|e| e.member_email() == Some(member.email.as_str()))
                .map(&score)
                .sum::<u64>() as f64,
        })
        .collect()
}

/// Roster members ranked by lines added
pub fn top_performers(members: &[TeamMember], entries: &[DailyUsageEntry]) -> Vec<RankedMember> {
    top_n_by(
        member_scores(members, entries, |e| e.total_lines_added),
        TOP_MEMBERS_LIMIT,
        |m| m.score,
    )
}

/// Roster members ranked by AI requests
pub fn ai_adoption_leaders(members: &[TeamMember], entries: &[DailyUsageEntry]) -> Vec<RankedMember> {
    top_n_by(
        member_scores(members, entries, DailyUsageEntry::total_ai_requests),
        TOP_MEMBERS_LIMIT,
        |m| m.score,
    )
}

/// Members active at least once, ranked by lines added
pub fn active_member_directory(members: &[TeamMember], entries: &[DailyUsageEntry]) -> Vec<RankedMember> {
    let active: Vec<TeamMember> = members
        .iter()
        .filter(|m| {
            entries
                .iter()
                .any(|e| e.is_active && e.member_email() == Some(m.email.as_str()))
        })
        .cloned()
        .collect();

    top_n_by(
        member_scores(&active, entries, |e| e.total_lines_added),
        DIRECTORY_LIMIT,
        |m| m.score,
    )
}

/// Highest lines-per-dollar first
pub fn most_efficient(rows: &[CostEfficiency]) -> Vec<CostEfficiency> {
    top_n_by(rows.to_vec(), TOP_MEMBERS_LIMIT, |r| r.efficiency)
}

/// Members with spend, highest spend first
pub fn top_spenders(rows: &[CostEfficiency]) -> Vec<CostEfficiency> {
    let spenders = rows.iter().filter(|r| r.spend_cents > 0).cloned().collect();
    top_n_by(spenders, TOP_SPENDERS_LIMIT, |r| r.spend_dollars())
}

/// Members with at least one AI request, busiest first
pub fn feature_usage_heatmap(entries: &[DailyUsageEntry], members: &[TeamMember]) -> Vec<MemberFeatureUsage> {
    let used = feature_usage(entries, members)
        .into_iter()
        .filter(|m| m.total_requests > 0)
        .collect();
    top_n_by(used, DIRECTORY_LIMIT, |m| m.total_requests as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamMemberSpend;
    use crate::metrics::cost::cost_efficiency;
    use chrono::NaiveDate;

    fn entry(email: &str, lines: u64, requests: u64, active: bool) -> DailyUsageEntry {
        let mut e = DailyUsageEntry::new(Some(email), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        e.total_lines_added = lines;
        e.composer_requests = requests;
        e.is_active = active;
        e
    }

    fn roster(n: usize) -> Vec<TeamMember> {
        (0..n)
            .map(|i| TeamMember::new(&format!("m{}@x.com", i), Some(&format!("Member {}", i)), None))
            .collect()
    }

    #[test]
    fn test_top_n_by_is_stable() {
        let items = vec![("a", 1.0), ("b", 3.0), ("c", 1.0), ("d", 3.0)];
        let ranked = top_n_by(items, 3, |i| i.1);
        assert_eq!(ranked, vec![("b", 3.0), ("d", 3.0), ("a", 1.0)]);
    }

    #[test]
    fn test_top_performers_limit_and_ties() {
        let members = roster(7);
        let entries = vec![entry("m3@x.com", 50, 0, true), entry("m5@x.com", 50, 0, true)];

        let top = top_performers(&members, &entries);
        assert_eq!(top.len(), TOP_MEMBERS_LIMIT);
        assert_eq!(top[0].email, "m3@x.com");
        assert_eq!(top[1].email, "m5@x.com");
        // zero scorers keep roster order
        assert_eq!(top[2].email, "m0@x.com");
        assert_eq!(top[4].email, "m2@x.com");
    }

    #[test]
    fn test_ai_adoption_leaders() {
        let members = roster(3);
        let entries = vec![entry("m2@x.com", 0, 9, false), entry("m1@x.com", 0, 4, false)];
        let leaders = ai_adoption_leaders(&members, &entries);
        assert_eq!(leaders[0].email, "m2@x.com");
        assert_eq!(leaders[0].score, 9.0);
        assert_eq!(leaders[1].email, "m1@x.com");
    }

    #[test]
    fn test_unknown_name() {
        let members = vec![TeamMember::new("anon@x.com", None, None)];
        let top = top_performers(&members, &[]);
        assert_eq!(top[0].name, "Unknown");
    }

    #[test]
    fn test_active_member_directory() {
        let members = roster(3);
        let entries = vec![
            entry("m0@x.com", 10, 0, true),
            entry("m1@x.com", 500, 0, false),
            entry("m2@x.com", 20, 0, true),
        ];
        let directory = active_member_directory(&members, &entries);
        let emails: Vec<&str> = directory.iter().map(|m| m.email.as_str()).collect();
        assert_eq!(emails, vec!["m2@x.com", "m0@x.com"]);
    }

    #[test]
    fn test_spend_rankings() {
        let spending = vec![
            TeamMemberSpend::new("a@x.com", 100),
            TeamMemberSpend::new("b@x.com", 0),
            TeamMemberSpend::new("c@x.com", 300),
        ];
        let entries = vec![entry("a@x.com", 100, 0, true), entry("c@x.com", 30, 0, true)];
        let rows = cost_efficiency(&spending, &entries);

        let spenders = top_spenders(&rows);
        assert_eq!(spenders.len(), 2);
        assert_eq!(spenders[0].email, "c@x.com");

        let efficient = most_efficient(&rows);
        assert_eq!(efficient[0].email, "a@x.com");
        assert_eq!(efficient.len(), 3);
    }

    #[test]
    fn test_feature_usage_heatmap_drops_idle() {
        let members = roster(2);
        let entries = vec![entry("m0@x.com", 10, 0, true), entry("m1@x.com", 0, 3, true)];
        let heatmap = feature_usage_heatmap(&entries, &members);
        assert_eq!(heatmap.len(), 1);
        assert_eq!(heatmap[0].email, "m1@x.com");
        assert_eq!(heatmap[0].composer_usage, 3);
    }
}
