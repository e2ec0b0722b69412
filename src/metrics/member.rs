//! Usage aggregation
//!
//! Folds daily usage entries into team totals and per-member rollups.
//! Inputs are borrowed and never modified; every call returns new values,
//! so aggregating the same slice twice yields identical output.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::format::{calculate_percentage, percentage, ratio};
use crate::filter::MemberFilter;
use crate::models::{normalize_email, DailyUsageEntry, TeamMember};

/// Sum of every usage counter over a set of entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub total_lines_added: u64,
    pub total_lines_deleted: u64,
    pub accepted_lines_added: u64,
    pub accepted_lines_deleted: u64,
    pub total_applies: u64,
    pub total_accepts: u64,
    pub total_rejects: u64,
    pub total_tabs_shown: u64,
    pub total_tabs_accepted: u64,
    pub composer_requests: u64,
    pub chat_requests: u64,
    pub agent_requests: u64,
    pub cmdk_usages: u64,
    pub subscription_included_reqs: u64,
    pub api_key_reqs: u64,
    pub usage_based_reqs: u64,
    pub bugbot_usages: u64,
    /// Number of entries folded in
    pub event_count: u64,
    /// Entries flagged `isActive`
    pub active_entries: u64,
}

impl UsageTotals {
    /// Add one entry's counters to the running totals
    pub fn add_entry(&mut self, entry: &DailyUsageEntry) {
        self.total_lines_added = self.total_lines_added.saturating_add(entry.total_lines_added);
        self.total_lines_deleted = self.total_lines_deleted.saturating_add(entry.total_lines_deleted);
        self.accepted_lines_added = self.accepted_lines_added.saturating_add(entry.accepted_lines_added);
        self.accepted_lines_deleted = self.accepted_lines_deleted.saturating_add(entry.accepted_lines_deleted);
        self.total_applies = self.total_applies.saturating_add(entry.total_applies);
        self.total_accepts = self.total_accepts.saturating_add(entry.total_accepts);
        self.total_rejects = self.total_rejects.saturating_add(entry.total_rejects);
        self.total_tabs_shown = self.total_tabs_shown.saturating_add(entry.total_tabs_shown);
        self.total_tabs_accepted = self.total_tabs_accepted.saturating_add(entry.total_tabs_accepted);
        self.composer_requests = self.composer_requests.saturating_add(entry.composer_requests);
        self.chat_requests = self.chat_requests.saturating_add(entry.chat_requests);
        self.agent_requests = self.agent_requests.saturating_add(entry.agent_requests);
        self.cmdk_usages = self.cmdk_usages.saturating_add(entry.cmdk_usages);
        self.subscription_included_reqs = self.subscription_included_reqs.saturating_add(entry.subscription_included_reqs);
        self.api_key_reqs = self.api_key_reqs.saturating_add(entry.api_key_reqs);
        self.usage_based_reqs = self.usage_based_reqs.saturating_add(entry.usage_based_reqs);
        self.bugbot_usages = self.bugbot_usages.saturating_add(entry.bugbot_usages);
        self.event_count += 1;
        if entry.is_active {
            self.active_entries += 1;
        }
    }

    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a DailyUsageEntry>,
    {
        let mut totals = Self::default();
        for entry in entries {
            totals.add_entry(entry);
        }
        totals
    }

    /// Chat + composer + agent requests
    pub fn total_ai_requests(&self) -> u64 {
        self.chat_requests
            .saturating_add(self.composer_requests)
            .saturating_add(self.agent_requests)
    }

    /// Accepts per apply, as a percentage
    pub fn acceptance_rate(&self) -> f64 {
        calculate_percentage(self.total_accepts as f64, self.total_applies as f64)
    }

    /// Tabs accepted per tab shown, as a percentage
    pub fn tab_acceptance_rate(&self) -> f64 {
        calculate_percentage(self.total_tabs_accepted as f64, self.total_tabs_shown as f64)
    }

    /// AI-accepted lines per line added, as a percentage.
    ///
    /// Upstream data is passed through, so this can exceed 100.
    pub fn ai_adoption_rate(&self) -> f64 {
        calculate_percentage(self.accepted_lines_added as f64, self.total_lines_added as f64)
    }
}

/// Team-wide totals over the entries the filter allows.
///
/// Unattributed entries count here whenever the filter is empty.
pub fn team_totals(entries: &[DailyUsageEntry], filter: &MemberFilter) -> UsageTotals {
    UsageTotals::from_entries(entries.iter().filter(|e| filter.allows(e.member_email())))
}

fn active_emails(entries: &[DailyUsageEntry]) -> HashSet<&str> {
    entries
        .iter()
        .filter(|e| e.is_active)
        .filter_map(|e| e.member_email())
        .collect()
}

/// Number of distinct members active on at least one entry
pub fn count_active_members(entries: &[DailyUsageEntry]) -> usize {
    active_emails(entries).len()
}

/// Like `count_active_members`, but only emails on `roster` count
pub fn count_active_roster_members(entries: &[DailyUsageEntry], roster: &[TeamMember]) -> usize {
    let on_roster: HashSet<String> = roster.iter().map(|m| normalize_email(&m.email)).collect();
    active_emails(entries)
        .into_iter()
        .filter(|email| on_roster.contains(*email))
        .count()
}

/// Occurrence counter that remembers first-seen order.
///
/// `mode` breaks ties in favour of the value seen first, so the result does
/// not depend on hash ordering.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence; empty values are ignored
    pub fn record(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        match self.index.get(value) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(value.to_string(), self.counts.len());
                self.counts.push((value.to_string(), 1));
            }
        }
    }

    /// Most frequent value
    pub fn mode(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for candidate in &self.counts {
            match best {
                Some((_, count)) if candidate.1 <= *count => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|(value, _)| value.as_str())
    }
}

/// Rollup of one member's usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStats {
    pub email: String,
    pub name: Option<String>,
    pub totals: UsageTotals,
    /// Lines added
    pub total_lines: u64,
    /// AI-accepted lines added
    pub ai_assisted_lines: u64,
    pub total_ai_requests: u64,
    /// Entries flagged active
    pub active_days: u64,
    pub acceptance_rate: f64,
    pub tab_acceptance_rate: f64,
    pub ai_adoption_rate: f64,
    /// Lines per active day
    pub daily_avg_lines: f64,
    pub most_used_model: Option<String>,
}

impl MemberStats {
    /// Build the rollup from this member's entries
    pub fn from_entries<'a, I>(email: &str, name: Option<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = &'a DailyUsageEntry>,
    {
        let mut totals = UsageTotals::default();
        let mut models = FrequencyCounter::new();
        for entry in entries {
            totals.add_entry(entry);
            if let Some(model) = entry.most_used_model.as_deref() {
                models.record(model);
            }
        }

        Self {
            email: normalize_email(email),
            name,
            total_lines: totals.total_lines_added,
            ai_assisted_lines: totals.accepted_lines_added,
            total_ai_requests: totals.total_ai_requests(),
            active_days: totals.active_entries,
            acceptance_rate: totals.acceptance_rate(),
            tab_acceptance_rate: totals.tab_acceptance_rate(),
            ai_adoption_rate: totals.ai_adoption_rate(),
            daily_avg_lines: ratio(totals.total_lines_added as f64, totals.active_entries as f64),
            most_used_model: models.mode().map(str::to_string),
            totals,
        }
    }

    pub fn ai_adoption_rate_label(&self) -> String {
        percentage(self.ai_assisted_lines as f64, self.total_lines as f64, 1)
    }

    pub fn acceptance_rate_label(&self) -> String {
        percentage(self.totals.total_accepts as f64, self.totals.total_applies as f64, 1)
    }

    pub fn tab_acceptance_rate_label(&self) -> String {
        percentage(
            self.totals.total_tabs_accepted as f64,
            self.totals.total_tabs_shown as f64,
            1,
        )
    }

    /// Active entries out of all entries, e.g. `"80.0%"`
    pub fn activity_rate_label(&self) -> String {
        percentage(self.active_days as f64, self.totals.event_count as f64, 1)
    }

    pub fn most_used_model_label(&self) -> &str {
        self.most_used_model.as_deref().unwrap_or("N/A")
    }
}

/// Rollup for a single member; all zeros when they have no entries
pub fn member_stats(email: &str, entries: &[DailyUsageEntry]) -> MemberStats {
    let key = normalize_email(email);
    MemberStats::from_entries(
        &key,
        None,
        entries.iter().filter(|e| e.member_email() == Some(key.as_str())),
    )
}

fn group_by_email(entries: &[DailyUsageEntry]) -> (Vec<&str>, HashMap<&str, Vec<&DailyUsageEntry>>) {
    let mut order = Vec::new();
    let mut groups: HashMap<&str, Vec<&DailyUsageEntry>> = HashMap::new();
    for entry in entries {
        if let Some(email) = entry.member_email() {
            groups
                .entry(email)
                .or_insert_with(|| {
                    order.push(email);
                    Vec::new()
                })
                .push(entry);
        }
    }
    (order, groups)
}

/// One rollup per roster member, in roster order, names attached
pub fn roster_stats(members: &[TeamMember], entries: &[DailyUsageEntry]) -> Vec<MemberStats> {
    let (_, groups) = group_by_email(entries);
    members
        .iter()
        .map(|member| {
            let own = groups.get(member.email.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            MemberStats::from_entries(&member.email, member.name.clone(), own.iter().copied())
        })
        .collect()
}

/// Rollups for every attributed email the filter allows, first-seen order.
///
/// Unattributed entries are skipped: they have no member to roll up to.
pub fn aggregate_by_member(entries: &[DailyUsageEntry], filter: &MemberFilter) -> Vec<MemberStats> {
    let (order, groups) = group_by_email(entries);
    let stats: Vec<MemberStats> = order
        .into_iter()
        .filter(|email| filter.allows(Some(*email)))
        .map(|email| {
            let own = &groups[email];
            let name = own.iter().find_map(|e| e.name.clone());
            MemberStats::from_entries(email, name, own.iter().copied())
        })
        .collect();

    tracing::debug!("Aggregated {} entries into {} member rollups", entries.len(), stats.len());
    stats
}

/// Team baselines a member is compared against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamAverages {
    pub lines_per_member: f64,
    pub acceptance_rate: f64,
    pub requests_per_member: f64,
}

/// Averages over the distinct attributed emails in `entries`
pub fn team_averages(entries: &[DailyUsageEntry]) -> TeamAverages {
    let members = entries
        .iter()
        .filter_map(|e| e.member_email())
        .collect::<HashSet<_>>()
        .len() as f64;
    let totals = UsageTotals::from_entries(entries);

    TeamAverages {
        lines_per_member: ratio(totals.total_lines_added as f64, members),
        acceptance_rate: totals.acceptance_rate(),
        requests_per_member: ratio(totals.total_ai_requests() as f64, members),
    }
}

/// Where a member sits relative to the team average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    Above,
    Below,
}

impl Standing {
    fn of(value: f64, baseline: f64) -> Self {
        if value > baseline {
            Standing::Above
        } else {
            Standing::Below
        }
    }
}

/// Member-vs-team comparison shown on the member detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceComparison {
    pub productivity: Standing,
    pub ai_usage: Standing,
    pub efficiency: Standing,
}

pub fn compare_to_team(stats: &MemberStats, team: &TeamAverages) -> PerformanceComparison {
    PerformanceComparison {
        productivity: Standing::of(stats.total_lines as f64, team.lines_per_member),
        ai_usage: Standing::of(stats.total_ai_requests as f64, team.requests_per_member),
        efficiency: Standing::of(stats.acceptance_rate, team.acceptance_rate),
    }
}

/// Per-member feature mix for the adoption heatmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFeatureUsage {
    pub email: String,
    pub name: String,
    pub chat_usage: u64,
    pub composer_usage: u64,
    pub agent_usage: u64,
    pub tab_usage: u64,
    pub acceptance_rate: f64,
    pub total_requests: u64,
    pub most_used_model: String,
}

/// Feature usage for every attributed member, first-seen order.
///
/// Names come from the roster; emails not on it read as "Unknown".
pub fn feature_usage(entries: &[DailyUsageEntry], members: &[TeamMember]) -> Vec<MemberFeatureUsage> {
    let names: HashMap<&str, &str> = members
        .iter()
        .filter_map(|m| m.name.as_deref().map(|n| (m.email.as_str(), n)))
        .collect();

    aggregate_by_member(entries, &MemberFilter::all())
        .into_iter()
        .map(|stats| MemberFeatureUsage {
            name: names
                .get(stats.email.as_str())
                .filter(|n| !n.is_empty())
                .map(|n| n.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            chat_usage: stats.totals.chat_requests,
            composer_usage: stats.totals.composer_requests,
            agent_usage: stats.totals.agent_requests,
            tab_usage: stats.totals.total_tabs_accepted,
            acceptance_rate: stats.acceptance_rate,
            total_requests: stats.total_ai_requests,
            most_used_model: stats.most_used_model_label().to_string(),
            email: stats.email,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn usage(email: Option<&str>, d: u32, lines: u64, accepted: u64) -> DailyUsageEntry {
        let mut entry = DailyUsageEntry::new(email, day(d));
        entry.total_lines_added = lines;
        entry.accepted_lines_added = accepted;
        entry
    }

    fn with_model(mut entry: DailyUsageEntry, model: &str) -> DailyUsageEntry {
        entry.most_used_model = Some(model.to_string());
        entry
    }

    #[test]
    fn test_member_scenario() {
        let entries = vec![
            usage(Some("a@x.com"), 1, 10, 5),
            usage(Some("a@x.com"), 2, 20, 5),
            usage(Some("a@x.com"), 3, 0, 0),
        ];

        let a = member_stats("a@x.com", &entries);
        assert_eq!(a.total_lines, 30);
        assert_eq!(a.ai_assisted_lines, 10);
        assert_eq!(a.ai_adoption_rate_label(), "33.3%");

        let b = member_stats("b@x.com", &entries);
        assert_eq!(b.total_lines, 0);
        assert_eq!(b.ai_assisted_lines, 0);
        assert_eq!(b.totals, UsageTotals::default());
        assert_eq!(b.ai_adoption_rate_label(), "0.0%");
        assert_eq!(b.most_used_model_label(), "N/A");
    }

    #[test]
    fn test_member_stats_email_case_insensitive() {
        let entries = vec![usage(Some("a@x.com"), 1, 10, 5)];
        assert_eq!(member_stats("A@X.COM", &entries).total_lines, 10);
    }

    #[test]
    fn test_adoption_rate_can_exceed_hundred() {
        let entries = vec![usage(Some("a@x.com"), 1, 10, 25)];
        let stats = member_stats("a@x.com", &entries);
        assert!((stats.ai_adoption_rate - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_team_totals_include_unattributed() {
        let entries = vec![
            usage(Some("a@x.com"), 1, 10, 5),
            usage(None, 1, 7, 1),
        ];
        let totals = team_totals(&entries, &MemberFilter::all());
        assert_eq!(totals.total_lines_added, 17);
        assert_eq!(totals.event_count, 2);

        let per_member = aggregate_by_member(&entries, &MemberFilter::all());
        assert_eq!(per_member.len(), 1);
        assert_eq!(per_member[0].email, "a@x.com");
    }

    #[test]
    fn test_empty_filter_matches_no_filter() {
        let entries = vec![
            usage(Some("a@x.com"), 1, 10, 5),
            usage(Some("b@x.com"), 1, 3, 1),
            usage(None, 2, 4, 0),
        ];
        let unfiltered = UsageTotals::from_entries(&entries);
        assert_eq!(team_totals(&entries, &MemberFilter::new(Vec::<String>::new())), unfiltered);

        let restricted = team_totals(&entries, &MemberFilter::new(["b@x.com"]));
        assert_eq!(restricted.total_lines_added, 3);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let entries = vec![
            with_model(usage(Some("a@x.com"), 1, 10, 5), "gpt-5"),
            with_model(usage(Some("b@x.com"), 1, 3, 1), "claude-4-sonnet"),
        ];
        let before = entries.clone();
        let first = aggregate_by_member(&entries, &MemberFilter::all());
        let second = aggregate_by_member(&entries, &MemberFilter::all());
        assert_eq!(first, second);
        assert_eq!(entries, before);
    }

    #[test]
    fn test_most_used_model_first_seen_tie_break() {
        let entries = vec![
            with_model(usage(Some("a@x.com"), 1, 1, 0), "sonnet"),
            with_model(usage(Some("a@x.com"), 2, 1, 0), "gpt-5"),
            with_model(usage(Some("a@x.com"), 3, 1, 0), "gpt-5"),
            with_model(usage(Some("a@x.com"), 4, 1, 0), "sonnet"),
            with_model(usage(Some("a@x.com"), 5, 1, 0), ""),
        ];
        let stats = member_stats("a@x.com", &entries);
        assert_eq!(stats.most_used_model.as_deref(), Some("sonnet"));
    }

    #[test]
    fn test_frequency_counter_mode() {
        let mut counter = FrequencyCounter::new();
        assert!(counter.mode().is_none());
        counter.record("a");
        counter.record("b");
        counter.record("b");
        counter.record("");
        assert_eq!(counter.mode(), Some("b"));
    }

    #[test]
    fn test_count_active_members_is_distinct() {
        let mut a1 = usage(Some("a@x.com"), 1, 0, 0);
        a1.is_active = true;
        let mut a2 = usage(Some("a@x.com"), 2, 0, 0);
        a2.is_active = true;
        let b = usage(Some("b@x.com"), 1, 0, 0);
        let mut anon = usage(None, 1, 0, 0);
        anon.is_active = true;

        assert_eq!(count_active_members(&[a1, a2, b, anon]), 1);
    }

    #[test]
    fn test_count_active_roster_members_ignores_off_roster() {
        let mut a = usage(Some("a@x.com"), 1, 0, 0);
        a.is_active = true;
        let mut stranger = usage(Some("z@x.com"), 1, 0, 0);
        stranger.is_active = true;
        let entries = [a, stranger];

        let roster = [TeamMember::new("A@x.com", None, None)];
        assert_eq!(count_active_members(&entries), 2);
        assert_eq!(count_active_roster_members(&entries, &roster), 1);
        assert_eq!(count_active_roster_members(&entries, &[]), 0);
    }

    #[test]
    fn test_totals_saturate_on_huge_counters() {
        let mut big = usage(Some("a@x.com"), 1, u64::MAX, u64::MAX);
        big.chat_requests = u64::MAX;
        big.composer_requests = 1;
        let small = usage(Some("a@x.com"), 2, 5, 1);

        let totals = UsageTotals::from_entries(&[big.clone(), small]);
        assert_eq!(totals.total_lines_added, u64::MAX);
        assert_eq!(totals.accepted_lines_added, u64::MAX);
        assert_eq!(totals.total_ai_requests(), u64::MAX);
        assert_eq!(big.total_ai_requests(), u64::MAX);
        assert_eq!(totals.event_count, 2);
    }

    #[test]
    fn test_roster_stats_keeps_roster_order_and_names() {
        let members = vec![
            TeamMember::new("b@x.com", Some("Bee"), None),
            TeamMember::new("a@x.com", Some("Ay"), None),
        ];
        let entries = vec![usage(Some("a@x.com"), 1, 10, 5)];
        let stats = roster_stats(&members, &entries);
        assert_eq!(stats[0].name.as_deref(), Some("Bee"));
        assert_eq!(stats[0].total_lines, 0);
        assert_eq!(stats[1].total_lines, 10);
    }

    #[test]
    fn test_rates_and_daily_average() {
        let mut e1 = usage(Some("a@x.com"), 1, 40, 10);
        e1.is_active = true;
        e1.total_applies = 4;
        e1.total_accepts = 3;
        e1.total_tabs_shown = 10;
        e1.total_tabs_accepted = 5;
        let e2 = usage(Some("a@x.com"), 2, 0, 0);

        let stats = member_stats("a@x.com", &[e1, e2]);
        assert!((stats.acceptance_rate - 75.0).abs() < 1e-9);
        assert!((stats.tab_acceptance_rate - 50.0).abs() < 1e-9);
        assert!((stats.daily_avg_lines - 40.0).abs() < 1e-9);
        assert_eq!(stats.activity_rate_label(), "50.0%");
        assert_eq!(stats.acceptance_rate_label(), "75.0%");
        assert_eq!(stats.tab_acceptance_rate_label(), "50.0%");
    }

    #[test]
    fn test_compare_to_team() {
        let mut a = usage(Some("a@x.com"), 1, 100, 0);
        a.chat_requests = 10;
        a.total_applies = 10;
        a.total_accepts = 9;
        let mut b = usage(Some("b@x.com"), 1, 20, 0);
        b.chat_requests = 2;
        b.total_applies = 10;
        b.total_accepts = 1;
        let entries = vec![a, b];

        let team = team_averages(&entries);
        assert!((team.lines_per_member - 60.0).abs() < 1e-9);
        assert!((team.requests_per_member - 6.0).abs() < 1e-9);
        assert!((team.acceptance_rate - 50.0).abs() < 1e-9);

        let a_cmp = compare_to_team(&member_stats("a@x.com", &entries), &team);
        assert_eq!(a_cmp.productivity, Standing::Above);
        assert_eq!(a_cmp.ai_usage, Standing::Above);
        assert_eq!(a_cmp.efficiency, Standing::Above);

        let b_cmp = compare_to_team(&member_stats("b@x.com", &entries), &team);
        assert_eq!(b_cmp.productivity, Standing::Below);
        assert_eq!(b_cmp.efficiency, Standing::Below);
    }

    #[test]
    fn test_team_averages_empty() {
        assert_eq!(team_averages(&[]), TeamAverages::default());
    }

    #[test]
    fn test_feature_usage_names() {
        let members = vec![TeamMember::new("a@x.com", Some("Ay"), None)];
        let mut a = usage(Some("a@x.com"), 1, 0, 0);
        a.chat_requests = 3;
        a.total_tabs_accepted = 4;
        let mut stranger = usage(Some("z@x.com"), 1, 0, 0);
        stranger.agent_requests = 1;

        let rows = feature_usage(&[a, stranger], &members);
        assert_eq!(rows[0].name, "Ay");
        assert_eq!(rows[0].tab_usage, 4);
        assert_eq!(rows[0].most_used_model, "N/A");
        assert_eq!(rows[1].name, "Unknown");
        assert_eq!(rows[1].total_requests, 1);
    }
}
