//! Allow-list and date filtering
//!
//! A `MemberFilter` restricts which records take part in an aggregation.
//! An empty filter means "no restriction", not "nobody".

use std::collections::HashSet;

use crate::models::{
    find_team, normalize_email, DailyUsageEntry, DateRange, TeamGroup, TeamMember,
    TeamMemberSpend, TeamSnapshot,
};

/// Set of member emails allowed through an aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    emails: HashSet<String>,
}

impl MemberFilter {
    /// Filter that lets everything through
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Pick the active filter for a dashboard view.
    ///
    /// A selected team with members wins over the manual selection. An
    /// unknown or empty team falls back to the manual selection.
    pub fn resolve(teams: &[TeamGroup], selected_team: Option<&str>, selected_members: &[String]) -> Self {
        if let Some(name) = selected_team {
            match find_team(teams, name) {
                Some(team) if !team.is_empty() => {
                    tracing::debug!("Filtering to team {} ({} members)", name, team.member_emails.len());
                    return Self::new(&team.member_emails);
                }
                Some(_) => {
                    tracing::warn!("Team {} has no members, using manual selection", name);
                }
                None => {
                    tracing::warn!("Team {} not found, using manual selection", name);
                }
            }
        }
        Self::new(selected_members)
    }

    /// True when no restriction applies
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Whether a record with this email participates.
    ///
    /// Unattributed records pass only when the filter is empty.
    pub fn allows(&self, email: Option<&str>) -> bool {
        if self.is_empty() {
            return true;
        }
        match email {
            Some(e) => self.emails.contains(&normalize_email(e)),
            None => false,
        }
    }

    pub fn filter_usage(&self, entries: &[DailyUsageEntry]) -> Vec<DailyUsageEntry> {
        entries
            .iter()
            .filter(|e| self.allows(e.member_email()))
            .cloned()
            .collect()
    }

    pub fn filter_spending(&self, spending: &[TeamMemberSpend]) -> Vec<TeamMemberSpend> {
        spending
            .iter()
            .filter(|s| self.allows(Some(&s.email)))
            .cloned()
            .collect()
    }

    pub fn filter_members(&self, members: &[TeamMember]) -> Vec<TeamMember> {
        members
            .iter()
            .filter(|m| self.allows(Some(&m.email)))
            .cloned()
            .collect()
    }
}

impl TeamSnapshot {
    /// New snapshot restricted to the filter's members
    pub fn filtered(&self, filter: &MemberFilter) -> TeamSnapshot {
        TeamSnapshot {
            members: filter.filter_members(&self.members),
            usage: filter.filter_usage(&self.usage),
            spending: filter.filter_spending(&self.spending),
            subscription_cycle_start: self.subscription_cycle_start,
        }
    }
}

/// Entries whose UTC day falls inside the inclusive range
pub fn filter_by_date_range(entries: &[DailyUsageEntry], range: &DateRange) -> Vec<DailyUsageEntry> {
    entries
        .iter()
        .filter(|e| e.day().map(|d| range.contains(d)).unwrap_or(false))
        .cloned()
        .collect()
}
