//! Data providers
//!
//! The reporting core reads members, usage, spend and team definitions
//! through these traits. `SnapshotProvider` serves vendor payloads that
//! were already fetched; `CachedProviders` puts a `DataCache` in front of
//! any implementation.

use serde_json::Value;

use crate::cache::DataCache;
use crate::config::CacheConfig;
use crate::filter::filter_by_date_range;
use crate::models::{
    parse_records, DailyUsageEntry, DateRange, SpendingResponse, TeamGroup, TeamMember,
    TeamMemberSpend, TeamSnapshot,
};
use crate::AnalyticsError;

pub trait RosterProvider {
    fn team_members(&self) -> Result<Vec<TeamMember>, AnalyticsError>;
}

pub trait UsageProvider {
    /// Entries whose day falls inside `range`
    fn daily_usage(&self, range: &DateRange) -> Result<Vec<DailyUsageEntry>, AnalyticsError>;
}

pub trait SpendProvider {
    fn spending(&self) -> Result<SpendingResponse, AnalyticsError>;
}

pub trait TeamProvider {
    fn teams(&self) -> Result<Vec<TeamGroup>, AnalyticsError>;
}

/// Fetch members, usage for `range` and spend into one snapshot
pub fn load_snapshot<P>(provider: &P, range: &DateRange) -> Result<TeamSnapshot, AnalyticsError>
where
    P: RosterProvider + UsageProvider + SpendProvider,
{
    let members = provider.team_members()?;
    let usage = provider.daily_usage(range)?;
    let spending = provider.spending()?;

    tracing::debug!(
        "Loaded snapshot: {} members, {} usage entries, {} spend records",
        members.len(),
        usage.len(),
        spending.team_member_spend.len()
    );

    Ok(TeamSnapshot {
        members,
        usage,
        subscription_cycle_start: spending.subscription_cycle_start,
        spending: spending.team_member_spend,
    })
}

/// The record array inside a response envelope, or the value itself
fn records<'a>(value: &'a Value, field: &str) -> &'a Value {
    value.get(field).unwrap_or(value)
}

/// Provider over payloads already held in memory
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    members: Vec<TeamMember>,
    usage: Vec<DailyUsageEntry>,
    spending: SpendingResponse,
    teams: Vec<TeamGroup>,
}

impl SnapshotProvider {
    pub fn new(snapshot: TeamSnapshot, teams: Vec<TeamGroup>) -> Self {
        let total_members = snapshot.spending.len() as u32;
        Self {
            members: snapshot.members,
            usage: snapshot.usage,
            spending: SpendingResponse {
                subscription_cycle_start: snapshot.subscription_cycle_start,
                total_members,
                total_pages: 1,
                team_member_spend: snapshot.spending,
            },
            teams,
        }
    }

    /// Validate raw vendor payloads.
    ///
    /// Each payload may be the endpoint's response envelope
    /// (`{"teamMembers": [...]}`, `{"data": [...]}`, `{"teamMemberSpend": [...]}`,
    /// `{"teams": [...]}`) or the bare record array.
    pub fn from_json(
        members: &Value,
        usage: &Value,
        spending: &Value,
        teams: &Value,
    ) -> Result<Self, AnalyticsError> {
        let members: Vec<TeamMember> = parse_records(records(members, "teamMembers"), "team members")?;
        let usage: Vec<DailyUsageEntry> = parse_records(records(usage, "data"), "daily usage")?;
        let spend: Vec<TeamMemberSpend> = parse_records(records(spending, "teamMemberSpend"), "spending")?;
        let teams: Vec<TeamGroup> = parse_records(records(teams, "teams"), "teams")?;

        let subscription_cycle_start = spending.get("subscriptionCycleStart").and_then(Value::as_i64);

        Ok(Self::new(
            TeamSnapshot {
                members,
                usage,
                spending: spend,
                subscription_cycle_start,
            },
            teams,
        ))
    }
}

impl RosterProvider for SnapshotProvider {
    fn team_members(&self) -> Result<Vec<TeamMember>, AnalyticsError> {
        Ok(self.members.clone())
    }
}

impl UsageProvider for SnapshotProvider {
    fn daily_usage(&self, range: &DateRange) -> Result<Vec<DailyUsageEntry>, AnalyticsError> {
        Ok(filter_by_date_range(&self.usage, range))
    }
}

impl SpendProvider for SnapshotProvider {
    fn spending(&self) -> Result<SpendingResponse, AnalyticsError> {
        Ok(self.spending.clone())
    }
}

impl TeamProvider for SnapshotProvider {
    fn teams(&self) -> Result<Vec<TeamGroup>, AnalyticsError> {
        Ok(self.teams.clone())
    }
}

/// Serves repeat reads from a `DataCache` inside each source's TTL
#[derive(Debug)]
pub struct CachedProviders<P> {
    inner: P,
    cache: DataCache,
}

impl<P> CachedProviders<P> {
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        Self {
            inner,
            cache: DataCache::new(config),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Force the next read of every source to hit the inner provider
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<P: RosterProvider> RosterProvider for CachedProviders<P> {
    fn team_members(&self) -> Result<Vec<TeamMember>, AnalyticsError> {
        self.cache.members(|| self.inner.team_members())
    }
}

impl<P: UsageProvider> UsageProvider for CachedProviders<P> {
    fn daily_usage(&self, range: &DateRange) -> Result<Vec<DailyUsageEntry>, AnalyticsError> {
        self.cache.usage(range, || self.inner.daily_usage(range))
    }
}

impl<P: SpendProvider> SpendProvider for CachedProviders<P> {
    fn spending(&self) -> Result<SpendingResponse, AnalyticsError> {
        self.cache.spending(|| self.inner.spending())
    }
}

impl<P: TeamProvider> TeamProvider for CachedProviders<P> {
    fn teams(&self) -> Result<Vec<TeamGroup>, AnalyticsError> {
        self.cache.teams(|| self.inner.teams())
    }
}
