//! Time-based caching of fetched data
//!
//! Each data source gets its own TTL cache. Reads return `None` once the TTL
//! has elapsed, so the next caller fetches again.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::models::{DailyUsageEntry, DateRange, SpendingResponse, TeamGroup, TeamMember};
use crate::AnalyticsError;

/// Values keyed by `K`, each valid for `ttl` after it was stored
#[derive(Debug)]
pub struct TtlCache<K, T> {
    data: HashMap<K, (Instant, T)>,
    ttl: Duration,
}

impl<K: Eq + Hash, T: Clone> TtlCache<K, T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: HashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<T> {
        self.data.get(key).and_then(|(time, data)| {
            if time.elapsed() < self.ttl {
                Some(data.clone())
            } else {
                None
            }
        })
    }

    pub fn set(&mut self, key: K, data: T) {
        self.data.insert(key, (Instant::now(), data));
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Entries stored, fresh or stale
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cached value for `key`, or the result of `fetch` which is then stored.
    /// Errors are returned and not cached.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = fetch()?;
        self.set(key, value.clone());
        Ok(value)
    }
}

/// Read through a shared cache. The lock is held across the fetch, so
/// concurrent readers of one source wait for a single fetch. A poisoned
/// lock still holds consistent entries and is used as is.
fn read_through<K, T, F>(slot: &Mutex<TtlCache<K, T>>, key: K, what: &str, fetch: F) -> Result<T, AnalyticsError>
where
    K: Eq + Hash,
    T: Clone,
    F: FnOnce() -> Result<T, AnalyticsError>,
{
    let mut cache = slot.lock().unwrap_or_else(PoisonError::into_inner);
    cache.get_or_try_insert_with(key, || {
        tracing::debug!("Cache miss for {}, fetching", what);
        fetch()
    })
}

/// One cache per data source, with the staleness windows from config
#[derive(Debug)]
pub struct DataCache {
    members: Mutex<TtlCache<(), Vec<TeamMember>>>,
    usage: Mutex<TtlCache<DateRange, Vec<DailyUsageEntry>>>,
    spending: Mutex<TtlCache<(), SpendingResponse>>,
    teams: Mutex<TtlCache<(), Vec<TeamGroup>>>,
}

impl DataCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            members: Mutex::new(TtlCache::new(config.members_ttl())),
            usage: Mutex::new(TtlCache::new(config.usage_ttl())),
            spending: Mutex::new(TtlCache::new(config.spending_ttl())),
            teams: Mutex::new(TtlCache::new(config.teams_ttl())),
        }
    }

    pub fn members<F>(&self, fetch: F) -> Result<Vec<TeamMember>, AnalyticsError>
    where
        F: FnOnce() -> Result<Vec<TeamMember>, AnalyticsError>,
    {
        read_through(&self.members, (), "team members", fetch)
    }

    /// Usage is cached per date range
    pub fn usage<F>(&self, range: &DateRange, fetch: F) -> Result<Vec<DailyUsageEntry>, AnalyticsError>
    where
        F: FnOnce() -> Result<Vec<DailyUsageEntry>, AnalyticsError>,
    {
        read_through(&self.usage, *range, "daily usage", fetch)
    }

    pub fn spending<F>(&self, fetch: F) -> Result<SpendingResponse, AnalyticsError>
    where
        F: FnOnce() -> Result<SpendingResponse, AnalyticsError>,
    {
        read_through(&self.spending, (), "spending", fetch)
    }

    pub fn teams<F>(&self, fetch: F) -> Result<Vec<TeamGroup>, AnalyticsError>
    where
        F: FnOnce() -> Result<Vec<TeamGroup>, AnalyticsError>,
    {
        read_through(&self.teams, (), "teams", fetch)
    }

    /// Drop every cached value, e.g. on an explicit refresh
    pub fn invalidate_all(&self) {
        self.members.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.usage.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.spending.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.teams.lock().unwrap_or_else(PoisonError::into_inner).clear();
        tracing::info!("Data cache cleared");
    }
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
