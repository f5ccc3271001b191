//! TTL cache for NWS points metadata.
//!
//! The `/points/{lat},{lon}` lookup rarely changes, so its payload is cached
//! per coordinate to avoid redundant metadata calls. Entries older than the
//! TTL are treated as absent: `get` removes them lazily, and a periodic
//! maintenance task can call `sweep` to remove them in bulk.
//!
//! A single cache instance is owned by one extractor and is not designed for
//! concurrent mutation; cycles are expected to run serialized.

use crate::types::coordinate::Coordinate;
use log::debug;
use ordered_float::OrderedFloat;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Time source for expiry decisions, injected so tests can advance time
/// without sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Cache observability counters; useful for logging, not correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Entries past their TTL that a `get` or `sweep` has not removed yet.
    pub expired_entries: usize,
    pub ttl: Duration,
}

struct CacheEntry {
    payload: Value,
    inserted_at: Instant,
}

type CoordKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// TTL-based store mapping a coordinate to its raw points payload.
pub struct PointsCache {
    entries: HashMap<CoordKey, CacheEntry>,
    ttl: Duration,
    clock: Box<dyn Clock + Send + Sync>,
}

impl PointsCache {
    /// Cache with the given TTL and the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    /// Cache with an injected clock, used by tests.
    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock + Send + Sync>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    fn key(coord: Coordinate) -> CoordKey {
        (OrderedFloat(coord.latitude), OrderedFloat(coord.longitude))
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) > self.ttl
    }

    /// Return the cached payload for `coord`, or `None` when absent or
    /// expired. An expired entry is removed before returning.
    pub fn get(&mut self, coord: Coordinate) -> Option<Value> {
        let key = Self::key(coord);
        let now = self.clock.now();

        match self.entries.get(&key) {
            None => {
                debug!("No cached points payload for {coord}");
                None
            }
            Some(entry) if self.is_expired(entry, now) => {
                debug!("Cached points payload expired for {coord}");
                self.entries.remove(&key);
                None
            }
            Some(entry) => {
                debug!("Using cached points payload for {coord}");
                Some(entry.payload.clone())
            }
        }
    }

    /// Store `payload` for `coord`, unconditionally overwriting any prior
    /// entry.
    pub fn put(&mut self, coord: Coordinate, payload: Value) {
        let inserted_at = self.clock.now();
        self.entries.insert(
            Self::key(coord),
            CacheEntry {
                payload,
                inserted_at,
            },
        );
        debug!("Cached points payload for {coord}");
    }

    /// Remove every expired entry and return the count removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) <= ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Swept {removed} expired cache entries");
        }
        removed
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let expired_entries = self
            .entries
            .values()
            .filter(|entry| self.is_expired(entry, now))
            .count();
        CacheStats {
            total_entries: self.entries.len(),
            expired_entries,
            ttl: self.ttl,
        }
    }
}

impl std::fmt::Debug for PointsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointsCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
