//! Bounded in-memory cache for route cost lookups
//!
//! Shared read/write across every concurrent lookup and every request;
//! stale or duplicate writes of equivalent keys are harmless.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::RngExt;

use crate::models::{Coordinate, RouteCost, TransportMode};

/// Cache key: mode plus origin/destination rounded to ~4 decimal degrees
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    mode: TransportMode,
    origin: (i64, i64),
    destination: (i64, i64),
    city: Option<String>,
}

impl RouteKey {
    #[must_use]
    pub fn new(
        mode: TransportMode,
        origin: Coordinate,
        destination: Coordinate,
        city: Option<&str>,
    ) -> Self {
        Self {
            mode,
            origin: origin.rounded(4),
            destination: destination.rounded(4),
            city: city.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredEntry {
    cost: RouteCost,
    expires_at: Instant,
}

/// In-memory route cost cache with TTL expiry and a capacity bound.
///
/// Owned by the route cost service and injected at construction so tests can
/// substitute a zero-TTL instance.
#[derive(Debug)]
pub struct RouteCache {
    entries: Mutex<HashMap<RouteKey, StoredEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl RouteCache {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Retrieves a cost if present and not expired
    pub fn get(&self, key: &RouteKey) -> Option<RouteCost> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                tracing::debug!("route cache hit");
                Some(entry.cost.clone())
            }
            Some(_) => {
                tracing::debug!("route cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a cost, evicting the soonest-expiring entry when at capacity.
    ///
    /// The TTL is jittered so a burst of inserts does not expire all at once.
    pub fn put(&self, key: RouteKey, cost: RouteCost) {
        let jitter: f32 = rand::rng().random_range(0.9..1.1);
        let ttl = self.ttl.mul_f32(jitter);

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            StoredEntry {
                cost,
                expires_at: now + ttl,
            },
        );
    }

    /// Number of live entries (expired entries may still be counted)
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
