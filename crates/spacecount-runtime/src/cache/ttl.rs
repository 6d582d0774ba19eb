use super::clock::{Clock, SystemClock};
use super::scheduler::{ExpiryScheduler, TokioScheduler};
use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

/// Cache entry with its deadline
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// `None` when `created + ttl` overflows; the entry then never expires
    expires_at: Option<Instant>,
    /// Distinguishes re-inserts of the same key so an old timer cannot
    /// delete a newer value
    generation: u64,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    expirations: AtomicU64,
}

/// Cache hit/miss statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub expirations: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Shared<V> {
    entries: DashMap<String, CacheEntry<V>>,
    counters: Counters,
}

impl<V> Shared<V> {
    fn expire(&self, key: &str, generation: u64) {
        if self
            .entries
            .remove_if(key, |_, entry| entry.generation == generation)
            .is_some()
        {
            self.counters.expirations.fetch_add(1, Ordering::Relaxed);
            debug!("Cache entry expired: {}", key);
        }
    }
}

enum Lookup<V> {
    Live(V),
    Stale(u64),
    Missing,
}

/// Key/value cache with per-entry time-to-live
///
/// There is no size bound: entries leave only by expiring, by `remove`, or by
/// `clear`.
pub struct TtlCache<V> {
    shared: Arc<Shared<V>>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn ExpiryScheduler>,
    next_generation: AtomicU64,
    in_flight: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache on the system clock with tokio-driven expiry
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), Arc::new(TokioScheduler))
    }

    /// Create a cache with an explicit clock and expiry scheduler
    pub fn with_clock(clock: Arc<dyn Clock>, scheduler: Arc<dyn ExpiryScheduler>) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: DashMap::new(),
                counters: Counters::default(),
            }),
            clock,
            scheduler,
            next_generation: AtomicU64::new(0),
            in_flight: DashMap::new(),
        }
    }

    /// Get a live value
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.lookup(key);
        let counter = if value.is_some() {
            &self.shared.counters.hits
        } else {
            &self.shared.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Insert a value that expires `ttl` from now
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let expires_at = self.clock.now().checked_add(ttl);

        self.shared.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                expires_at,
                generation,
            },
        );
        self.shared.counters.insertions.fetch_add(1, Ordering::Relaxed);

        if expires_at.is_some() {
            let shared: Weak<Shared<V>> = Arc::downgrade(&self.shared);
            self.scheduler.schedule(
                ttl,
                Box::new(move || {
                    if let Some(shared) = shared.upgrade() {
                        shared.expire(&key, generation);
                    }
                }),
            );
        }
    }

    /// Remove an entry, returning its value if it was still live
    pub fn remove(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        self.shared
            .entries
            .remove(key)
            .and_then(|(_, entry)| entry.is_live(now).then_some(entry.value))
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.shared.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet reclaimed
    pub fn len(&self) -> usize {
        self.shared.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.is_empty()
    }

    /// Snapshot of the hit/miss counters
    pub fn stats(&self) -> CacheStats {
        let c = &self.shared.counters;
        CacheStats {
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            insertions: c.insertions.load(Ordering::Relaxed),
            expirations: c.expirations.load(Ordering::Relaxed),
        }
    }

    /// Return the cached value for `key`, or compute, cache and return it.
    ///
    /// Concurrent callers with the same key wait for the first one instead
    /// of computing in parallel. Errors are returned to the caller that hit
    /// them and are never cached; the next waiter then computes on its own.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!("Cache hit for key: {}", key);
            return Ok(value);
        }

        let gate = self
            .in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();

        let result = {
            let _guard = gate.lock().await;

            // Another caller may have filled the entry while we waited
            match self.lookup(key) {
                Some(value) => {
                    debug!("Cache filled by concurrent request: {}", key);
                    Ok(value)
                }
                None => {
                    debug!("Cache miss for key: {}", key);
                    let computed = compute().await;
                    if let Ok(value) = &computed {
                        self.set(key, value.clone(), ttl);
                    }
                    computed
                }
            }
        };

        drop(gate);
        self.in_flight
            .remove_if(key, |_, gate| Arc::strong_count(gate) == 1);

        result
    }

    fn lookup(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let state = match self.shared.entries.get(key) {
            Some(entry) if entry.is_live(now) => Lookup::Live(entry.value.clone()),
            Some(entry) => Lookup::Stale(entry.generation),
            None => Lookup::Missing,
        };

        match state {
            Lookup::Live(value) => Some(value),
            Lookup::Stale(generation) => {
                self.shared.expire(key, generation);
                None
            }
            Lookup::Missing => None,
        }
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
