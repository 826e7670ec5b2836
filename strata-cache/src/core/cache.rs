use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use super::error::{CacheError, Result};
use super::frequency::FrequencyTracker;
use super::memory::MemoryTier;
use crate::config::CacheConfig;
use crate::storage::{DiskTier, DurableTier};

/// Aggregate cache state behind the coarse lock: both tiers plus the
/// frequency tracker. Guarded as one unit so every compound operation
/// (lookup, mutate, count, rebalance) runs to completion before the next
/// one starts.
struct CacheInner {
    memory: MemoryTier,
    durable: Box<dyn DurableTier>,
    tracker: FrequencyTracker,
    stats: CacheStats,
}

/// Two-tier key-value cache.
///
/// Keeps the `capacity` most frequently accessed keys in the memory tier
/// and everything else in the durable tier. A key lives in exactly one tier
/// at a time; values move between tiers, they are never duplicated. Access
/// counts drive a rebalance pass that runs synchronously inside `get` and
/// `set` — there are no background tasks.
///
/// The handle is cheap to clone and safe to share across tasks. The lock is
/// never held across an await point.
#[derive(Clone)]
pub struct TieredCache {
    capacity: usize,
    inner: Arc<Mutex<CacheInner>>,
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl TieredCache {
    /// Create a cache over the given durable tier.
    ///
    /// Fails with [`CacheError::InvalidConfiguration`] when the configured
    /// capacity is zero.
    pub fn new(config: &CacheConfig, durable: Box<dyn DurableTier>) -> Result<Self> {
        config.validate()?;

        info!("Initializing tiered cache with capacity={}", config.capacity);

        Ok(Self {
            capacity: config.capacity,
            inner: Arc::new(Mutex::new(CacheInner {
                memory: MemoryTier::new(),
                durable,
                tracker: FrequencyTracker::new(),
                stats: CacheStats::default(),
            })),
        })
    }

    /// Create a cache backed by a [`DiskTier`] built from the configured
    /// data directory and namespace.
    pub fn open(config: &CacheConfig) -> Result<Self> {
        let disk = DiskTier::open(&config.data_dir, config.namespace.as_deref())?;
        Self::new(config, Box::new(disk))
    }

    /// Maximum number of keys the memory tier may hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the value for `key`, checking the memory tier first and falling
    /// back to the durable tier. A hit counts as an access and triggers a
    /// rebalance; the stored value itself is never changed by reads.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        debug!("GET key={}", key);

        let mut inner = self.inner.lock();
        inner.stats.gets += 1;

        let value = match inner.memory.get(key) {
            Some(value) => Some(value.clone()),
            None => inner.durable.get(key)?,
        };

        let Some(value) = value else {
            inner.stats.misses += 1;
            return Err(CacheError::KeyNotFound(key.to_string()));
        };

        inner.stats.hits += 1;
        inner.tracker.increment(key);
        self.rebalance(&mut inner)?;

        Ok(value)
    }

    /// [`get`](Self::get) with an explicit optional default.
    ///
    /// `Some(fallback)` suppresses [`CacheError::KeyNotFound`] and returns
    /// the fallback instead; `None` behaves exactly like `get`. The flag is
    /// the `Option` itself — any byte string, including an empty one, is a
    /// legal default.
    pub async fn get_or(&self, key: &str, default: Option<Vec<u8>>) -> Result<Vec<u8>> {
        match (self.get(key).await, default) {
            (Ok(value), _) => Ok(value),
            (Err(err), Some(fallback)) if err.is_not_found() => Ok(fallback),
            (Err(err), _) => Err(err),
        }
    }

    /// Store `value` under `key`. Three disjoint cases, chosen so a
    /// rebalance only runs when tier membership could actually change.
    pub async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        debug!("SET key={}, size={}", key, value.len());

        let mut inner = self.inner.lock();
        inner.stats.sets += 1;

        if inner.memory.contains(key) {
            // Already resident: overwrite in place. Membership cannot have
            // changed, skip the rebalance.
            inner.memory.insert(key.to_string(), value);
            inner.tracker.increment(key);
            return Ok(());
        }

        if inner.memory.len() < self.capacity && !inner.durable.contains(key)? {
            // Brand-new key and free capacity: inserting cannot evict
            // anything, skip the rebalance.
            inner.memory.insert(key.to_string(), value);
            inner.tracker.increment(key);
            return Ok(());
        }

        // Memory is full, or the key already lives on disk. Write it to the
        // durable tier and let the rebalance decide whether its new count
        // outranks a resident key.
        inner.durable.set(key, value)?;
        inner.tracker.increment(key);
        self.rebalance(&mut inner)
    }

    /// Delete `key` from whichever tier holds it.
    ///
    /// The frequency counter is purged on every path — including the miss
    /// path — so no counter can outlive its entry.
    pub async fn delete(&self, key: &str) -> Result<()> {
        debug!("DELETE key={}", key);

        let mut inner = self.inner.lock();
        inner.stats.dels += 1;

        let removed = match inner.memory.remove(key) {
            Some(_) => true,
            None => inner.durable.remove(key)?.is_some(),
        };

        inner.tracker.remove(key);

        if removed {
            Ok(())
        } else {
            Err(CacheError::KeyNotFound(key.to_string()))
        }
    }

    /// Membership test across both tiers. A hit counts as an access, a miss
    /// does not. Never rebalances: testing for a key must not move data.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.lock();

        let hit = inner.memory.contains(key) || inner.durable.contains(key)?;
        if hit {
            inner.tracker.increment(key);
        }

        Ok(hit)
    }

    /// Lazy iterator over all keys: memory tier first, then the durable
    /// tier. Iteration never bumps access counts — a full scan would raise
    /// every count by one and leave the ranking unchanged while forcing
    /// pointless migrations.
    ///
    /// The view is weak, not a snapshot: entries added or removed while the
    /// iterator is live may or may not be observed. Durable-tier failures
    /// are yielded as `Err` items.
    pub fn keys(&self) -> Keys {
        let memory = self.inner.lock().memory.keys();
        Keys {
            inner: Arc::clone(&self.inner),
            memory: memory.into_iter(),
            disk: None,
            failed: false,
        }
    }

    /// Lazy iterator over all (key, value) pairs: memory tier first, then
    /// the durable tier. Same access-count and weak-view semantics as
    /// [`keys`](Self::keys); durable values are read one at a time, and a
    /// key that vanishes before its value is read is silently skipped.
    pub fn items(&self) -> Items {
        let memory = self.inner.lock().memory.items();
        Items {
            inner: Arc::clone(&self.inner),
            memory: memory.into_iter(),
            disk: None,
            failed: false,
        }
    }

    /// Drop everything: durable contents, resident entries, access counts
    /// and stats. The cache ends up observationally identical to a freshly
    /// constructed instance with the same capacity.
    pub async fn reset(&self) -> Result<()> {
        info!("Resetting cache");

        let mut inner = self.inner.lock();
        inner.durable.clear()?;
        inner.memory.clear();
        inner.tracker.clear();
        inner.stats = CacheStats::default();

        Ok(())
    }

    /// Snapshot of the current resident set, most useful for tests and
    /// observability. Does not count as an access.
    pub async fn hot_keys(&self) -> Vec<String> {
        self.inner.lock().memory.keys()
    }

    /// Operation counters plus current tier occupancy.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.resident_keys = inner.memory.len();
        stats.tracked_keys = inner.tracker.len();
        stats
    }

    /// Recompute the desired resident set and migrate keys so the memory
    /// tier holds exactly the top-`capacity` keys by access count.
    ///
    /// Demotions run before promotions so the capacity bound holds at every
    /// point of the pass. Each migration step tolerates the key having
    /// vanished by skipping it — the pass is best-effort, not transactional.
    fn rebalance(&self, inner: &mut CacheInner) -> Result<()> {
        let target: HashSet<String> = inner.tracker.top_n(self.capacity).into_iter().collect();

        for key in inner.memory.keys() {
            if target.contains(&key) {
                continue;
            }
            if let Some(value) = inner.memory.remove(&key) {
                inner.durable.set(&key, value)?;
                inner.stats.demotions += 1;
                debug!("demoted key={}", key);
            }
        }

        for key in &target {
            if inner.memory.contains(key) {
                continue;
            }
            if let Some(value) = inner.durable.remove(key)? {
                inner.memory.insert(key.clone(), value);
                inner.stats.promotions += 1;
                debug!("promoted key={}", key);
            }
        }

        Ok(())
    }
}

/// See [`TieredCache::keys`].
pub struct Keys {
    inner: Arc<Mutex<CacheInner>>,
    memory: std::vec::IntoIter<String>,
    disk: Option<std::vec::IntoIter<String>>,
    failed: bool,
}

impl Iterator for Keys {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(key) = self.memory.next() {
            return Some(Ok(key));
        }

        loop {
            match &mut self.disk {
                Some(keys) => return keys.next().map(Ok),
                None => {
                    if self.failed {
                        return None;
                    }
                    // Memory phase is exhausted; list the durable tier now,
                    // not at construction time. Weak view by design.
                    match self.inner.lock().durable.keys() {
                        Ok(keys) => self.disk = Some(keys.into_iter()),
                        Err(err) => {
                            self.failed = true;
                            return Some(Err(err));
                        }
                    }
                }
            }
        }
    }
}

/// See [`TieredCache::items`].
pub struct Items {
    inner: Arc<Mutex<CacheInner>>,
    memory: std::vec::IntoIter<(String, Vec<u8>)>,
    disk: Option<std::vec::IntoIter<String>>,
    failed: bool,
}

impl Iterator for Items {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pair) = self.memory.next() {
            return Some(Ok(pair));
        }

        if self.failed {
            return None;
        }

        if self.disk.is_none() {
            match self.inner.lock().durable.keys() {
                Ok(keys) => self.disk = Some(keys.into_iter()),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }

        while let Some(key) = self.disk.as_mut().and_then(|keys| keys.next()) {
            // One short lock per value; a key deleted since the listing
            // simply gets skipped.
            match self.inner.lock().durable.get(&key) {
                Ok(Some(value)) => return Some(Ok((key, value))),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }

        None
    }
}

/// Operation counters for a [`TieredCache`]
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Keys currently resident in the memory tier
    pub resident_keys: usize,
    /// Keys with a live frequency counter (present in either tier)
    pub tracked_keys: usize,
    /// Number of GET operations
    pub gets: u64,
    /// Number of SET operations
    pub sets: u64,
    /// Number of DELETE operations
    pub dels: u64,
    /// GETs answered from either tier
    pub hits: u64,
    /// GETs that missed both tiers
    pub misses: u64,
    /// Values moved disk -> memory
    pub promotions: u64,
    /// Values moved memory -> disk
    pub demotions: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
