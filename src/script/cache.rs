//! LRU cache of script bodies keyed by handle.
//!
//! This is the store-side half of handle-based invocation: a handle is only
//! usable while its body is cached here. Eviction and [`ScriptCache::clear`]
//! are how a store "forgets" scripts.

use crate::store::ScriptHandle;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Statistics for script cache monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Total number of cache lookups
    pub lookups: u64,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of insertions
    pub insertions: u64,
    /// Number of evictions
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

/// Thread-safe LRU cache of script bodies.
///
/// Uses a HashMap for lookups and a VecDeque for recency order. Capacity
/// counts scripts, not bytes.
#[derive(Debug)]
pub struct ScriptCache {
    /// Maximum number of scripts, 0 for unbounded
    capacity: usize,
    /// Cached bodies by handle
    scripts: RwLock<HashMap<ScriptHandle, Arc<str>>>,
    /// LRU queue (most recently used at the back)
    lru_queue: RwLock<VecDeque<ScriptHandle>>,
    /// Cache statistics
    stats: RwLock<CacheStats>,
}

impl ScriptCache {
    /// Creates a cache holding at most `capacity` scripts (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            scripts: RwLock::new(HashMap::new()),
            lru_queue: RwLock::new(VecDeque::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Returns the body cached under `handle`, marking it recently used.
    pub fn get(&self, handle: &ScriptHandle) -> Option<Arc<str>> {
        let found = self.scripts.read().get(handle).cloned();

        let mut stats = self.stats.write();
        stats.lookups += 1;
        match found {
            Some(body) => {
                stats.hits += 1;
                drop(stats);
                self.touch(handle);
                Some(body)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Returns true if `handle` is cached, without touching recency or stats.
    pub fn contains(&self, handle: &ScriptHandle) -> bool {
        self.scripts.read().contains_key(handle)
    }

    /// Caches `body` under `handle`, evicting the least recently used
    /// scripts if the cache is full.
    pub fn insert(&self, handle: ScriptHandle, body: Arc<str>) {
        let mut scripts = self.scripts.write();
        let mut lru_queue = self.lru_queue.write();

        if scripts.insert(handle.clone(), body).is_some() {
            lru_queue.retain(|h| h != &handle);
        }
        lru_queue.push_back(handle);

        let mut evicted = 0;
        while self.capacity > 0 && scripts.len() > self.capacity {
            match lru_queue.pop_front() {
                Some(oldest) => {
                    scripts.remove(&oldest);
                    log::debug!("Evicted script {} from cache", oldest);
                    evicted += 1;
                }
                None => break,
            }
        }
        drop(lru_queue);
        drop(scripts);

        let mut stats = self.stats.write();
        stats.insertions += 1;
        stats.evictions += evicted;
    }

    /// Moves `handle` to the most recently used position.
    ///
    /// O(n) in the number of cached scripts, which stays small.
    fn touch(&self, handle: &ScriptHandle) {
        let mut lru_queue = self.lru_queue.write();
        if let Some(pos) = lru_queue.iter().position(|h| h == handle) {
            lru_queue.remove(pos);
            lru_queue.push_back(handle.clone());
        }
    }

    /// Get current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    /// Drops every cached script.
    pub fn clear(&self) {
        let mut scripts = self.scripts.write();
        let mut lru_queue = self.lru_queue.write();
        scripts.clear();
        lru_queue.clear();
    }

    /// Get the cache capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of cached scripts.
    pub fn len(&self) -> usize {
        self.scripts.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
