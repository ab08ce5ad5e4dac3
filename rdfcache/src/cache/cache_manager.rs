// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Bounded store of prebuilt graphs with idle expiry and LRU eviction
//!
//! Locking discipline: one reader/writer lock guards the map. Lookups take the
//! shared side and refresh recency through an atomic timestamp; every structural
//! change (insert, overwrite, remove, eviction scan, sweep scan) takes the
//! exclusive side. Expired entries are never removed by `get`; the periodic sweep
//! or a capacity eviction reclaims them.

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

use super::entry::CacheEntry;
use super::sweeper::{self, SweeperHandle};
use super::{CacheConfig, CacheEntryInfo, CacheError, GraphKey};

/// Keyed store of shared graph handles
pub struct GraphCacheManager<G> {
    config: CacheConfig,
    entries: RwLock<HashMap<GraphKey, CacheEntry<G>>>,
    counters: CacheCounters,
    shut_down: AtomicBool,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl<G> GraphCacheManager<G> {
    /// Create a cache without a background sweep; callers drive `sweep_expired`
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;

        debug!(
            "Creating graph cache (max graphs: {}, idle timeout: {:?})",
            config.max_entries, config.idle_timeout
        );

        Ok(Self {
            entries: RwLock::new(HashMap::with_capacity(config.max_entries)),
            config,
            counters: CacheCounters::default(),
            shut_down: AtomicBool::new(false),
            sweeper: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a live graph, refreshing its recency on a hit
    pub fn get(&self, key: &GraphKey) -> Option<Arc<G>> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &GraphKey, now: Instant) -> Option<Arc<G>> {
        if self.is_shut_down() {
            return None;
        }

        let entries = self.entries.read();
        let Some(entry) = entries.get(key) else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if entry.is_expired(self.config.idle_timeout, now) {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            self.counters.expired_misses.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Graph {} is expired (idle for {:?}), treating as miss",
                key,
                entry.idle_time(now)
            );
            return None;
        }

        entry.touch(now);
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        debug!("Retrieved cached graph {}", key);
        Some(Arc::clone(entry.payload()))
    }

    /// Insert or replace the graph for `key`
    ///
    /// When the cache is full and `key` is new, the least recently accessed
    /// entry is evicted first. Replaced and evicted graphs are dropped after the
    /// lock is released.
    pub fn put(&self, key: GraphKey, payload: impl Into<Arc<G>>) {
        self.put_at(key, payload.into(), Instant::now());
    }

    pub(crate) fn put_at(&self, key: GraphKey, payload: Arc<G>, now: Instant) {
        let released = {
            let mut entries = self.entries.write();

            // Shutdown sets the flag before draining under this lock
            if self.is_shut_down() {
                warn!("Ignoring graph {} stored after cache shutdown", key);
                return;
            }

            let evicted = if entries.len() >= self.config.max_entries && !entries.contains_key(&key)
            {
                self.evict_oldest(&mut entries, now)
            } else {
                None
            };

            let replaced = entries.insert(key, CacheEntry::new(key, payload, now));
            if replaced.is_some() {
                self.counters.replacements.fetch_add(1, Ordering::Relaxed);
            }
            self.counters.insertions.fetch_add(1, Ordering::Relaxed);

            info!(
                "Stored graph {} (total graphs: {})",
                key,
                entries.len()
            );

            (evicted, replaced)
        };

        drop(released);
    }

    /// Remove the graph for `key`; returns whether one was present
    pub fn remove(&self, key: &GraphKey) -> bool {
        let removed = self.entries.write().remove(key);

        match removed {
            Some(_) => {
                self.counters.removals.fetch_add(1, Ordering::Relaxed);
                info!("Manually removed graph {}", key);
                true
            }
            None => false,
        }
    }

    /// Remove every entry idle for at least the configured timeout
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub(crate) fn sweep_expired_at(&self, now: Instant) -> usize {
        if self.is_shut_down() {
            return 0;
        }

        let timeout = self.config.idle_timeout;
        let mut expired = Vec::new();

        {
            let mut entries = self.entries.write();
            let keys: Vec<GraphKey> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(timeout, now))
                .map(|(key, _)| *key)
                .collect();

            for key in keys {
                if let Some(entry) = entries.remove(&key) {
                    info!(
                        "Cleaned up expired graph {} (idle for {:?})",
                        key,
                        entry.idle_time(now)
                    );
                    expired.push(entry);
                }
            }
        }

        let count = expired.len();
        self.counters.sweep_runs.fetch_add(1, Ordering::Relaxed);
        self.counters
            .expirations
            .fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Physical entry count, including expired entries not yet swept
    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether an entry for `key` is physically present, expired or not
    pub fn contains(&self, key: &GraphKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<GraphKey> {
        let mut keys: Vec<GraphKey> = self.entries.read().keys().copied().collect();
        keys.sort();
        keys
    }

    /// Diagnostic snapshot of every entry, ordered by key
    pub fn entries(&self) -> Vec<CacheEntryInfo> {
        let now = Instant::now();
        let mut infos: Vec<CacheEntryInfo> = self
            .entries
            .read()
            .values()
            .map(|entry| entry.info(self.config.idle_timeout, now))
            .collect();
        infos.sort_by_key(|info| info.key);
        infos
    }

    /// Drop every entry
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.entries.write());
        if !drained.is_empty() {
            info!("Cleared {} cached graphs", drained.len());
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Stop the background sweep and release every cached graph
    ///
    /// A running sweep gets `shutdown_grace` to finish before it is aborted.
    /// Afterwards the cache behaves as an always-miss store: lookups return
    /// `None` and stores are ignored.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            debug!("Graph cache already shut down");
            return;
        }

        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.stop(self.config.shutdown_grace).await;
        }

        let drained = std::mem::take(&mut *self.entries.write());
        info!(
            "Graph cache shut down, released {} graphs",
            drained.len()
        );
    }

    pub(crate) fn record_background_tick(&self) {
        self.counters.background_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.size())
    }

    /// Evict the least recently accessed entry; ties go to the older entry
    fn evict_oldest(
        &self,
        entries: &mut HashMap<GraphKey, CacheEntry<G>>,
        now: Instant,
    ) -> Option<CacheEntry<G>> {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| (entry.last_accessed_at(), entry.created_at()))
            .map(|(key, _)| *key)?;

        let entry = entries.remove(&oldest)?;
        self.counters.evictions.fetch_add(1, Ordering::Relaxed);
        info!(
            "Evicted least recently used graph {} (idle for {:?})",
            oldest,
            entry.idle_time(now)
        );
        Some(entry)
    }
}

impl<G: Send + Sync + 'static> GraphCacheManager<G> {
    /// Create a cache and spawn its periodic sweep on the current tokio runtime
    pub fn start(config: CacheConfig) -> Result<Arc<Self>, CacheError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let manager = Arc::new(Self::new(config)?);

        let handle = sweeper::spawn(
            &runtime,
            Arc::downgrade(&manager),
            manager.config.sweep_period,
        );
        *manager.sweeper.lock() = Some(handle);

        info!(
            "Graph cache started (sweep every {:?})",
            manager.config.sweep_period
        );
        Ok(manager)
    }
}

/// Lock-free operation counters
#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired_misses: AtomicU64,
    insertions: AtomicU64,
    replacements: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    removals: AtomicU64,
    sweep_runs: AtomicU64,
    background_ticks: AtomicU64,
}

impl CacheCounters {
    fn snapshot(&self, current_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_misses: self.expired_misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            sweep_runs: self.sweep_runs.load(Ordering::Relaxed),
            background_ticks: self.background_ticks.load(Ordering::Relaxed),
            current_entries,
        }
    }
}

/// Cache statistics snapshot
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    /// Lookups that found nothing, including expired entries
    pub misses: u64,
    /// Misses caused by an expired but not yet swept entry
    pub expired_misses: u64,
    pub insertions: u64,
    /// Insertions that overwrote an existing key
    pub replacements: u64,
    pub evictions: u64,
    /// Entries removed by the sweep
    pub expirations: u64,
    pub removals: u64,
    pub sweep_runs: u64,
    /// Wake-ups of the background sweep task, counted even after shutdown
    pub background_ticks: u64,
    pub current_entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Variant;
    use std::time::Duration;

    fn key(id: i64) -> GraphKey {
        GraphKey::new(id, Variant::Basic)
    }

    fn cache(max_entries: usize) -> GraphCacheManager<String> {
        GraphCacheManager::new(CacheConfig::default().with_max_entries(max_entries)).unwrap()
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_get_miss_then_hit() {
        let cache = cache(8);
        let now = Instant::now();

        assert!(cache.get_at(&key(1), now).is_none());
        cache.put_at(key(1), Arc::new("g1".to_string()), now);

        let graph = cache.get_at(&key(1), now + secs(1)).unwrap();
        assert_eq!(graph.as_str(), "g1");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.current_entries, 1);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let cache = cache(8);
        let start = Instant::now();

        for id in 0..20 {
            cache.put_at(key(id), Arc::new(format!("g{}", id)), start + secs(id as u64));
            assert!(cache.size() <= 8);
        }
        assert_eq!(cache.size(), 8);
        assert_eq!(cache.stats().evictions, 12);
    }

    #[test]
    fn test_evicts_least_recently_inserted() {
        let cache = cache(8);
        let start = Instant::now();

        for id in 1..=8 {
            cache.put_at(key(id), Arc::new(format!("g{}", id)), start + secs(id as u64));
        }
        cache.put_at(key(9), Arc::new("g9".to_string()), start + secs(9));

        assert!(!cache.contains(&key(1)));
        for id in 2..=9 {
            assert!(cache.contains(&key(id)), "key {} should survive", id);
        }
    }

    #[test]
    fn test_get_spares_entry_from_eviction() {
        let cache = cache(8);
        let start = Instant::now();

        for id in 1..=8 {
            cache.put_at(key(id), Arc::new(format!("g{}", id)), start + secs(id as u64));
        }
        assert!(cache.get_at(&key(1), start + secs(9)).is_some());
        cache.put_at(key(9), Arc::new("g9".to_string()), start + secs(10));

        assert!(cache.contains(&key(1)));
        assert!(!cache.contains(&key(2)));
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let cache = cache(8);
        let now = Instant::now();

        cache.put_at(key(1), Arc::new("v1".to_string()), now);
        cache.put_at(key(2), Arc::new("other".to_string()), now);
        let before = cache.size();

        cache.put_at(key(1), Arc::new("v2".to_string()), now + secs(1));
        assert_eq!(cache.size(), before);
        assert_eq!(cache.get_at(&key(1), now + secs(2)).unwrap().as_str(), "v2");
        assert_eq!(cache.stats().replacements, 1);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let cache = cache(2);
        let now = Instant::now();

        cache.put_at(key(1), Arc::new("a".to_string()), now);
        cache.put_at(key(2), Arc::new("b".to_string()), now + secs(1));
        cache.put_at(key(1), Arc::new("a2".to_string()), now + secs(2));

        assert!(cache.contains(&key(1)));
        assert!(cache.contains(&key(2)));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_expired_entry_is_a_miss_but_still_counted() {
        let cache = cache(8);
        let start = Instant::now();
        let timeout = cache.config().idle_timeout;

        cache.put_at(key(1), Arc::new("g".to_string()), start);

        assert!(cache.get_at(&key(1), start + timeout + secs(1)).is_none());
        assert_eq!(cache.size(), 1);
        assert!(cache.contains(&key(1)));
        assert_eq!(cache.stats().expired_misses, 1);
    }

    #[test]
    fn test_expired_miss_does_not_refresh() {
        let cache = cache(8);
        let start = Instant::now();
        let timeout = cache.config().idle_timeout;

        cache.put_at(key(1), Arc::new("g".to_string()), start);
        assert!(cache.get_at(&key(1), start + timeout).is_none());
        assert!(cache.get_at(&key(1), start + timeout + secs(1)).is_none());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache = cache(8);
        let start = Instant::now();
        let timeout = cache.config().idle_timeout;

        cache.put_at(key(1), Arc::new("old".to_string()), start);
        cache.put_at(key(2), Arc::new("fresh".to_string()), start + secs(300));

        let now = start + timeout + secs(1);
        let fresh_accessed = cache.entries.read().get(&key(2)).unwrap().last_accessed_at();

        assert_eq!(cache.sweep_expired_at(now), 1);
        assert!(!cache.contains(&key(1)));
        assert!(cache.contains(&key(2)));

        let after = cache.entries.read().get(&key(2)).unwrap().last_accessed_at();
        assert_eq!(after, fresh_accessed);
        assert_eq!(cache.stats().expirations, 1);
        assert_eq!(cache.stats().sweep_runs, 1);
    }

    #[test]
    fn test_remove() {
        let cache = cache(8);
        let now = Instant::now();

        cache.put_at(key(1), Arc::new("g".to_string()), now);
        assert!(cache.remove(&key(1)));
        assert!(!cache.remove(&key(1)));
        assert!(cache.is_empty());
        assert!(cache.get_at(&key(1), now).is_none());
    }

    #[test]
    fn test_eviction_prefers_expired_oldest() {
        let cache = cache(2);
        let start = Instant::now();
        let timeout = cache.config().idle_timeout;

        cache.put_at(key(1), Arc::new("a".to_string()), start);
        cache.put_at(key(2), Arc::new("b".to_string()), start + timeout);
        cache.put_at(key(3), Arc::new("c".to_string()), start + timeout + secs(1));

        assert_eq!(cache.keys(), vec![key(2), key(3)]);
    }

    #[test]
    fn test_keys_are_sorted_and_variants_distinct() {
        let cache = cache(8);
        let now = Instant::now();

        cache.put_at(GraphKey::new(2, Variant::All), Arc::new("x".to_string()), now);
        cache.put_at(GraphKey::new(1, Variant::Combined), Arc::new("y".to_string()), now);
        cache.put_at(GraphKey::new(1, Variant::Basic), Arc::new("z".to_string()), now);

        assert_eq!(
            cache.keys(),
            vec![
                GraphKey::new(1, Variant::Basic),
                GraphKey::new(1, Variant::Combined),
                GraphKey::new(2, Variant::All),
            ]
        );
    }

    #[test]
    fn test_replaced_payload_is_released() {
        let cache = cache(8);
        let first = Arc::new("v1".to_string());

        cache.put(key(1), Arc::clone(&first));
        assert_eq!(Arc::strong_count(&first), 2);

        cache.put(key(1), "v2".to_string());
        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn test_put_blocked_behind_shutdown_drain_is_dropped() {
        let cache = cache(8);
        cache.put(key(1), "a".to_string());

        std::thread::scope(|scope| {
            let mut entries = cache.entries.write();
            let writer = scope.spawn(|| cache.put(key(2), "late".to_string()));

            // Let the writer reach the lock, then shut down the way `shutdown` does
            std::thread::sleep(Duration::from_millis(50));
            cache.shut_down.store(true, Ordering::Release);
            entries.clear();
            drop(entries);

            writer.join().unwrap();
        });

        assert_eq!(cache.size(), 0);
        assert!(cache.get(&key(2)).is_none());
        assert_eq!(cache.stats().insertions, 1);
    }

    #[test]
    fn test_clear() {
        let cache = cache(8);
        cache.put(key(1), "a".to_string());
        cache.put(key(2), "b".to_string());

        cache.clear();
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_start_requires_runtime() {
        let result = GraphCacheManager::<String>::start(CacheConfig::default());
        assert!(matches!(result, Err(CacheError::NoRuntime)));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = GraphCacheManager::<String>::new(CacheConfig::default().with_max_entries(0));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }
}
