//! Bounded TTL cache keyed by entity pairs.
//!
//! Entries expire lazily on read and proactively through sweeps. Inserts that
//! would break the entry cap (hard) or the byte budget (soft) evict the
//! lowest-scoring entries first. Locks are never held across an await.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use stealth_core::{EntityId, SceneEntity};
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, CacheOptions};
use super::key::CacheKey;
use super::stats::{CacheCounters, CacheStats};
use crate::config::CacheConfig;

/// What [`PositionCache::evict_to_target`] should shrink the cache to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvictionTarget {
    /// At most this many entries.
    Entries(usize),
    /// At most this many estimated bytes.
    Bytes(usize),
}

struct Slots<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    bytes: usize,
}

impl<V> Slots<V> {
    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.bytes = self.bytes.saturating_sub(entry.size_bytes);
        Some(entry)
    }

    fn insert(&mut self, entry: CacheEntry<V>) {
        self.bytes += entry.size_bytes;
        self.entries.insert(entry.key.clone(), entry);
    }

    fn satisfies(&self, target: EvictionTarget) -> bool {
        match target {
            EvictionTarget::Entries(max) => self.entries.len() <= max,
            EvictionTarget::Bytes(max) => self.bytes <= max,
        }
    }
}

/// Position/result cache for pair computations.
pub struct PositionCache<V> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    slots: RwLock<Slots<V>>,
    counters: CacheCounters,
    last_sweep_ms: AtomicU64,
}

impl<V> PositionCache<V>
where
    V: Clone + Serialize,
{
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            config,
            clock,
            slots: RwLock::new(Slots {
                entries: HashMap::new(),
                bytes: 0,
            }),
            counters: CacheCounters::default(),
            last_sweep_ms: AtomicU64::new(now),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots<V>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots<V>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a live value and records the access. Expired entries are
    /// removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now_ms();
        self.maybe_sweep(now);

        let mut slots = self.write();
        let lookup = slots.entries.get_mut(key).map(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                entry.touch(now);
                Some(entry.value.clone())
            }
        });

        match lookup {
            Some(Some(value)) => {
                self.counters.hit();
                Some(value)
            }
            Some(None) => {
                slots.remove(key);
                self.counters.expired(1);
                self.counters.miss();
                None
            }
            None => {
                self.counters.miss();
                None
            }
        }
    }

    /// Stores a value, evicting first if a bound would be exceeded.
    pub fn insert(&self, key: CacheKey, value: V, options: CacheOptions) {
        let now = self.clock.now_ms();
        self.maybe_sweep(now);

        let size_bytes = estimate_size(&value);
        let ttl_ms = options.effective_ttl_ms(self.config.default_ttl);

        let mut slots = self.write();
        slots.remove(&key);

        let mut evicted = 0;
        if slots.entries.len() >= self.config.max_entries {
            let keep = self.config.max_entries.saturating_sub(1);
            evicted += evict_locked(&mut slots, now, EvictionTarget::Entries(keep));
        }
        if slots.bytes + size_bytes > self.config.max_bytes {
            let keep = self.config.max_bytes.saturating_sub(size_bytes);
            evicted += evict_locked(&mut slots, now, EvictionTarget::Bytes(keep));
        }
        if evicted > 0 {
            self.counters.evicted(evicted);
            debug!(evicted, key = %key, "evicted cache entries to make room");
        }

        trace!(key = %key, size_bytes, ttl_ms, "cache insert");
        slots.insert(CacheEntry {
            key,
            value,
            created_at_ms: now,
            ttl_ms,
            access_count: 0,
            last_access_ms: now,
            size_bytes,
            importance: options.importance,
        });
        self.counters.inserted();
    }

    /// Returns the cached value or computes, stores and returns it.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F, options: CacheOptions) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.insert(key, value.clone(), options);
        value
    }

    /// Removes every entry whose key involves `entity`. Linear in cache size.
    pub fn invalidate(&self, entity: &EntityId) -> usize {
        let mut slots = self.write();
        let stale: Vec<CacheKey> = slots
            .entries
            .keys()
            .filter(|key| key.involves(entity))
            .cloned()
            .collect();
        for key in &stale {
            slots.remove(key);
        }
        if !stale.is_empty() {
            self.counters.invalidated(stale.len());
            debug!(entity = %entity, removed = stale.len(), "invalidated cache entries");
        }
        stale.len()
    }

    /// Resolves `from -> subject` values for every subject, computing the
    /// missing ones in chunks and yielding to the scheduler between chunks.
    pub async fn batch_preload<F>(
        &self,
        from: &SceneEntity,
        subjects: &[SceneEntity],
        compute: F,
        options: CacheOptions,
    ) -> HashMap<EntityId, V>
    where
        F: Fn(&SceneEntity, &SceneEntity) -> V,
    {
        let mut resolved = HashMap::with_capacity(subjects.len());
        let mut missing = Vec::new();
        for subject in subjects {
            let key = CacheKey::for_pair(from, subject);
            match self.get(&key) {
                Some(value) => {
                    resolved.insert(subject.id.clone(), value);
                }
                None => missing.push((key, subject)),
            }
        }

        let cached = resolved.len();
        let chunk_size = self.config.preload_chunk_size.max(1);
        for (index, chunk) in missing.chunks(chunk_size).enumerate() {
            if index > 0 {
                tokio::task::yield_now().await;
            }
            for (key, subject) in chunk {
                let value = compute(from, subject);
                self.insert(key.clone(), value.clone(), options);
                resolved.insert(subject.id.clone(), value);
            }
        }

        debug!(
            from = %from.id,
            cached,
            computed = missing.len(),
            "batch preload finished"
        );
        resolved
    }

    /// Evicts lowest-scoring entries until `target` holds.
    pub fn evict_to_target(&self, target: EvictionTarget) -> usize {
        let now = self.clock.now_ms();
        let mut slots = self.write();
        let evicted = evict_locked(&mut slots, now, target);
        if evicted > 0 {
            self.counters.evicted(evicted);
            debug!(evicted, ?target, "evicted cache entries");
        }
        evicted
    }

    /// Removes every expired entry.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_at(self.clock.now_ms())
    }

    fn maybe_sweep(&self, now: u64) {
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        let interval = self.config.sweep_interval.as_millis() as u64;
        if now.saturating_sub(last) >= interval {
            self.sweep_at(now);
        }
    }

    fn sweep_at(&self, now: u64) -> usize {
        self.last_sweep_ms.store(now, Ordering::Relaxed);
        let mut slots = self.write();
        let expired: Vec<CacheKey> = slots
            .entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.key.clone())
            .collect();
        for key in &expired {
            slots.remove(key);
        }
        if !expired.is_empty() {
            self.counters.expired(expired.len());
            debug!(removed = expired.len(), "swept expired cache entries");
        }
        expired.len()
    }

    pub fn clear(&self) {
        let mut slots = self.write();
        slots.entries.clear();
        slots.bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Estimated payload bytes currently held.
    pub fn bytes(&self) -> usize {
        self.read().bytes
    }

    pub fn stats(&self) -> CacheStats {
        let slots = self.read();
        self.counters.snapshot(slots.entries.len(), slots.bytes)
    }
}

/// Scores a snapshot of the entries and removes the lowest until `target` holds.
fn evict_locked<V>(slots: &mut Slots<V>, now: u64, target: EvictionTarget) -> usize {
    if slots.satisfies(target) {
        return 0;
    }
    let mut ranked: Vec<(f64, CacheKey)> = slots
        .entries
        .values()
        .map(|entry| (entry.score(now), entry.key.clone()))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut evicted = 0;
    for (_, key) in ranked {
        if slots.satisfies(target) {
            break;
        }
        if slots.remove(&key).is_some() {
            evicted += 1;
        }
    }
    evicted
}

/// Serialized size of the payload, falling back to its in-memory size.
fn estimate_size<V: Serialize>(value: &V) -> usize {
    bincode::serialized_size(value)
        .map(|size| size as usize)
        .unwrap_or(std::mem::size_of::<V>())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use stealth_core::{ActorType, Position};

    use super::*;
    use crate::cache::{Importance, ManualClock};

    fn key(from: &str, to: &str) -> CacheKey {
        CacheKey::new(
            EntityId::new(from),
            Position::ORIGIN,
            EntityId::new(to),
            Position::ORIGIN,
        )
    }

    fn cache(config: CacheConfig) -> (PositionCache<u64>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        (PositionCache::with_clock(config, clock.clone()), clock)
    }

    fn small_config() -> CacheConfig {
        CacheConfig {
            max_entries: 3,
            max_bytes: 1024,
            default_ttl: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(60),
            preload_chunk_size: 2,
        }
    }

    #[test]
    fn ttl_boundary() {
        let (cache, clock) = cache(small_config());
        cache.insert(key("a", "b"), 1, CacheOptions::default());

        clock.advance(Duration::from_millis(9_999));
        assert_eq!(cache.get(&key("a", "b")), Some(1));

        clock.advance(Duration::from_millis(2));
        assert_eq!(cache.get(&key("a", "b")), None);
        assert_eq!(cache.stats().expirations, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn entry_cap_is_never_exceeded() {
        let (cache, clock) = cache(small_config());
        for i in 0..10 {
            cache.insert(key("a", &format!("s{i}")), i, CacheOptions::default());
            clock.advance(Duration::from_millis(10));
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.stats().evictions, 7);
    }

    #[test]
    fn eviction_prefers_cold_entries() {
        let (cache, clock) = cache(small_config());
        cache.insert(key("a", "hot"), 1, CacheOptions::default());
        cache.insert(key("a", "cold"), 2, CacheOptions::default());
        cache.insert(key("a", "warm"), 3, CacheOptions::default());
        for _ in 0..5 {
            clock.advance(Duration::from_millis(100));
            cache.get(&key("a", "hot"));
            cache.get(&key("a", "warm"));
        }

        cache.insert(key("a", "new"), 4, CacheOptions::default());
        assert_eq!(cache.get(&key("a", "cold")), None);
        assert_eq!(cache.get(&key("a", "hot")), Some(1));
        assert_eq!(cache.get(&key("a", "new")), Some(4));
    }

    #[test]
    fn importance_protects_entries() {
        let (cache, clock) = cache(small_config());
        let critical = CacheOptions::default().with_importance(Importance::Critical);
        let low = CacheOptions::default().with_importance(Importance::Low);
        cache.insert(key("a", "keep"), 1, critical);
        cache.insert(key("a", "drop"), 2, low);
        clock.advance(Duration::from_secs(1));

        assert_eq!(cache.evict_to_target(EvictionTarget::Entries(1)), 1);
        assert_eq!(cache.get(&key("a", "keep")), Some(1));
    }

    #[test]
    fn importance_protects_stale_entries() {
        let (cache, clock) = cache(small_config());
        let critical = CacheOptions::default().with_importance(Importance::Critical);
        let normal = CacheOptions::default().with_ttl(Duration::from_secs(30));
        cache.insert(key("a", "keep"), 1, critical);
        cache.insert(key("a", "drop"), 2, normal);
        clock.advance(Duration::from_secs(25));

        assert_eq!(cache.evict_to_target(EvictionTarget::Entries(1)), 1);
        assert_eq!(cache.get(&key("a", "keep")), Some(1));
        assert_eq!(cache.get(&key("a", "drop")), None);
    }

    #[test]
    fn byte_budget_evicts() {
        let config = CacheConfig {
            max_entries: 100,
            max_bytes: 64,
            ..small_config()
        };
        let clock = Arc::new(ManualClock::new(0));
        let cache: PositionCache<String> = PositionCache::with_clock(config, clock);
        for i in 0..10 {
            cache.insert(key("a", &format!("s{i}")), "x".repeat(16), CacheOptions::default());
            assert!(cache.bytes() <= 64);
        }
        // 16 chars + 8 byte length prefix per entry.
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_removes_both_directions() {
        let (cache, _) = cache(small_config());
        cache.insert(key("a", "b"), 1, CacheOptions::default());
        cache.insert(key("b", "c"), 2, CacheOptions::default());
        cache.insert(key("c", "d"), 3, CacheOptions::default());

        assert_eq!(cache.invalidate(&EntityId::new("b")), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().invalidations, 2);
    }

    #[test]
    fn sweep_removes_only_expired() {
        let (cache, clock) = cache(small_config());
        cache.insert(key("a", "short"), 1, CacheOptions::default().with_ttl(Duration::from_secs(1)));
        cache.insert(key("a", "long"), 2, CacheOptions::default());
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn get_or_compute_computes_once() {
        let (cache, _) = cache(small_config());
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache.get_or_compute(
                key("a", "b"),
                || {
                    calls += 1;
                    42
                },
                CacheOptions::default(),
            );
            assert_eq!(value, 42);
        }
        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[tokio::test]
    async fn batch_preload_partitions_cached_and_missing() {
        let config = CacheConfig {
            max_entries: 100,
            ..small_config()
        };
        let (cache, _) = cache(config);
        let from = SceneEntity::new("seeker", ActorType::Character, Position::ORIGIN);
        let subjects: Vec<SceneEntity> = (0..5)
            .map(|i| SceneEntity::new(format!("s{i}"), ActorType::Npc, Position::new(i as f64, 0.0)))
            .collect();
        cache.insert(CacheKey::for_pair(&from, &subjects[0]), 99, CacheOptions::default());

        let computed = std::sync::atomic::AtomicUsize::new(0);
        let values = cache
            .batch_preload(
                &from,
                &subjects,
                |_, subject| {
                    computed.fetch_add(1, Ordering::Relaxed);
                    subject.position.x as u64
                },
                CacheOptions::default(),
            )
            .await;

        assert_eq!(values.len(), 5);
        assert_eq!(values[&EntityId::new("s0")], 99);
        assert_eq!(values[&EntityId::new("s3")], 3);
        assert_eq!(computed.load(Ordering::Relaxed), 4);
        assert_eq!(cache.len(), 5);
    }
}
