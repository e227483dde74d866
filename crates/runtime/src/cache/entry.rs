//! Cache entries, importance tiers and per-insert options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::key::CacheKey;

/// Importance tier; scales both the eviction score and the TTL.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Importance {
    Critical,
    High,
    #[default]
    Normal,
    Low,
}

impl Importance {
    pub const fn score_multiplier(self) -> f64 {
        match self {
            Importance::Critical => 4.0,
            Importance::High => 2.0,
            Importance::Normal => 1.0,
            Importance::Low => 0.5,
        }
    }

    pub const fn ttl_multiplier(self) -> f64 {
        match self {
            Importance::Critical => 3.0,
            Importance::High => 2.0,
            Importance::Normal => 1.0,
            Importance::Low => 0.5,
        }
    }
}

/// Options for one insert or compute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Base TTL; the cache default applies when `None`.
    pub ttl: Option<Duration>,
    pub importance: Importance,
}

impl CacheOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// TTL after the importance multiplier, in milliseconds.
    pub(crate) fn effective_ttl_ms(&self, default_ttl: Duration) -> u64 {
        let base = self.ttl.unwrap_or(default_ttl).as_millis() as f64;
        (base * self.importance.ttl_multiplier()).max(1.0) as u64
    }
}

/// One cached value plus its bookkeeping.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub key: CacheKey,
    pub value: V,
    pub created_at_ms: u64,
    pub ttl_ms: u64,
    pub access_count: u64,
    pub last_access_ms: u64,
    pub size_bytes: usize,
    pub importance: Importance,
}

impl<V> CacheEntry<V> {
    /// Expired once strictly more than `ttl` has elapsed since creation.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.ttl_ms
    }

    /// Eviction score; the lowest score is evicted first.
    ///
    /// `importance * (ln(1 + hits) + 1 / (1 + idle_secs) + max(0, 1 - age / ttl))`
    ///
    /// Every term is non-negative so the importance multiplier always ranks
    /// a more important entry above an otherwise equal one.
    pub fn score(&self, now_ms: u64) -> f64 {
        let frequency = (1.0 + self.access_count as f64).ln();
        let idle_secs = now_ms.saturating_sub(self.last_access_ms) as f64 / 1_000.0;
        let recency = 1.0 / (1.0 + idle_secs);
        let age = now_ms.saturating_sub(self.created_at_ms) as f64;
        let freshness = (1.0 - age / self.ttl_ms.max(1) as f64).max(0.0);
        self.importance.score_multiplier() * (frequency + recency + freshness)
    }

    pub(crate) fn touch(&mut self, now_ms: u64) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_access_ms = now_ms;
    }
}
