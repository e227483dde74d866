//! Engine configuration structures and loaders.
//!
//! [`StealthSettings`] holds the rules toggles a table can change between
//! invocations; [`CacheConfig`] and [`EngineConfig`] size the runtime itself.
//! Every struct has sensible defaults and an environment loader.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::SettingsProvider;

/// Rules toggles read at the start of every invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StealthSettings {
    /// Apply `combat_range` while an encounter is running.
    pub limit_range_in_combat: bool,
    pub combat_range: f64,
    /// Apply `non_combat_range` outside encounters.
    pub limit_range_out_of_combat: bool,
    pub non_combat_range: f64,
    /// Drop the actor's allies from the subject set.
    pub ignore_allies: bool,
    /// Enforce rules-as-written prerequisites (Hide needs cover or concealment).
    pub enforce_raw: bool,
    /// Let Seek discover hidden walls.
    pub wall_stealth: bool,
    /// Stealth DC used for walls without a stat block.
    pub default_wall_dc: i32,
}

impl Default for StealthSettings {
    fn default() -> Self {
        Self {
            limit_range_in_combat: false,
            combat_range: 30.0,
            limit_range_out_of_combat: false,
            non_combat_range: 30.0,
            ignore_allies: false,
            enforce_raw: false,
            wall_stealth: false,
            default_wall_dc: 15,
        }
    }
}

impl StealthSettings {
    /// Construct settings from process environment variables.
    ///
    /// Environment variables:
    /// - `STEALTH_LIMIT_RANGE_IN_COMBAT` / `STEALTH_COMBAT_RANGE` (default: false / 30)
    /// - `STEALTH_LIMIT_RANGE_OUT_OF_COMBAT` / `STEALTH_NON_COMBAT_RANGE` (default: false / 30)
    /// - `STEALTH_IGNORE_ALLIES` (default: false)
    /// - `STEALTH_ENFORCE_RAW` (default: false)
    /// - `STEALTH_WALL_STEALTH` / `STEALTH_DEFAULT_WALL_DC` (default: false / 15)
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Some(limit) = read_env_bool("STEALTH_LIMIT_RANGE_IN_COMBAT") {
            settings.limit_range_in_combat = limit;
        }
        if let Some(range) = read_env::<f64>("STEALTH_COMBAT_RANGE") {
            settings.combat_range = range.max(0.0);
        }
        if let Some(limit) = read_env_bool("STEALTH_LIMIT_RANGE_OUT_OF_COMBAT") {
            settings.limit_range_out_of_combat = limit;
        }
        if let Some(range) = read_env::<f64>("STEALTH_NON_COMBAT_RANGE") {
            settings.non_combat_range = range.max(0.0);
        }
        if let Some(ignore) = read_env_bool("STEALTH_IGNORE_ALLIES") {
            settings.ignore_allies = ignore;
        }
        if let Some(raw) = read_env_bool("STEALTH_ENFORCE_RAW") {
            settings.enforce_raw = raw;
        }
        if let Some(walls) = read_env_bool("STEALTH_WALL_STEALTH") {
            settings.wall_stealth = walls;
        }
        if let Some(dc) = read_env::<i32>("STEALTH_DEFAULT_WALL_DC") {
            settings.default_wall_dc = dc;
        }

        settings
    }

    /// Maximum subject distance for the current scene state, if limited.
    pub fn range_limit(&self, in_combat: bool) -> Option<f64> {
        match in_combat {
            true if self.limit_range_in_combat => Some(self.combat_range),
            false if self.limit_range_out_of_combat => Some(self.non_combat_range),
            _ => None,
        }
    }
}

impl SettingsProvider for StealthSettings {
    fn settings(&self) -> StealthSettings {
        self.clone()
    }
}

/// Sizing and expiry policy of the position/result cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Hard cap on entry count.
    pub max_entries: usize,
    /// Soft cap on the estimated payload size.
    pub max_bytes: usize,
    pub default_ttl: Duration,
    /// Minimum time between opportunistic sweeps, and the sweeper's period.
    pub sweep_interval: Duration,
    /// Entries computed per chunk by `batch_preload`.
    pub preload_chunk_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 2_000,
            max_bytes: 4 * 1024 * 1024,
            default_ttl: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(10),
            preload_chunk_size: 32,
        }
    }
}

impl CacheConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `STEALTH_CACHE_MAX_ENTRIES` (default: 2000)
    /// - `STEALTH_CACHE_MAX_BYTES` (default: 4 MiB)
    /// - `STEALTH_CACHE_TTL_MS` (default: 30000)
    /// - `STEALTH_CACHE_SWEEP_MS` (default: 10000)
    /// - `STEALTH_CACHE_PRELOAD_CHUNK` (default: 32)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(entries) = read_env::<usize>("STEALTH_CACHE_MAX_ENTRIES") {
            config.max_entries = entries.max(1);
        }
        if let Some(bytes) = read_env::<usize>("STEALTH_CACHE_MAX_BYTES") {
            config.max_bytes = bytes.max(1);
        }
        if let Some(ttl) = read_env::<u64>("STEALTH_CACHE_TTL_MS") {
            config.default_ttl = Duration::from_millis(ttl.max(1));
        }
        if let Some(interval) = read_env::<u64>("STEALTH_CACHE_SWEEP_MS") {
            config.sweep_interval = Duration::from_millis(interval.max(1));
        }
        if let Some(chunk) = read_env::<usize>("STEALTH_CACHE_PRELOAD_CHUNK") {
            config.preload_chunk_size = chunk.max(1);
        }

        config
    }
}

/// Configuration shared by the engine and its background worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    /// Spawn the periodic cache sweeper (requires a tokio runtime).
    pub enable_sweeper: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            enable_sweeper: true,
        }
    }
}

impl EngineConfig {
    /// Reads [`CacheConfig::from_env`] plus `STEALTH_CACHE_SWEEPER` (default: true).
    pub fn from_env() -> Self {
        let mut config = Self {
            cache: CacheConfig::from_env(),
            ..Self::default()
        };
        if let Some(enabled) = read_env_bool("STEALTH_CACHE_SWEEPER") {
            config.enable_sweeper = enabled;
        }
        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    parse_bool(&env::var(key).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_limit_follows_scene_state() {
        let settings = StealthSettings {
            limit_range_in_combat: true,
            combat_range: 60.0,
            ..StealthSettings::default()
        };
        assert_eq!(settings.range_limit(true), Some(60.0));
        assert_eq!(settings.range_limit(false), None);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn settings_serialize_round_trip() {
        let settings = StealthSettings {
            wall_stealth: true,
            default_wall_dc: 20,
            ..StealthSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: StealthSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
