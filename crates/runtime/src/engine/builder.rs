//! Builder for [`ActionEngine`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use stealth_core::TransitionTable;
use tracing::{info, warn};

use super::{ActionEngine, Capabilities};
use crate::api::{
    EffectApplier, EngineError, PerceptionStore, Result, SceneQuery, SettingsProvider,
    VisualRefresher,
};
use crate::cache::{Clock, PositionCache, SystemClock};
use crate::config::{EngineConfig, StealthSettings};
use crate::local::NoopVisuals;
use crate::repository::{InMemoryLedger, LedgerRepository};
use crate::workers::CacheSweeper;

/// Builder for [`ActionEngine`] with flexible configuration.
///
/// The perception store, effect applier and scene are required. Visuals
/// default to a no-op, settings to [`StealthSettings::default`], and the
/// ledger to an [`InMemoryLedger`].
pub struct EngineBuilder {
    config: EngineConfig,
    table: TransitionTable,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn PerceptionStore>>,
    effects: Option<Arc<dyn EffectApplier>>,
    visuals: Option<Arc<dyn VisualRefresher>>,
    scene: Option<Arc<dyn SceneQuery>>,
    settings: Option<Arc<dyn SettingsProvider>>,
    ledger: Option<Arc<dyn LedgerRepository>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            table: TransitionTable::STANDARD,
            clock: Arc::new(SystemClock),
            store: None,
            effects: None,
            visuals: None,
            scene: None,
            settings: None,
            ledger: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Clock used by the geometry cache.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets every collaborator at once.
    pub fn capabilities(mut self, caps: Capabilities) -> Self {
        self.store = Some(caps.store);
        self.effects = Some(caps.effects);
        self.visuals = Some(caps.visuals);
        self.scene = Some(caps.scene);
        self.settings = Some(caps.settings);
        self.ledger = Some(caps.ledger);
        self
    }

    pub fn store(mut self, store: Arc<dyn PerceptionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn effects(mut self, effects: Arc<dyn EffectApplier>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn visuals(mut self, visuals: Arc<dyn VisualRefresher>) -> Self {
        self.visuals = Some(visuals);
        self
    }

    pub fn scene(mut self, scene: Arc<dyn SceneQuery>) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn settings(mut self, settings: Arc<dyn SettingsProvider>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn LedgerRepository>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Builds the engine, spawning the cache sweeper when enabled and a tokio
    /// runtime is available.
    pub fn build(self) -> Result<ActionEngine> {
        let caps = Capabilities::new(
            self.store.ok_or(EngineError::MissingCapability("a perception store"))?,
            self.effects
                .ok_or(EngineError::MissingCapability("an effect applier"))?,
            self.visuals.unwrap_or_else(|| Arc::new(NoopVisuals::default())),
            self.scene.ok_or(EngineError::MissingCapability("a scene query"))?,
            self.settings
                .unwrap_or_else(|| Arc::new(StealthSettings::default())),
            self.ledger.unwrap_or_else(|| Arc::new(InMemoryLedger::new())),
        );

        let geometry = Arc::new(PositionCache::with_clock(
            self.config.cache.clone(),
            self.clock,
        ));

        let sweeper = if !self.config.enable_sweeper {
            None
        } else if tokio::runtime::Handle::try_current().is_ok() {
            Some(CacheSweeper::new(&geometry).spawn())
        } else {
            warn!("no tokio runtime available; cache sweeper disabled");
            None
        };

        info!(
            max_entries = self.config.cache.max_entries,
            max_bytes = self.config.cache.max_bytes,
            sweeper = sweeper.is_some(),
            "action engine ready"
        );

        Ok(ActionEngine {
            caps,
            table: self.table,
            geometry,
            observer_locks: Mutex::new(HashMap::new()),
            _sweeper: sweeper,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
