#![allow(dead_code)]

use std::sync::Arc;

use stealth_core::{ActorType, Alliance, Position, SceneEntity, StatBlock};
use stealth_runtime::{
    ActionEngine, EngineConfig, InMemoryLedger, InMemoryPerceptionStore, InMemoryScene,
    LedgerRepository, NoopVisuals, RecordingEffects, StealthSettings,
};

pub const ROGUE: &str = "rogue";
pub const CLERIC: &str = "cleric";
pub const GUARD: &str = "guard";
pub const ARCHER: &str = "archer";
pub const CHEST: &str = "chest";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Party rogue at the origin with a cleric ally, two opposing NPCs and a
/// chest. Listed out of distance order so Seek sorting is observable.
pub fn party_scene() -> Vec<SceneEntity> {
    vec![
        SceneEntity::new(ARCHER, ActorType::Npc, Position::new(20.0, 0.0))
            .with_alliance(Alliance::Opposition)
            .with_stats(StatBlock::new(12, 16)),
        SceneEntity::new(GUARD, ActorType::Npc, Position::new(10.0, 0.0))
            .with_alliance(Alliance::Opposition)
            .with_stats(StatBlock::new(15, 15)),
        SceneEntity::new(CHEST, ActorType::Loot, Position::new(3.0, 0.0)),
        SceneEntity::new(CLERIC, ActorType::Character, Position::new(5.0, 0.0))
            .with_alliance(Alliance::Party)
            .with_stats(StatBlock::new(16, 12)),
        SceneEntity::new(ROGUE, ActorType::Character, Position::ORIGIN)
            .with_alliance(Alliance::Party)
            .with_stats(StatBlock::new(14, 18)),
    ]
}

pub struct Table {
    pub engine: ActionEngine,
    pub scene: Arc<InMemoryScene>,
    pub store: Arc<InMemoryPerceptionStore>,
    pub effects: Arc<RecordingEffects>,
    pub visuals: Arc<NoopVisuals>,
    pub ledger: Arc<dyn LedgerRepository>,
}

impl Table {
    pub fn new() -> Self {
        Self::with(StealthSettings::default(), Arc::new(InMemoryLedger::new()))
    }

    pub fn with_settings(settings: StealthSettings) -> Self {
        Self::with(settings, Arc::new(InMemoryLedger::new()))
    }

    pub fn with(settings: StealthSettings, ledger: Arc<dyn LedgerRepository>) -> Self {
        init_tracing();
        let scene = Arc::new(InMemoryScene::new(party_scene()));
        let store = Arc::new(InMemoryPerceptionStore::new());
        let effects = Arc::new(RecordingEffects::new());
        let visuals = Arc::new(NoopVisuals::default());

        let engine = ActionEngine::builder()
            .config(EngineConfig {
                enable_sweeper: false,
                ..EngineConfig::default()
            })
            .store(store.clone())
            .effects(effects.clone())
            .visuals(visuals.clone())
            .scene(scene.clone())
            .settings(Arc::new(settings))
            .ledger(ledger.clone())
            .build()
            .expect("engine should build");

        Self {
            engine,
            scene,
            store,
            effects,
            visuals,
            ledger,
        }
    }
}
