//! Async runtime for the stealth action engine.
//!
//! This crate drives the pure rules in `stealth-core` against a live scene:
//! it discovers subjects, resolves outcomes, writes perception maps through
//! host collaborators, and records every write in a message-scoped ledger so
//! the action can be reverted later.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the generic action engine and its builder
//! - [`api`] exposes the collaborator traits, invocation context and errors
//! - [`cache`] provides the position/result cache used for pair geometry
//! - [`repository`] stores the ledger in memory or on disk
//! - [`config`] loads settings from defaults and the environment
//! - [`local`] offers in-process collaborators for tests and tooling
//! - [`workers`] keeps background maintenance tasks
pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod local;
pub mod repository;
pub mod workers;

pub use api::{
    ActionContext, CollaboratorError, CollaboratorResult, EffectApplier, EngineError,
    PerceptionStore, Result, SceneQuery, SettingsProvider, VisualRefresher,
};
pub use cache::{
    CacheKey, CacheOptions, CacheStats, Clock, EvictionTarget, Importance, ManualClock,
    PositionCache, SystemClock,
};
pub use config::{CacheConfig, EngineConfig, StealthSettings};
pub use engine::{ActionEngine, Capabilities, EngineBuilder, PairGeometry};
pub use local::{
    DerivedEffect, InMemoryPerceptionStore, InMemoryScene, NoopVisuals, RecordingEffects,
};
pub use repository::{FileLedger, InMemoryLedger, LedgerKey, LedgerRepository, RepositoryError};
pub use workers::{CacheSweeper, SweeperHandle};
