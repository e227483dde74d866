//! Public API surface of the runtime.
//!
//! This module re-exports the collaborator traits hosts implement, the
//! invocation context, and the error types returned by the engine.
mod collaborators;
mod context;
mod errors;

pub use collaborators::{
    EffectApplier, PerceptionStore, SceneQuery, SettingsProvider, VisualRefresher,
};
pub use context::ActionContext;
pub use errors::{CollaboratorError, CollaboratorResult, EngineError, RepositoryError, Result};
