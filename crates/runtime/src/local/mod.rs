//! In-process collaborator implementations.
//!
//! Useful for tests, tooling, and hosts that keep the whole scene in memory.
mod effects;
mod scene;
mod store;

pub use effects::{DerivedEffect, NoopVisuals, RecordingEffects};
pub use scene::InMemoryScene;
pub use store::InMemoryPerceptionStore;
