//! Contracts for the systems the engine drives but does not own.
//!
//! The engine reads the scene, reads and writes per-observer perception maps,
//! and asks the host to derive combat effects from each changed pair. Hosts
//! plug in implementations through [`crate::engine::Capabilities`].
use async_trait::async_trait;

use stealth_core::{
    CoverState, EntityId, PerceptionMap, PerceptionState, SceneEntity, StateChannel,
};

use super::errors::CollaboratorResult;
use crate::config::StealthSettings;

/// Persistence of per-observer perception maps.
#[async_trait]
pub trait PerceptionStore: Send + Sync {
    /// Loads `entity`'s map for `channel`. Unknown entities yield an empty map.
    async fn get_map(
        &self,
        entity: &EntityId,
        channel: StateChannel,
    ) -> CollaboratorResult<PerceptionMap>;

    /// Replaces `entity`'s map on the map's channel.
    async fn set_map(&self, entity: &EntityId, map: PerceptionMap) -> CollaboratorResult<()>;
}

/// Host hook that derives combat modifiers from a perception state.
#[async_trait]
pub trait EffectApplier: Send + Sync {
    /// Called once per changed pair, after the observer's map was written.
    ///
    /// `subject` is the pair's target and `source` its observer.
    async fn apply_derived_effect(
        &self,
        subject: &EntityId,
        source: &EntityId,
        state: PerceptionState,
    ) -> CollaboratorResult<()>;
}

/// Best-effort visual refresh after a batch of writes.
#[async_trait]
pub trait VisualRefresher: Send + Sync {
    async fn refresh_entity_visuals(&self) -> CollaboratorResult<()>;
}

/// Read-only view of the scene.
pub trait SceneQuery: Send + Sync {
    /// All placed entities in scene order.
    fn entities(&self) -> CollaboratorResult<Vec<SceneEntity>>;

    fn entity(&self, id: &EntityId) -> CollaboratorResult<Option<SceneEntity>> {
        Ok(self.entities()?.into_iter().find(|entity| &entity.id == id))
    }

    /// Whether an encounter is currently running.
    fn in_combat(&self) -> bool;

    fn line_of_sight(&self, _from: &SceneEntity, _to: &SceneEntity) -> bool {
        true
    }

    /// Cover that terrain grants `to` against `from`.
    fn terrain_cover(&self, _from: &SceneEntity, _to: &SceneEntity) -> CoverState {
        CoverState::None
    }
}

/// Source of the current rules settings.
pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> StealthSettings;
}
