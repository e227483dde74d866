//! The generic action engine.
//!
//! One engine runs all seven actions. Each invocation walks the same phases:
//!
//! ```text
//! idle -> discovering -> analyzing -> (overriding) -> filtering -> applying -> cached
//!                                                                               |
//!                                                                           reverted
//! ```
//!
//! Everything action-specific comes from the [`ActionProfile`] for the
//! context's action and from the shared transition table.
mod analysis;
mod builder;
mod capabilities;
mod discovery;
mod geometry;
mod transaction;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use stealth_core::{
    ActionProfile, Anchor, EntityId, OutcomeRecord, SceneEntity, TransitionTable,
};
use tokio::sync::Mutex as AsyncMutex;

pub use builder::EngineBuilder;
pub use capabilities::Capabilities;
pub use geometry::PairGeometry;

use crate::api::{ActionContext, EngineError, Result};
use crate::cache::{CacheStats, PositionCache};
use crate::config::StealthSettings;
use crate::workers::SweeperHandle;

/// Orchestrates discovery, analysis, apply and revert for every action.
pub struct ActionEngine {
    caps: Capabilities,
    table: TransitionTable,
    geometry: Arc<PositionCache<PairGeometry>>,
    observer_locks: Mutex<HashMap<EntityId, Arc<AsyncMutex<()>>>>,
    _sweeper: Option<SweeperHandle>,
}

/// Resolved inputs shared by the phases of one invocation.
pub(crate) struct Invocation<'a> {
    pub(crate) ctx: &'a ActionContext,
    pub(crate) profile: &'static ActionProfile,
    pub(crate) settings: StealthSettings,
    pub(crate) actor: SceneEntity,
    pub(crate) anchor: SceneEntity,
    pub(crate) in_combat: bool,
}

impl ActionEngine {
    /// Create a new engine builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn geometry_cache(&self) -> &PositionCache<PairGeometry> {
        &self.geometry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.geometry.stats()
    }

    /// Runs discovery, analysis and override merge without writing anything.
    pub async fn preview(&self, ctx: &ActionContext) -> Result<Vec<OutcomeRecord>> {
        let inv = self.prepare(ctx)?;
        let mut records = self.analyze_all(&inv).await?;
        Self::merge_overrides(ctx, &mut records);
        Ok(records)
    }

    /// Drops cached geometry involving `entity`. Call after it moves.
    pub fn notify_entity_moved(&self, entity: &EntityId) -> usize {
        self.geometry.invalidate(entity)
    }

    fn prepare<'a>(&self, ctx: &'a ActionContext) -> Result<Invocation<'a>> {
        let profile = ActionProfile::for_kind(ctx.action);
        let scene = self.caps.scene();

        let actor = scene
            .entity(&ctx.acting_entity)?
            .ok_or_else(|| EngineError::ActingEntityNotFound(ctx.acting_entity.clone()))?;
        let anchor = match profile.anchor {
            Anchor::Actor => actor.clone(),
            Anchor::PointedTarget => {
                let id = Self::anchor_id(ctx, profile)?;
                scene
                    .entity(&id)?
                    .ok_or(EngineError::AnchorNotFound(id))?
            }
        };

        Ok(Invocation {
            ctx,
            profile,
            settings: self.caps.settings.settings(),
            actor,
            anchor,
            in_combat: scene.in_combat(),
        })
    }

    /// Id of the entity on the fixed side of every pair.
    fn anchor_id(ctx: &ActionContext, profile: &ActionProfile) -> Result<EntityId> {
        match profile.anchor {
            Anchor::Actor => Ok(ctx.acting_entity.clone()),
            Anchor::PointedTarget => {
                ctx.point_target
                    .clone()
                    .ok_or(EngineError::AnchorRequired { action: ctx.action })
            }
        }
    }

    fn observer_lock(&self, observer: &EntityId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .observer_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(observer.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
