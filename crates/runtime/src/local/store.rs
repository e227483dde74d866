//! Perception maps held in memory.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use stealth_core::{EntityId, PerceptionMap, PerceptionState, StateChannel};

use crate::api::{CollaboratorError, CollaboratorResult, PerceptionStore};

/// Perception store backed by a hash map, with optional write failures for
/// exercising partial applies.
#[derive(Debug, Default)]
pub struct InMemoryPerceptionStore {
    maps: RwLock<HashMap<(EntityId, StateChannel), PerceptionMap>>,
    failing_writes: RwLock<HashSet<EntityId>>,
}

impl InMemoryPerceptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(entity: &EntityId) -> CollaboratorError {
        CollaboratorError::Store {
            entity: entity.clone(),
            message: "store lock was poisoned".into(),
        }
    }

    /// Sets one pair directly, bypassing the engine.
    pub fn seed(
        &self,
        observer: impl Into<EntityId>,
        target: impl Into<EntityId>,
        state: impl Into<PerceptionState>,
    ) -> CollaboratorResult<()> {
        let observer = observer.into();
        let state = state.into();
        let mut maps = self.maps.write().map_err(|_| Self::poisoned(&observer))?;
        maps.entry((observer.clone(), state.channel()))
            .or_insert_with(|| PerceptionMap::new(state.channel()))
            .set(target.into(), state);
        Ok(())
    }

    /// Current state of `observer -> target` on `channel`.
    pub fn state(
        &self,
        observer: &EntityId,
        target: &EntityId,
        channel: StateChannel,
    ) -> CollaboratorResult<PerceptionState> {
        let maps = self.maps.read().map_err(|_| Self::poisoned(observer))?;
        Ok(maps
            .get(&(observer.clone(), channel))
            .map(|map| map.get(target))
            .unwrap_or_else(|| channel.default_state()))
    }

    /// Makes every later `set_map` for `entity` fail.
    pub fn fail_writes_for(&self, entity: impl Into<EntityId>) {
        if let Ok(mut failing) = self.failing_writes.write() {
            failing.insert(entity.into());
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing_writes.write() {
            failing.clear();
        }
    }
}

#[async_trait]
impl PerceptionStore for InMemoryPerceptionStore {
    async fn get_map(
        &self,
        entity: &EntityId,
        channel: StateChannel,
    ) -> CollaboratorResult<PerceptionMap> {
        let maps = self.maps.read().map_err(|_| Self::poisoned(entity))?;
        Ok(maps
            .get(&(entity.clone(), channel))
            .cloned()
            .unwrap_or_else(|| PerceptionMap::new(channel)))
    }

    async fn set_map(&self, entity: &EntityId, map: PerceptionMap) -> CollaboratorResult<()> {
        let failing = self
            .failing_writes
            .read()
            .map_err(|_| Self::poisoned(entity))?
            .contains(entity);
        if failing {
            return Err(CollaboratorError::Store {
                entity: entity.clone(),
                message: "write rejected".into(),
            });
        }

        let mut maps = self.maps.write().map_err(|_| Self::poisoned(entity))?;
        maps.insert((entity.clone(), map.channel()), map);
        Ok(())
    }
}
