//! Scene held in memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use stealth_core::{CoverState, EntityId, Position, SceneEntity};

use crate::api::{CollaboratorResult, SceneQuery};

/// Mutable scene with optional per-pair terrain cover and sight blockers.
#[derive(Debug, Default)]
pub struct InMemoryScene {
    entities: RwLock<Vec<SceneEntity>>,
    in_combat: AtomicBool,
    cover: RwLock<HashMap<(EntityId, EntityId), CoverState>>,
    blocked_sight: RwLock<HashMap<(EntityId, EntityId), bool>>,
}

impl InMemoryScene {
    pub fn new(entities: impl IntoIterator<Item = SceneEntity>) -> Self {
        Self {
            entities: RwLock::new(entities.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Adds the entity, or replaces the one with the same id in place.
    pub fn upsert(&self, entity: SceneEntity) {
        let mut entities = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        match entities.iter_mut().find(|existing| existing.id == entity.id) {
            Some(existing) => *existing = entity,
            None => entities.push(entity),
        }
    }

    pub fn remove(&self, id: &EntityId) -> Option<SceneEntity> {
        let mut entities = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        let index = entities.iter().position(|entity| &entity.id == id)?;
        Some(entities.remove(index))
    }

    /// Moves an entity. Returns `false` if it is not on the scene.
    pub fn move_entity(&self, id: &EntityId, position: Position) -> bool {
        let mut entities = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        match entities.iter_mut().find(|entity| &entity.id == id) {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_in_combat(&self, in_combat: bool) {
        self.in_combat.store(in_combat, Ordering::Relaxed);
    }

    /// Terrain cover `to` has against `from`.
    pub fn set_terrain_cover(&self, from: &EntityId, to: &EntityId, cover: CoverState) {
        self.cover
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((from.clone(), to.clone()), cover);
    }

    /// Blocks line of sight in both directions.
    pub fn block_sight(&self, a: &EntityId, b: &EntityId) {
        let mut blocked = self
            .blocked_sight
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        blocked.insert((a.clone(), b.clone()), true);
        blocked.insert((b.clone(), a.clone()), true);
    }
}

impl SceneQuery for InMemoryScene {
    fn entities(&self) -> CollaboratorResult<Vec<SceneEntity>> {
        Ok(self
            .entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn in_combat(&self) -> bool {
        self.in_combat.load(Ordering::Relaxed)
    }

    fn line_of_sight(&self, from: &SceneEntity, to: &SceneEntity) -> bool {
        !self
            .blocked_sight
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(from.id.clone(), to.id.clone()))
    }

    fn terrain_cover(&self, from: &SceneEntity, to: &SceneEntity) -> CoverState {
        self.cover
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(from.id.clone(), to.id.clone()))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stealth_core::ActorType;

    #[test]
    fn upsert_replaces_in_place() {
        let scene = InMemoryScene::new([
            SceneEntity::new("a", ActorType::Character, Position::ORIGIN),
            SceneEntity::new("b", ActorType::Npc, Position::ORIGIN),
        ]);
        scene.upsert(SceneEntity::new("a", ActorType::Npc, Position::new(5.0, 0.0)));

        let entities = scene.entities().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].actor_type, ActorType::Npc);
        assert!(scene.move_entity(&EntityId::new("b"), Position::new(1.0, 1.0)));
        assert!(!scene.move_entity(&EntityId::new("zz"), Position::ORIGIN));
    }

    #[test]
    fn cover_is_directional() {
        let a = SceneEntity::new("a", ActorType::Character, Position::ORIGIN);
        let b = SceneEntity::new("b", ActorType::Npc, Position::ORIGIN);
        let scene = InMemoryScene::new([a.clone(), b.clone()]);
        scene.set_terrain_cover(&a.id, &b.id, CoverState::Standard);

        assert_eq!(scene.terrain_cover(&a, &b), CoverState::Standard);
        assert_eq!(scene.terrain_cover(&b, &a), CoverState::None);
    }
}
