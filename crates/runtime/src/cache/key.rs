//! Cache keys for ordered entity pairs at specific positions.

use std::fmt;

use serde::{Deserialize, Serialize};
use stealth_core::{EntityId, Position, SceneEntity};

/// Ordered pair of entities with their truncated positions.
///
/// Moving either entity produces a different key, so stale geometry is never
/// served for a new position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub from: EntityId,
    pub from_cell: (i64, i64, i64),
    pub to: EntityId,
    pub to_cell: (i64, i64, i64),
}

impl CacheKey {
    pub fn new(from: EntityId, from_pos: Position, to: EntityId, to_pos: Position) -> Self {
        Self {
            from,
            from_cell: from_pos.truncated(),
            to,
            to_cell: to_pos.truncated(),
        }
    }

    pub fn for_pair(from: &SceneEntity, to: &SceneEntity) -> Self {
        Self::new(from.id.clone(), from.position, to.id.clone(), to.position)
    }

    /// True when either side of the pair is `entity`.
    pub fn involves(&self, entity: &EntityId) -> bool {
        &self.from == entity || &self.to == entity
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy, fz) = self.from_cell;
        let (tx, ty, tz) = self.to_cell;
        write!(
            f,
            "{}@{fx},{fy},{fz}->{}@{tx},{ty},{tz}",
            self.from.as_str(),
            self.to.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_unit_moves_share_a_key() {
        let a = CacheKey::new(
            EntityId::new("a"),
            Position::new(10.2, 5.9),
            EntityId::new("b"),
            Position::ORIGIN,
        );
        let b = CacheKey::new(
            EntityId::new("a"),
            Position::new(10.7, 5.1),
            EntityId::new("b"),
            Position::ORIGIN,
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "a@10,5,0->b@0,0,0");
    }

    #[test]
    fn pair_order_matters() {
        let a = CacheKey::new(
            EntityId::new("a"),
            Position::ORIGIN,
            EntityId::new("b"),
            Position::ORIGIN,
        );
        let b = CacheKey::new(
            EntityId::new("b"),
            Position::ORIGIN,
            EntityId::new("a"),
            Position::ORIGIN,
        );
        assert_ne!(a, b);
        assert!(a.involves(&EntityId::new("b")));
        assert!(!a.involves(&EntityId::new("c")));
    }
}
