//! Perception state representation.
//!
//! This module owns the data structures that describe scene entities and the
//! directed perception relationships between them. The runtime reads these
//! through its collaborators and mutates persisted maps only through the
//! action engine.
mod common;
mod entity;
mod perception;

pub use common::{EntityId, Position};
pub use entity::{ActorType, ActorTypes, Alliance, SceneEntity, StatBlock};
pub use perception::{CoverState, PerceptionMap, PerceptionState, StateChannel, VisibilityState};
