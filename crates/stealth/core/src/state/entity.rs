//! Scene entity snapshots as returned by the scene query.

use bitflags::bitflags;

use super::common::{EntityId, Position};

/// Kind of placed entity.
///
/// Determines which actions consider the entity a candidate subject.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActorType {
    /// Player-controlled creature
    #[default]
    Character,
    /// Non-player creature
    Npc,
    /// Item pile or container
    Loot,
    /// Trap or environmental hazard
    Hazard,
    /// Vehicle
    Vehicle,
    /// Hidden wall segment that can be found by Seek
    Wall,
}

impl ActorType {
    /// The single-bit flag matching this type.
    pub const fn flag(self) -> ActorTypes {
        match self {
            Self::Character => ActorTypes::CHARACTER,
            Self::Npc => ActorTypes::NPC,
            Self::Loot => ActorTypes::LOOT,
            Self::Hazard => ActorTypes::HAZARD,
            Self::Vehicle => ActorTypes::VEHICLE,
            Self::Wall => ActorTypes::WALL,
        }
    }
}

bitflags! {
    /// Set of actor types, used for per-action exclusion lists.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActorTypes: u8 {
        const CHARACTER = 1 << 0;
        const NPC       = 1 << 1;
        const LOOT      = 1 << 2;
        const HAZARD    = 1 << 3;
        const VEHICLE   = 1 << 4;
        const WALL      = 1 << 5;
    }
}

impl ActorTypes {
    pub const fn includes(self, actor_type: ActorType) -> bool {
        self.contains(actor_type.flag())
    }
}

/// Alliance tag carried by every scene entity.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Alliance {
    /// The player party
    Party,
    /// Opposed to the party
    Opposition,
    /// Belongs to no side
    #[default]
    Neutral,
}

impl Alliance {
    /// Two entities are allies when they share a non-neutral alliance.
    pub fn is_allied_with(self, other: Alliance) -> bool {
        self == other && self != Alliance::Neutral
    }
}

/// Difficulty values exposed by an entity's stat block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    /// DC to notice this entity (10 + Perception modifier).
    pub perception_dc: i32,
    /// DC to find this entity when it hides (10 + Stealth modifier).
    pub stealth_dc: i32,
}

impl StatBlock {
    pub const fn new(perception_dc: i32, stealth_dc: i32) -> Self {
        Self {
            perception_dc,
            stealth_dc,
        }
    }
}

/// Read-only snapshot of a placed entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneEntity {
    pub id: EntityId,
    pub actor_type: ActorType,
    pub alliance: Alliance,
    pub position: Position,
    /// Whether the entity is a combatant in the active encounter.
    #[cfg_attr(feature = "serde", serde(default))]
    pub in_encounter: bool,
    /// `None` for entities without a usable stat block (walls without a DC, loot).
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: Option<StatBlock>,
}

impl SceneEntity {
    pub fn new(id: impl Into<EntityId>, actor_type: ActorType, position: Position) -> Self {
        Self {
            id: id.into(),
            actor_type,
            alliance: Alliance::Neutral,
            position,
            in_encounter: false,
            stats: None,
        }
    }

    pub fn with_alliance(mut self, alliance: Alliance) -> Self {
        self.alliance = alliance;
        self
    }

    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn in_encounter(mut self, in_encounter: bool) -> Self {
        self.in_encounter = in_encounter;
        self
    }

    pub fn distance_to(&self, other: &SceneEntity) -> f64 {
        self.position.distance_to(&other.position)
    }

    pub fn is_allied_with(&self, other: &SceneEntity) -> bool {
        self.alliance.is_allied_with(other.alliance)
    }
}
