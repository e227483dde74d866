//! Per-action configuration.
//!
//! The engine is generic; a profile is the only thing that tells it how Seek
//! differs from Hide. Profiles are `const` data and never change at runtime.

use crate::action::ActionKind;
use crate::state::{ActorTypes, StateChannel};

/// Which side of a directed pair the anchor entity sits on.
///
/// State is always stored on the observer's map, so this decides whose map
/// an action writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ApplyDirection {
    /// The anchor observes each subject (Seek).
    ObserverToTarget,
    /// Each subject observes the anchor (Hide, Sneak, ...).
    TargetToObserver,
}

/// Entity every pair is built around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Anchor {
    /// The acting entity.
    Actor,
    /// The entity named by the context's point target (Point Out).
    PointedTarget,
}

/// Where the difficulty of each pair comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DifficultySource {
    /// The observer's perception DC; the anchor is the one being perceived.
    ObserverPerception,
    /// The subject's stealth DC; the subject is the one being perceived.
    SubjectStealth,
    /// No roll is made.
    None,
}

/// How alliances narrow the candidate subjects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllianceRule {
    /// Drop the actor's allies when "ignore allies" is active.
    IgnorableAllies,
    /// Keep only the actor's allies, regardless of settings.
    AlliesOnly,
}

/// Rules-as-written precondition checked per pair when enforcement is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RawPrerequisite {
    None,
    /// The anchor needs standard cover or concealment against the observer.
    CoverOrConcealment,
}

/// Static description of one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionProfile {
    pub kind: ActionKind,
    pub channel: StateChannel,
    pub apply_direction: ApplyDirection,
    pub anchor: Anchor,
    pub difficulty: DifficultySource,
    /// Actor types never considered as subjects.
    pub excluded_types: ActorTypes,
    /// Whether wall subjects are admitted when wall stealth is enabled.
    pub admits_walls: bool,
    pub alliance_rule: AllianceRule,
    pub sort_by_distance: bool,
    pub requires_roll: bool,
    /// Whether cover between the pair adjusts the difficulty.
    pub cover_bonus: bool,
    pub raw_prerequisite: RawPrerequisite,
}

const CREATURES_ONLY: ActorTypes = ActorTypes::LOOT
    .union(ActorTypes::HAZARD)
    .union(ActorTypes::VEHICLE)
    .union(ActorTypes::WALL);

impl ActionProfile {
    pub const SEEK: ActionProfile = ActionProfile {
        kind: ActionKind::Seek,
        channel: StateChannel::Visibility,
        apply_direction: ApplyDirection::ObserverToTarget,
        anchor: Anchor::Actor,
        difficulty: DifficultySource::SubjectStealth,
        excluded_types: ActorTypes::VEHICLE.union(ActorTypes::WALL),
        admits_walls: true,
        alliance_rule: AllianceRule::IgnorableAllies,
        sort_by_distance: true,
        requires_roll: true,
        cover_bonus: true,
        raw_prerequisite: RawPrerequisite::None,
    };

    pub const HIDE: ActionProfile = ActionProfile {
        kind: ActionKind::Hide,
        channel: StateChannel::Visibility,
        apply_direction: ApplyDirection::TargetToObserver,
        anchor: Anchor::Actor,
        difficulty: DifficultySource::ObserverPerception,
        excluded_types: CREATURES_ONLY,
        admits_walls: false,
        alliance_rule: AllianceRule::IgnorableAllies,
        sort_by_distance: false,
        requires_roll: true,
        cover_bonus: true,
        raw_prerequisite: RawPrerequisite::CoverOrConcealment,
    };

    pub const SNEAK: ActionProfile = ActionProfile {
        kind: ActionKind::Sneak,
        raw_prerequisite: RawPrerequisite::None,
        ..Self::HIDE
    };

    pub const POINT_OUT: ActionProfile = ActionProfile {
        kind: ActionKind::PointOut,
        channel: StateChannel::Visibility,
        apply_direction: ApplyDirection::TargetToObserver,
        anchor: Anchor::PointedTarget,
        difficulty: DifficultySource::None,
        excluded_types: CREATURES_ONLY,
        admits_walls: false,
        alliance_rule: AllianceRule::AlliesOnly,
        sort_by_distance: false,
        requires_roll: false,
        cover_bonus: false,
        raw_prerequisite: RawPrerequisite::None,
    };

    pub const CREATE_DIVERSION: ActionProfile = ActionProfile {
        kind: ActionKind::CreateDiversion,
        cover_bonus: false,
        raw_prerequisite: RawPrerequisite::None,
        ..Self::HIDE
    };

    pub const CONSEQUENCES: ActionProfile = ActionProfile {
        kind: ActionKind::Consequences,
        channel: StateChannel::Visibility,
        apply_direction: ApplyDirection::TargetToObserver,
        anchor: Anchor::Actor,
        difficulty: DifficultySource::None,
        excluded_types: CREATURES_ONLY,
        admits_walls: false,
        alliance_rule: AllianceRule::IgnorableAllies,
        sort_by_distance: false,
        requires_roll: false,
        cover_bonus: false,
        raw_prerequisite: RawPrerequisite::None,
    };

    pub const TAKE_COVER: ActionProfile = ActionProfile {
        kind: ActionKind::TakeCover,
        channel: StateChannel::Cover,
        ..Self::CONSEQUENCES
    };

    /// Returns the built-in profile for `kind`.
    pub const fn for_kind(kind: ActionKind) -> &'static ActionProfile {
        match kind {
            ActionKind::Seek => &Self::SEEK,
            ActionKind::Hide => &Self::HIDE,
            ActionKind::Sneak => &Self::SNEAK,
            ActionKind::PointOut => &Self::POINT_OUT,
            ActionKind::CreateDiversion => &Self::CREATE_DIVERSION,
            ActionKind::Consequences => &Self::CONSEQUENCES,
            ActionKind::TakeCover => &Self::TAKE_COVER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ActorType;

    #[test]
    fn for_kind_round_trips() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionProfile::for_kind(kind).kind, kind);
        }
    }

    #[test]
    fn only_seek_anchors_as_observer() {
        for kind in ActionKind::ALL {
            let profile = ActionProfile::for_kind(kind);
            assert_eq!(
                profile.apply_direction == ApplyDirection::ObserverToTarget,
                kind == ActionKind::Seek
            );
        }
    }

    #[test]
    fn no_roll_actions_have_no_difficulty() {
        for kind in ActionKind::ALL {
            let profile = ActionProfile::for_kind(kind);
            assert_eq!(
                profile.requires_roll,
                profile.difficulty != DifficultySource::None
            );
        }
    }

    #[test]
    fn hide_and_take_cover_skip_loot_and_hazards() {
        for profile in [ActionProfile::HIDE, ActionProfile::TAKE_COVER] {
            assert!(profile.excluded_types.includes(ActorType::Loot));
            assert!(profile.excluded_types.includes(ActorType::Hazard));
            assert!(!profile.excluded_types.includes(ActorType::Npc));
        }
        assert!(!ActionProfile::SEEK.excluded_types.includes(ActorType::Hazard));
    }

    #[test]
    fn take_cover_writes_cover_channel() {
        assert_eq!(ActionProfile::TAKE_COVER.channel, StateChannel::Cover);
        assert_eq!(ActionProfile::POINT_OUT.anchor, Anchor::PointedTarget);
    }
}
