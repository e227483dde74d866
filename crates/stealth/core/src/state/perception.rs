//! Visibility and cover states for directed observer/subject pairs.

use std::collections::HashMap;
use std::fmt;

use super::common::EntityId;

/// How well an observer perceives a subject.
///
/// Ordered by stealth quality: `Observed < Concealed < Hidden < Undetected`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VisibilityState {
    #[default]
    Observed,
    Concealed,
    Hidden,
    Undetected,
}

/// Cover a subject enjoys against an observer.
///
/// Ordered by protection: `None < Lesser < Standard < Greater`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CoverState {
    #[default]
    None,
    Lesser,
    Standard,
    Greater,
}

impl CoverState {
    /// Circumstance bonus this cover grants to Stealth.
    pub const fn stealth_bonus(self) -> i32 {
        match self {
            Self::None | Self::Lesser => 0,
            Self::Standard => 2,
            Self::Greater => 4,
        }
    }
}

/// Which persisted map an action reads and writes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum StateChannel {
    Visibility,
    Cover,
}

impl StateChannel {
    /// State assumed for pairs missing from the map.
    pub const fn default_state(self) -> PerceptionState {
        match self {
            Self::Visibility => PerceptionState::Visibility(VisibilityState::Observed),
            Self::Cover => PerceptionState::Cover(CoverState::None),
        }
    }
}

/// A state on either channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "channel", content = "state", rename_all = "snake_case"))]
pub enum PerceptionState {
    Visibility(VisibilityState),
    Cover(CoverState),
}

impl PerceptionState {
    pub const fn channel(self) -> StateChannel {
        match self {
            Self::Visibility(_) => StateChannel::Visibility,
            Self::Cover(_) => StateChannel::Cover,
        }
    }

    pub const fn visibility(self) -> Option<VisibilityState> {
        match self {
            Self::Visibility(v) => Some(v),
            Self::Cover(_) => None,
        }
    }

    pub const fn cover(self) -> Option<CoverState> {
        match self {
            Self::Cover(c) => Some(c),
            Self::Visibility(_) => None,
        }
    }

    /// Position in the channel's total order (0 = least stealthy/protected).
    pub const fn rank(self) -> u8 {
        match self {
            Self::Visibility(v) => v as u8,
            Self::Cover(c) => c as u8,
        }
    }
}

impl From<VisibilityState> for PerceptionState {
    fn from(value: VisibilityState) -> Self {
        Self::Visibility(value)
    }
}

impl From<CoverState> for PerceptionState {
    fn from(value: CoverState) -> Self {
        Self::Cover(value)
    }
}

impl fmt::Display for PerceptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visibility(v) => write!(f, "{v}"),
            Self::Cover(c) => write!(f, "{c} cover"),
        }
    }
}

/// One observer's persisted view of every other entity on a single channel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerceptionMap {
    channel: StateChannel,
    entries: HashMap<EntityId, PerceptionState>,
}

impl PerceptionMap {
    pub fn new(channel: StateChannel) -> Self {
        Self {
            channel,
            entries: HashMap::new(),
        }
    }

    pub fn channel(&self) -> StateChannel {
        self.channel
    }

    /// Returns the stored state, or the channel default when absent.
    pub fn get(&self, target: &EntityId) -> PerceptionState {
        self.entries
            .get(target)
            .copied()
            .unwrap_or_else(|| self.channel.default_state())
    }

    /// Stores a state. Default states are removed instead of stored.
    ///
    /// Returns `false` if the state belongs to another channel.
    pub fn set(&mut self, target: EntityId, state: PerceptionState) -> bool {
        if state.channel() != self.channel {
            return false;
        }
        if state == self.channel.default_state() {
            self.entries.remove(&target);
        } else {
            self.entries.insert(target, state);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &PerceptionState)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_order_follows_stealth_quality() {
        assert!(VisibilityState::Observed < VisibilityState::Concealed);
        assert!(VisibilityState::Concealed < VisibilityState::Hidden);
        assert!(VisibilityState::Hidden < VisibilityState::Undetected);
    }

    #[test]
    fn cover_order_follows_protection() {
        assert!(CoverState::None < CoverState::Lesser);
        assert!(CoverState::Standard < CoverState::Greater);
        assert_eq!(CoverState::Greater.stealth_bonus(), 4);
    }

    #[test]
    fn map_defaults_missing_entries() {
        let map = PerceptionMap::new(StateChannel::Visibility);
        assert_eq!(
            map.get(&EntityId::new("x")),
            PerceptionState::Visibility(VisibilityState::Observed)
        );
    }

    #[test]
    fn map_rejects_other_channel() {
        let mut map = PerceptionMap::new(StateChannel::Visibility);
        assert!(!map.set(EntityId::new("x"), CoverState::Standard.into()));
        assert!(map.is_empty());
    }

    #[test]
    fn setting_default_removes_entry() {
        let mut map = PerceptionMap::new(StateChannel::Cover);
        let id = EntityId::new("x");
        map.set(id.clone(), CoverState::Standard.into());
        assert_eq!(map.len(), 1);
        map.set(id.clone(), CoverState::None.into());
        assert!(map.is_empty());
        assert_eq!(map.get(&id), PerceptionState::Cover(CoverState::None));
    }
}
