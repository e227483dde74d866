//! Outcome records, directed changes and ledger entries.
//!
//! A change is always expressed as `(observer, target)` because state lives
//! on the observer's map. Ledger entries only store the non-anchor side of
//! the pair plus its role; the anchor is recovered from the invocation when
//! reverting.

use crate::action::ApplyDirection;
use crate::outcome::{DegreeOfSuccess, ResolvedRoll};
use crate::state::{EntityId, PerceptionState};

/// Side of a directed pair that a ledger entry names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum PairRole {
    Observer,
    Target,
}

impl ApplyDirection {
    /// Orders `(anchor, subject)` into `(observer, target)`.
    pub fn pair<'a>(
        &self,
        anchor: &'a EntityId,
        subject: &'a EntityId,
    ) -> (&'a EntityId, &'a EntityId) {
        match self {
            ApplyDirection::ObserverToTarget => (anchor, subject),
            ApplyDirection::TargetToObserver => (subject, anchor),
        }
    }

    /// Role the subject plays in each pair.
    pub const fn subject_role(&self) -> PairRole {
        match self {
            ApplyDirection::ObserverToTarget => PairRole::Target,
            ApplyDirection::TargetToObserver => PairRole::Observer,
        }
    }
}

/// Result of analysing one subject. Never persisted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeRecord {
    pub subject: EntityId,
    pub observer: EntityId,
    pub target: EntityId,
    pub old_state: PerceptionState,
    pub new_state: PerceptionState,
    pub roll_total: i32,
    pub natural_die: Option<i32>,
    pub difficulty: i32,
    pub margin: i32,
    pub degree: DegreeOfSuccess,
    /// False when the roll was missing or malformed and the degree was
    /// degraded to a failure. Such records never changed state.
    pub roll_valid: bool,
    /// `new_state != old_state`; kept in sync by [`OutcomeRecord::apply_override`].
    pub changed: bool,
    pub override_state: Option<PerceptionState>,
    pub distance: f64,
}

impl OutcomeRecord {
    /// Builds a record from a resolved roll and the table lookup.
    pub fn new(
        subject: EntityId,
        observer: EntityId,
        target: EntityId,
        old_state: PerceptionState,
        new_state: PerceptionState,
        roll: &ResolvedRoll,
        distance: f64,
    ) -> Self {
        Self {
            subject,
            observer,
            target,
            old_state,
            new_state,
            roll_total: roll.total,
            natural_die: roll.natural_die,
            difficulty: roll.difficulty,
            margin: roll.margin,
            degree: roll.degree,
            roll_valid: roll.valid,
            changed: new_state != old_state,
            override_state: None,
            distance,
        }
    }

    /// Forces the new state. Returns `false` and leaves the record untouched
    /// when `state` is on another channel.
    pub fn apply_override(&mut self, state: PerceptionState) -> bool {
        if state.channel() != self.old_state.channel() {
            return false;
        }
        self.override_state = Some(state);
        self.new_state = state;
        self.changed = self.new_state != self.old_state;
        true
    }

    pub fn to_change(&self) -> PerceptionChange {
        PerceptionChange {
            observer: self.observer.clone(),
            target: self.target.clone(),
            new_state: self.new_state,
            old_state: Some(self.old_state),
        }
    }
}

/// A directed state write on the observer's map.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerceptionChange {
    pub observer: EntityId,
    pub target: EntityId,
    pub new_state: PerceptionState,
    /// State before the write, when known. Revert changes rebuilt from the
    /// ledger leave this empty.
    pub old_state: Option<PerceptionState>,
}

/// Minimal record needed to undo one change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerEntry {
    pub entity_id: EntityId,
    pub role: PairRole,
    pub old_state: PerceptionState,
}

/// Builds the ledger entry for an applied change.
///
/// Returns `None` when the change carries no prior state.
pub fn build_cache_entry_from_change(
    direction: ApplyDirection,
    change: &PerceptionChange,
) -> Option<LedgerEntry> {
    let old_state = change.old_state?;
    let role = direction.subject_role();
    let entity_id = match role {
        PairRole::Observer => change.observer.clone(),
        PairRole::Target => change.target.clone(),
    };
    Some(LedgerEntry {
        entity_id,
        role,
        old_state,
    })
}

/// Rebuilds the inverse changes for ledger entries written with `direction`.
///
/// Entries whose role does not match the direction were written by another
/// orientation and are skipped.
pub fn entries_to_revert_changes(
    direction: ApplyDirection,
    anchor: &EntityId,
    entries: &[LedgerEntry],
) -> Vec<PerceptionChange> {
    let role = direction.subject_role();
    entries
        .iter()
        .filter(|entry| entry.role == role)
        .map(|entry| {
            let (observer, target) = direction.pair(anchor, &entry.entity_id);
            PerceptionChange {
                observer: observer.clone(),
                target: target.clone(),
                new_state: entry.old_state,
                old_state: None,
            }
        })
        .collect()
}
