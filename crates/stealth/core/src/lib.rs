//! Deterministic stealth rules shared by the runtime and offline tools.
//!
//! `stealth-core` defines the canonical rules for perception actions: the
//! perception state types, roll parsing, degree-of-success resolution, the
//! per-action transition table, and the action profiles that parameterise the
//! runtime's generic action engine. Everything here is pure: no I/O, no
//! clocks, no async.
pub mod action;
pub mod error;
pub mod outcome;
pub mod state;

pub use action::{
    ActionKind, ActionProfile, AllianceRule, Anchor, ApplyDirection, DifficultySource,
    LedgerEntry, OutcomeRecord, PairRole, PerceptionChange, RawPrerequisite, TransitionRow,
    TransitionTable, build_cache_entry_from_change, entries_to_revert_changes, next_state,
};
pub use error::{AnalysisError, ErrorSeverity, StealthError};
pub use outcome::{
    DegreeOfSuccess, DieResult, DieTerm, NATURAL_MAX, NATURAL_MIN, ResolvedRoll, RollData,
    RollTerm, resolve_degree, resolve_roll,
};
pub use state::{
    ActorType, ActorTypes, Alliance, CoverState, EntityId, PerceptionMap, PerceptionState,
    Position, SceneEntity, StatBlock, StateChannel, VisibilityState,
};
