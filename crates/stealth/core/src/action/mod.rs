//! Action domain: the seven perception actions as data.
//!
//! The runtime runs one generic engine for every action. Everything that
//! differs between actions lives here as plain data:
//! - `kind`: the action enumeration
//! - `profile`: per-action configuration (orientation, difficulty source,
//!   discovery filters)
//! - `transition`: the single transition table shared by all actions
//! - `record`: outcome records, directed changes, and ledger entries

pub mod kind;
pub mod profile;
pub mod record;
pub mod transition;

pub use kind::ActionKind;
pub use profile::{
    ActionProfile, AllianceRule, Anchor, ApplyDirection, DifficultySource, RawPrerequisite,
};
pub use record::{
    LedgerEntry, OutcomeRecord, PairRole, PerceptionChange, build_cache_entry_from_change,
    entries_to_revert_changes,
};
pub use transition::{TransitionRow, TransitionTable, next_state};
