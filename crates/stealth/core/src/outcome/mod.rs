//! Outcome Resolver.
//!
//! Pure functions that turn a roll and a difficulty into a degree of success.
//! Nothing here errors: malformed rolls degrade to a `failure` outcome.
mod degree;
mod roll;

pub use degree::{
    CRITICAL_MARGIN, DegreeOfSuccess, NATURAL_MAX, NATURAL_MIN, ResolvedRoll, resolve_degree,
    resolve_roll,
};
pub use roll::{DieResult, DieTerm, RollData, RollTerm};
