//! Degree-of-success resolution.
//!
//! # Formula
//!
//! ```text
//! margin = total - difficulty
//! margin >=  10  -> critical success
//! margin >=   0  -> success
//! margin >= -10  -> failure
//! otherwise      -> critical failure
//! ```
//!
//! A natural 20 then upgrades a plain success, and a natural 1 downgrades a
//! plain failure. The adjustment moves exactly one step and never touches a
//! degree that is already critical.

use super::roll::RollData;

/// Highest face on the d20.
pub const NATURAL_MAX: i32 = 20;

/// Lowest face on the d20.
pub const NATURAL_MIN: i32 = 1;

/// Margin at which a result becomes critical in either direction.
pub const CRITICAL_MARGIN: i32 = 10;

/// Degree of success, ordered from worst to best.
#[derive(
    Clone,
    Copy,
    Debug,
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
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DegreeOfSuccess {
    CriticalFailure,
    Failure,
    Success,
    CriticalSuccess,
}

impl DegreeOfSuccess {
    /// Base degree from the margin alone.
    pub const fn from_margin(margin: i32) -> Self {
        if margin >= CRITICAL_MARGIN {
            Self::CriticalSuccess
        } else if margin >= 0 {
            Self::Success
        } else if margin >= -CRITICAL_MARGIN {
            Self::Failure
        } else {
            Self::CriticalFailure
        }
    }
}

/// Resolves the degree of success for a check.
pub fn resolve_degree(total: i32, natural_die: i32, difficulty: i32) -> DegreeOfSuccess {
    let base = DegreeOfSuccess::from_margin(total.saturating_sub(difficulty));
    match (base, natural_die) {
        (DegreeOfSuccess::Success, NATURAL_MAX) => DegreeOfSuccess::CriticalSuccess,
        (DegreeOfSuccess::Failure, NATURAL_MIN) => DegreeOfSuccess::CriticalFailure,
        (degree, _) => degree,
    }
}

/// Result of resolving a roll against one difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedRoll {
    pub total: i32,
    pub natural_die: Option<i32>,
    pub difficulty: i32,
    pub margin: i32,
    pub degree: DegreeOfSuccess,
    /// False when the roll data was missing or malformed.
    pub valid: bool,
}

impl ResolvedRoll {
    /// Degraded result for unusable roll data.
    pub const fn degraded(difficulty: i32) -> Self {
        Self {
            total: 0,
            natural_die: None,
            difficulty,
            margin: -difficulty,
            degree: DegreeOfSuccess::Failure,
            valid: false,
        }
    }

    /// Result used by actions that make no roll.
    pub const fn automatic() -> Self {
        Self {
            total: 0,
            natural_die: None,
            difficulty: 0,
            margin: 0,
            degree: DegreeOfSuccess::Success,
            valid: true,
        }
    }
}

/// Resolves optional roll data; never fails.
///
/// Missing data, or data without a total, yields [`ResolvedRoll::degraded`].
/// Without a natural die the margin alone decides the degree.
pub fn resolve_roll(roll: Option<&RollData>, difficulty: i32) -> ResolvedRoll {
    let Some(total) = roll.and_then(|r| r.total) else {
        return ResolvedRoll::degraded(difficulty);
    };
    let natural_die = roll.and_then(RollData::natural_die);
    let degree = match natural_die {
        Some(natural) => resolve_degree(total, natural, difficulty),
        None => DegreeOfSuccess::from_margin(total.saturating_sub(difficulty)),
    };
    ResolvedRoll {
        total,
        natural_die,
        difficulty,
        margin: total.saturating_sub(difficulty),
        degree,
        valid: true,
    }
}
