//! Roll payload as produced by the dice engine.

/// A single face result inside a die term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieResult {
    pub result: i32,
}

/// One die term, either with per-face results or only a total.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieTerm {
    #[cfg_attr(feature = "serde", serde(default))]
    pub total: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub results: Vec<DieResult>,
}

/// A generic roll term (dice or numeric modifier).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollTerm {
    #[cfg_attr(feature = "serde", serde(default))]
    pub total: Option<i32>,
}

/// Roll data attached to an action context.
///
/// Every field is optional so partially-populated payloads still parse; the
/// resolver decides what is usable.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollData {
    #[cfg_attr(feature = "serde", serde(default))]
    pub total: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dice: Vec<DieTerm>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub terms: Vec<RollTerm>,
}

impl RollData {
    /// A d20 roll with its natural result and final total.
    pub fn d20(natural: i32, total: i32) -> Self {
        Self {
            total: Some(total),
            dice: vec![DieTerm {
                total: Some(natural),
                results: vec![DieResult { result: natural }],
            }],
            terms: Vec::new(),
        }
    }

    /// Natural die value: first die's first face, else first die's total,
    /// else first term's total.
    pub fn natural_die(&self) -> Option<i32> {
        let first_die = self.dice.first();
        first_die
            .and_then(|die| die.results.first().map(|r| r.result))
            .or_else(|| first_die.and_then(|die| die.total))
            .or_else(|| self.terms.first().and_then(|term| term.total))
    }

    /// A roll without a total cannot be resolved.
    pub fn is_valid(&self) -> bool {
        self.total.is_some()
    }
}
