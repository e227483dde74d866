//! The shared transition table.
//!
//! Every action resolves its new state through one data table keyed by
//! `(action, old state, degree)`. A key with no row leaves the state as is.

use crate::action::ActionKind;
use crate::outcome::DegreeOfSuccess;
use crate::state::{CoverState, PerceptionState, VisibilityState};

use DegreeOfSuccess::{CriticalFailure, CriticalSuccess, Failure, Success};

const ANY: &[DegreeOfSuccess] = &[CriticalSuccess, Success, Failure, CriticalFailure];
const SUCCESSES: &[DegreeOfSuccess] = &[CriticalSuccess, Success];
const FAILURES: &[DegreeOfSuccess] = &[Failure, CriticalFailure];

/// One row of the table: `from` becomes `to` on any degree in `on`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRow {
    pub action: ActionKind,
    pub from: PerceptionState,
    pub on: &'static [DegreeOfSuccess],
    pub to: PerceptionState,
}

impl TransitionRow {
    const fn vis(
        action: ActionKind,
        from: VisibilityState,
        on: &'static [DegreeOfSuccess],
        to: VisibilityState,
    ) -> Self {
        Self {
            action,
            from: PerceptionState::Visibility(from),
            on,
            to: PerceptionState::Visibility(to),
        }
    }

    const fn cover(
        action: ActionKind,
        from: CoverState,
        on: &'static [DegreeOfSuccess],
        to: CoverState,
    ) -> Self {
        Self {
            action,
            from: PerceptionState::Cover(from),
            on,
            to: PerceptionState::Cover(to),
        }
    }

    fn matches(&self, action: ActionKind, from: PerceptionState, degree: DegreeOfSuccess) -> bool {
        self.action == action && self.from == from && self.on.contains(&degree)
    }
}

static STANDARD_ROWS: &[TransitionRow] = {
    use ActionKind::*;
    use CoverState as C;
    use VisibilityState as V;
    &[
        TransitionRow::vis(Seek, V::Undetected, &[CriticalSuccess], V::Observed),
        TransitionRow::vis(Seek, V::Undetected, &[Success], V::Hidden),
        TransitionRow::vis(Seek, V::Hidden, SUCCESSES, V::Observed),
        TransitionRow::vis(Hide, V::Observed, SUCCESSES, V::Hidden),
        TransitionRow::vis(Hide, V::Concealed, SUCCESSES, V::Hidden),
        TransitionRow::vis(Hide, V::Concealed, &[CriticalFailure], V::Observed),
        TransitionRow::vis(Hide, V::Hidden, &[CriticalFailure], V::Observed),
        TransitionRow::vis(Sneak, V::Hidden, &[CriticalSuccess], V::Undetected),
        TransitionRow::vis(Sneak, V::Hidden, &[Success], V::Hidden),
        TransitionRow::vis(Sneak, V::Hidden, FAILURES, V::Observed),
        TransitionRow::vis(Sneak, V::Undetected, SUCCESSES, V::Undetected),
        TransitionRow::vis(Sneak, V::Undetected, &[Failure], V::Hidden),
        TransitionRow::vis(Sneak, V::Undetected, &[CriticalFailure], V::Observed),
        TransitionRow::vis(CreateDiversion, V::Observed, SUCCESSES, V::Hidden),
        TransitionRow::vis(CreateDiversion, V::Concealed, SUCCESSES, V::Hidden),
        TransitionRow::vis(PointOut, V::Undetected, ANY, V::Hidden),
        TransitionRow::vis(Consequences, V::Hidden, ANY, V::Observed),
        TransitionRow::vis(Consequences, V::Undetected, ANY, V::Observed),
        TransitionRow::cover(TakeCover, C::None, ANY, C::Standard),
        TransitionRow::cover(TakeCover, C::Lesser, ANY, C::Standard),
        TransitionRow::cover(TakeCover, C::Standard, ANY, C::Greater),
    ]
};

/// A transition table over a static slice of rows.
#[derive(Clone, Copy, Debug)]
pub struct TransitionTable {
    rows: &'static [TransitionRow],
}

impl TransitionTable {
    /// The table used by every built-in action.
    pub const STANDARD: TransitionTable = TransitionTable {
        rows: STANDARD_ROWS,
    };

    pub const fn from_rows(rows: &'static [TransitionRow]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &'static [TransitionRow] {
        self.rows
    }

    /// Looks up the new state; keys without a row return `old`.
    pub fn next_state(
        &self,
        action: ActionKind,
        old: PerceptionState,
        degree: DegreeOfSuccess,
    ) -> PerceptionState {
        self.rows
            .iter()
            .find(|row| row.matches(action, old, degree))
            .map(|row| row.to)
            .unwrap_or(old)
    }

    /// Finds the least stealthy state that `action` would turn into `current`
    /// on `degree`.
    ///
    /// Returns `None` when no row produces `current` from a different state.
    pub fn predecessor(
        &self,
        action: ActionKind,
        current: PerceptionState,
        degree: DegreeOfSuccess,
    ) -> Option<PerceptionState> {
        self.rows
            .iter()
            .filter(|row| {
                row.action == action
                    && row.to == current
                    && row.from != current
                    && row.on.contains(&degree)
            })
            .map(|row| row.from)
            .min_by_key(|state| state.rank())
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// [`TransitionTable::next_state`] on the standard table.
pub fn next_state(
    action: ActionKind,
    old: PerceptionState,
    degree: DegreeOfSuccess,
) -> PerceptionState {
    TransitionTable::STANDARD.next_state(action, old, degree)
}
