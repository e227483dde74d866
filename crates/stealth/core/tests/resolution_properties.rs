//! Property tests for degree resolution and the transition table.

use proptest::prelude::*;
use stealth_core::{
    ActionKind, DegreeOfSuccess, NATURAL_MAX, NATURAL_MIN, RollData, VisibilityState, next_state,
    resolve_degree, resolve_roll,
};

fn visibility() -> impl Strategy<Value = VisibilityState> {
    prop_oneof![
        Just(VisibilityState::Observed),
        Just(VisibilityState::Concealed),
        Just(VisibilityState::Hidden),
        Just(VisibilityState::Undetected),
    ]
}

fn degree() -> impl Strategy<Value = DegreeOfSuccess> {
    prop_oneof![
        Just(DegreeOfSuccess::CriticalFailure),
        Just(DegreeOfSuccess::Failure),
        Just(DegreeOfSuccess::Success),
        Just(DegreeOfSuccess::CriticalSuccess),
    ]
}

proptest! {
    #[test]
    fn degree_is_monotonic_in_total(
        total in -50i32..80,
        natural in NATURAL_MIN..=NATURAL_MAX,
        difficulty in 0i32..50,
    ) {
        let lower = resolve_degree(total, natural, difficulty);
        let higher = resolve_degree(total + 1, natural, difficulty);
        prop_assert!(lower <= higher);
    }

    #[test]
    fn natural_die_moves_at_most_one_step(
        total in -50i32..80,
        natural in NATURAL_MIN..=NATURAL_MAX,
        difficulty in 0i32..50,
    ) {
        let base = DegreeOfSuccess::from_margin(total - difficulty);
        let adjusted = resolve_degree(total, natural, difficulty);
        prop_assert!((adjusted as i32 - base as i32).abs() <= 1);
    }

    #[test]
    fn missing_total_never_succeeds(difficulty in 0i32..50) {
        let resolved = resolve_roll(Some(&RollData::default()), difficulty);
        prop_assert_eq!(resolved.degree, DegreeOfSuccess::Failure);
        prop_assert_eq!(resolved.margin, -difficulty);
    }

    #[test]
    fn seek_never_hides_further(old in visibility(), degree in degree()) {
        let next = next_state(ActionKind::Seek, old.into(), degree);
        prop_assert!(next.rank() <= old as u8);
    }

    #[test]
    fn consequences_always_end_observed_or_concealed(old in visibility(), degree in degree()) {
        let next = next_state(ActionKind::Consequences, old.into(), degree);
        prop_assert!(next.rank() <= VisibilityState::Concealed as u8);
    }
}
