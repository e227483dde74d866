//! Apply and revert for each action against an in-memory table.

mod common;

use common::*;
use stealth_core::{
    ActionKind, CoverState, DegreeOfSuccess, EntityId, PerceptionState, RollData, StateChannel,
    VisibilityState,
};
use stealth_runtime::{ActionContext, DerivedEffect, EngineError, LedgerKey};

fn id(raw: &str) -> EntityId {
    EntityId::new(raw)
}

fn visibility(table: &Table, observer: &str, target: &str) -> VisibilityState {
    table
        .store
        .state(&id(observer), &id(target), StateChannel::Visibility)
        .unwrap()
        .visibility()
        .unwrap()
}

fn cover(table: &Table, observer: &str, target: &str) -> CoverState {
    table
        .store
        .state(&id(observer), &id(target), StateChannel::Cover)
        .unwrap()
        .cover()
        .unwrap()
}

#[tokio::test]
async fn seek_success_reveals_undetected_subject_as_hidden() {
    let table = Table::new();
    table.store.seed(ROGUE, GUARD, VisibilityState::Undetected).unwrap();
    let ctx = ActionContext::new(ActionKind::Seek, ROGUE, "msg-a").with_roll(RollData::d20(12, 18));

    let records = table.engine.preview(&ctx).await.unwrap();
    let guard = records.iter().find(|r| r.subject == id(GUARD)).unwrap();
    assert_eq!(guard.difficulty, 15);
    assert_eq!(guard.margin, 3);
    assert_eq!(guard.natural_die, Some(12));
    assert_eq!(guard.degree, DegreeOfSuccess::Success);
    assert_eq!(guard.new_state, VisibilityState::Hidden.into());
    assert!(guard.changed);

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 1);
    assert_eq!(visibility(&table, ROGUE, GUARD), VisibilityState::Hidden);
    assert_eq!(
        table.effects.calls(),
        vec![DerivedEffect {
            subject: id(GUARD),
            source: id(ROGUE),
            state: VisibilityState::Hidden.into(),
        }]
    );
    assert_eq!(table.visuals.refreshes(), 1);

    assert_eq!(table.engine.revert(&ctx).await.unwrap(), 1);
    assert_eq!(visibility(&table, ROGUE, GUARD), VisibilityState::Undetected);
    let key = LedgerKey::new("msg-a", ActionKind::Seek);
    assert!(!table.ledger.contains(&key).unwrap());
}

#[tokio::test]
async fn seek_critical_success_observes_hidden_subject() {
    let table = Table::new();
    table.store.seed(ROGUE, GUARD, VisibilityState::Hidden).unwrap();
    let ctx = ActionContext::new(ActionKind::Seek, ROGUE, "msg-b").with_roll(RollData::d20(17, 27));

    let records = table.engine.preview(&ctx).await.unwrap();
    let guard = records.iter().find(|r| r.subject == id(GUARD)).unwrap();
    assert_eq!(guard.degree, DegreeOfSuccess::CriticalSuccess);
    assert_eq!(guard.new_state, VisibilityState::Observed.into());
    assert!(guard.changed);

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 1);
    assert_eq!(visibility(&table, ROGUE, GUARD), VisibilityState::Observed);
}

#[tokio::test]
async fn override_back_to_old_state_suppresses_change() {
    let table = Table::new();
    table.store.seed(GUARD, ROGUE, VisibilityState::Undetected).unwrap();
    let plain = ActionContext::new(ActionKind::Sneak, ROGUE, "msg-c").with_roll(RollData::d20(8, 12));

    let records = table.engine.preview(&plain).await.unwrap();
    let guard = records.iter().find(|r| r.subject == id(GUARD)).unwrap();
    assert_eq!(guard.new_state, VisibilityState::Hidden.into());
    assert!(guard.changed);

    let ctx = plain.with_override(GUARD, VisibilityState::Undetected);
    let records = table.engine.preview(&ctx).await.unwrap();
    let guard = records.iter().find(|r| r.subject == id(GUARD)).unwrap();
    assert!(!guard.changed);
    assert_eq!(
        guard.override_state,
        Some(PerceptionState::Visibility(VisibilityState::Undetected))
    );

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 0);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Undetected);
    assert!(table.effects.calls().is_empty());
    assert!(
        !table
            .ledger
            .contains(&LedgerKey::new("msg-c", ActionKind::Sneak))
            .unwrap()
    );
}

#[tokio::test]
async fn override_restricts_apply_to_listed_subjects() {
    let table = Table::new();
    let ctx = ActionContext::new(ActionKind::Hide, ROGUE, "msg-o")
        .with_roll(RollData::d20(14, 20))
        .with_override(ARCHER, VisibilityState::Undetected);

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 1);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Undetected);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Observed);
}

#[tokio::test]
async fn wrong_channel_override_is_ignored() {
    let table = Table::new();
    let ctx = ActionContext::new(ActionKind::Hide, ROGUE, "msg-w")
        .with_roll(RollData::d20(14, 20))
        .with_override(GUARD, CoverState::Greater);

    let records = table.engine.preview(&ctx).await.unwrap();
    let guard = records.iter().find(|r| r.subject == id(GUARD)).unwrap();
    assert_eq!(guard.override_state, None);
    assert_eq!(guard.new_state, VisibilityState::Hidden.into());
}

#[tokio::test]
async fn partial_revert_restores_only_the_named_subject() {
    let table = Table::new();
    let ctx = ActionContext::new(ActionKind::Hide, ROGUE, "msg-d")
        .with_roll(RollData::d20(14, 20))
        .ignore_allies(true);
    let key = LedgerKey::new("msg-d", ActionKind::Hide);

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 2);
    assert_eq!(table.ledger.entries(&key).unwrap().len(), 2);

    let partial = ctx.clone().with_target_token(GUARD);
    assert_eq!(table.engine.revert(&partial).await.unwrap(), 1);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Observed);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Hidden);

    let remaining = table.ledger.entries(&key).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].entity_id, id(ARCHER));

    assert_eq!(table.engine.revert(&ctx).await.unwrap(), 1);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Observed);
    assert!(!table.ledger.contains(&key).unwrap());
}

#[tokio::test]
async fn natural_one_downgrades_sneak_failure() {
    let table = Table::new();
    table.store.seed(GUARD, ROGUE, VisibilityState::Hidden).unwrap();
    let ctx = ActionContext::new(ActionKind::Sneak, ROGUE, "msg-e").with_roll(RollData::d20(1, 12));

    let records = table.engine.preview(&ctx).await.unwrap();
    let guard = records.iter().find(|r| r.subject == id(GUARD)).unwrap();
    assert_eq!(guard.margin, -3);
    assert_eq!(guard.degree, DegreeOfSuccess::CriticalFailure);
    assert_eq!(guard.new_state, VisibilityState::Observed.into());
}

#[tokio::test]
async fn sneak_round_trip() {
    let table = Table::new();
    table.store.seed(GUARD, ROGUE, VisibilityState::Hidden).unwrap();
    table.store.seed(ARCHER, ROGUE, VisibilityState::Hidden).unwrap();
    let ctx = ActionContext::new(ActionKind::Sneak, ROGUE, "msg-s").with_roll(RollData::d20(15, 30));

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 2);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Undetected);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Undetected);

    assert_eq!(table.engine.revert(&ctx).await.unwrap(), 2);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Hidden);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Hidden);
}

#[tokio::test]
async fn create_diversion_round_trip() {
    let table = Table::new();
    let ctx = ActionContext::new(ActionKind::CreateDiversion, ROGUE, "msg-cd")
        .with_roll(RollData::d20(14, 20))
        .ignore_allies(true);

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 2);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Hidden);

    assert_eq!(table.engine.revert(&ctx).await.unwrap(), 2);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Observed);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Observed);
}

#[tokio::test]
async fn consequences_round_trip_without_roll() {
    let table = Table::new();
    table.store.seed(GUARD, ROGUE, VisibilityState::Hidden).unwrap();
    table.store.seed(ARCHER, ROGUE, VisibilityState::Undetected).unwrap();
    table.store.seed(CLERIC, ROGUE, VisibilityState::Concealed).unwrap();
    let ctx = ActionContext::new(ActionKind::Consequences, ROGUE, "msg-q");

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 2);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Observed);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Observed);
    assert_eq!(visibility(&table, CLERIC, ROGUE), VisibilityState::Concealed);

    assert_eq!(table.engine.revert(&ctx).await.unwrap(), 2);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Hidden);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Undetected);
}

#[tokio::test]
async fn take_cover_round_trip_on_cover_channel() {
    let table = Table::new();
    table.store.seed(ARCHER, ROGUE, CoverState::Standard).unwrap();
    let ctx = ActionContext::new(ActionKind::TakeCover, ROGUE, "msg-tc").ignore_allies(true);

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 2);
    assert_eq!(cover(&table, GUARD, ROGUE), CoverState::Standard);
    assert_eq!(cover(&table, ARCHER, ROGUE), CoverState::Greater);
    assert_eq!(visibility(&table, GUARD, ROGUE), VisibilityState::Observed);

    assert_eq!(table.engine.revert(&ctx).await.unwrap(), 2);
    assert_eq!(cover(&table, GUARD, ROGUE), CoverState::None);
    assert_eq!(cover(&table, ARCHER, ROGUE), CoverState::Standard);
}

#[tokio::test]
async fn point_out_anchors_on_the_pointed_target() {
    let table = Table::new();
    table.store.seed(ROGUE, GUARD, VisibilityState::Undetected).unwrap();
    let ctx = ActionContext::new(ActionKind::PointOut, CLERIC, "msg-p").pointing_at(GUARD);

    let records = table.engine.preview(&ctx).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].observer, id(ROGUE));
    assert_eq!(records[0].target, id(GUARD));

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 1);
    assert_eq!(visibility(&table, ROGUE, GUARD), VisibilityState::Hidden);
    assert_eq!(table.effects.calls()[0].subject, id(GUARD));
    assert_eq!(table.effects.calls()[0].source, id(ROGUE));

    assert_eq!(table.engine.revert(&ctx).await.unwrap(), 1);
    assert_eq!(visibility(&table, ROGUE, GUARD), VisibilityState::Undetected);
}

#[tokio::test]
async fn point_out_requires_a_target() {
    let table = Table::new();
    let ctx = ActionContext::new(ActionKind::PointOut, CLERIC, "msg-p2");

    let err = table.engine.apply(&ctx).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::AnchorRequired {
            action: ActionKind::PointOut
        }
    ));
}

#[tokio::test]
async fn missing_roll_applies_nothing() {
    let table = Table::new();
    let ctx = ActionContext::new(ActionKind::Hide, ROGUE, "msg-n");

    let records = table.engine.preview(&ctx).await.unwrap();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| !r.changed));
    assert!(records.iter().all(|r| r.degree == DegreeOfSuccess::Failure));

    assert_eq!(table.engine.apply(&ctx).await.unwrap(), 0);
    assert!(table.effects.calls().is_empty());
    assert_eq!(table.visuals.refreshes(), 0);
}

#[tokio::test]
async fn same_message_keeps_actions_apart() {
    let table = Table::new();
    table.store.seed(GUARD, ROGUE, VisibilityState::Hidden).unwrap();
    let hide = ActionContext::new(ActionKind::Hide, ROGUE, "msg-x")
        .with_roll(RollData::d20(14, 20))
        .ignore_allies(true);
    let cover_ctx = ActionContext::new(ActionKind::TakeCover, ROGUE, "msg-x").ignore_allies(true);

    assert_eq!(table.engine.apply(&hide).await.unwrap(), 1);
    assert_eq!(table.engine.apply(&cover_ctx).await.unwrap(), 2);

    assert_eq!(table.engine.revert(&cover_ctx).await.unwrap(), 2);
    assert_eq!(cover(&table, GUARD, ROGUE), CoverState::None);
    assert_eq!(visibility(&table, ARCHER, ROGUE), VisibilityState::Hidden);
    assert!(
        table
            .ledger
            .contains(&LedgerKey::new("msg-x", ActionKind::Hide))
            .unwrap()
    );
}
