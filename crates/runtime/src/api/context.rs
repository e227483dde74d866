//! Per-invocation input handed to the engine by the chat/UI layer.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stealth_core::{ActionKind, EntityId, PerceptionState, RollData};

/// Everything one apply, revert, or preview call needs to know.
///
/// `message_id` is the transaction id: every ledger entry written by an
/// apply is keyed by it together with `action`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionContext {
    pub acting_entity: EntityId,
    pub action: ActionKind,
    #[serde(default)]
    pub roll: Option<RollData>,
    pub message_id: String,
    /// Forced outcomes keyed by subject id. When present, only these
    /// subjects are applied.
    #[serde(default)]
    pub overrides: Option<HashMap<EntityId, PerceptionState>>,
    /// Restricts a revert to one subject.
    #[serde(default)]
    pub target_token_id: Option<EntityId>,
    /// Beats the "ignore allies" setting when set.
    #[serde(default)]
    pub ignore_allies: Option<bool>,
    #[serde(default)]
    pub encounter_only: bool,
    /// The creature being pointed out (Point Out only).
    #[serde(default)]
    pub point_target: Option<EntityId>,
}

impl ActionContext {
    pub fn new(
        action: ActionKind,
        acting_entity: impl Into<EntityId>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            acting_entity: acting_entity.into(),
            action,
            roll: None,
            message_id: message_id.into(),
            overrides: None,
            target_token_id: None,
            ignore_allies: None,
            encounter_only: false,
            point_target: None,
        }
    }

    pub fn with_roll(mut self, roll: RollData) -> Self {
        self.roll = Some(roll);
        self
    }

    /// Adds one forced outcome, creating the override map if needed.
    pub fn with_override(
        mut self,
        subject: impl Into<EntityId>,
        state: impl Into<PerceptionState>,
    ) -> Self {
        self.overrides
            .get_or_insert_with(HashMap::new)
            .insert(subject.into(), state.into());
        self
    }

    pub fn with_target_token(mut self, subject: impl Into<EntityId>) -> Self {
        self.target_token_id = Some(subject.into());
        self
    }

    pub fn ignore_allies(mut self, ignore: bool) -> Self {
        self.ignore_allies = Some(ignore);
        self
    }

    pub fn encounter_only(mut self, encounter_only: bool) -> Self {
        self.encounter_only = encounter_only;
        self
    }

    pub fn pointing_at(mut self, target: impl Into<EntityId>) -> Self {
        self.point_target = Some(target.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stealth_core::VisibilityState;

    #[test]
    fn overrides_accumulate() {
        let ctx = ActionContext::new(ActionKind::Hide, "rogue", "msg-1")
            .with_override("guard", VisibilityState::Hidden)
            .with_override("archer", VisibilityState::Observed);
        let overrides = ctx.overrides.unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(
            overrides[&EntityId::new("guard")],
            PerceptionState::Visibility(VisibilityState::Hidden)
        );
    }

    #[test]
    fn deserializes_minimal_json() {
        let ctx: ActionContext = serde_json::from_str(
            r#"{"acting_entity":"rogue","action":"create_diversion","message_id":"m1"}"#,
        )
        .unwrap();
        assert_eq!(ctx.action, ActionKind::CreateDiversion);
        assert!(ctx.roll.is_none());
        assert!(!ctx.encounter_only);
    }
}
