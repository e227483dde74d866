//! Effect and visual collaborators that only record what they were asked.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use stealth_core::{EntityId, PerceptionState};

use crate::api::{CollaboratorError, CollaboratorResult, EffectApplier, VisualRefresher};

/// One `apply_derived_effect` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedEffect {
    pub subject: EntityId,
    pub source: EntityId,
    pub state: PerceptionState,
}

/// Effect applier that records calls and can reject chosen subjects.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    calls: Mutex<Vec<DerivedEffect>>,
    failing: Mutex<HashSet<EntityId>>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DerivedEffect> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn fail_for(&self, subject: impl Into<EntityId>) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject.into());
    }
}

#[async_trait]
impl EffectApplier for RecordingEffects {
    async fn apply_derived_effect(
        &self,
        subject: &EntityId,
        source: &EntityId,
        state: PerceptionState,
    ) -> CollaboratorResult<()> {
        let rejected = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(subject);
        if rejected {
            return Err(CollaboratorError::Effect {
                subject: subject.clone(),
                message: "effect rejected".into(),
            });
        }

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DerivedEffect {
                subject: subject.clone(),
                source: source.clone(),
                state,
            });
        Ok(())
    }
}

/// Visual refresher that does nothing but count calls.
#[derive(Debug, Default)]
pub struct NoopVisuals {
    refreshes: AtomicUsize,
}

impl NoopVisuals {
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl VisualRefresher for NoopVisuals {
    async fn refresh_entity_visuals(&self) -> CollaboratorResult<()> {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
