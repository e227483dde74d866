//! Per-subject outcome analysis and override merging.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use stealth_core::{
    AnalysisError, ApplyDirection, CoverState, DifficultySource, EntityId, OutcomeRecord,
    PerceptionMap, RawPrerequisite, ResolvedRoll, SceneEntity, StateChannel, StealthError,
    VisibilityState, resolve_roll,
};
use tracing::{debug, warn};

use super::{ActionEngine, Invocation, PairGeometry};
use crate::api::{ActionContext, PerceptionStore, Result};
use crate::cache::CacheOptions;
use crate::config::StealthSettings;

/// Maps read during one invocation, so each observer is fetched once.
#[derive(Default)]
struct MapSnapshot {
    maps: HashMap<(EntityId, StateChannel), PerceptionMap>,
}

impl MapSnapshot {
    async fn load(
        &mut self,
        store: &dyn PerceptionStore,
        entity: &EntityId,
        channel: StateChannel,
    ) -> std::result::Result<&PerceptionMap, AnalysisError> {
        match self.maps.entry((entity.clone(), channel)) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let map = store.get_map(entity, channel).await.map_err(|err| {
                    debug!(entity = %entity, %err, "perception map read failed");
                    AnalysisError::StateUnavailable(entity.clone())
                })?;
                if map.channel() != channel {
                    return Err(AnalysisError::ChannelMismatch(entity.clone()));
                }
                Ok(slot.insert(map))
            }
        }
    }
}

impl ActionEngine {
    /// Discovers subjects and analyses each one. Subjects whose analysis fails
    /// are logged and left out.
    pub(crate) async fn analyze_all(&self, inv: &Invocation<'_>) -> Result<Vec<OutcomeRecord>> {
        debug!(action = %inv.ctx.action, phase = "discovering");
        let subjects = self.discover(inv)?;
        if subjects.is_empty() {
            return Ok(vec![]);
        }

        debug!(action = %inv.ctx.action, phase = "analyzing", subjects = subjects.len());
        if inv.profile.requires_roll && !inv.ctx.roll.as_ref().is_some_and(|r| r.is_valid()) {
            warn!(
                action = %inv.ctx.action,
                message = %inv.ctx.message_id,
                code = AnalysisError::InvalidRoll.error_code(),
                "roll data missing or malformed; outcomes degrade to unchanged failures"
            );
        }

        let scene = self.caps.scene.clone();
        let geometry = self
            .geometry
            .batch_preload(
                &inv.anchor,
                &subjects,
                |anchor, subject| PairGeometry::measure(scene.as_ref(), anchor, subject),
                CacheOptions::default(),
            )
            .await;

        let mut maps = MapSnapshot::default();
        let mut records = Vec::with_capacity(subjects.len());
        for subject in &subjects {
            let measured = match geometry.get(&subject.id) {
                Some(measured) => *measured,
                None => PairGeometry::measure(self.caps.scene(), &inv.anchor, subject),
            };
            match self.analyze_subject(inv, subject, measured, &mut maps).await {
                Ok(record) => records.push(record),
                Err(err) => warn!(
                    action = %inv.ctx.action,
                    subject = %subject.id,
                    code = err.error_code(),
                    %err,
                    "skipping subject"
                ),
            }
        }
        Ok(records)
    }

    async fn analyze_subject(
        &self,
        inv: &Invocation<'_>,
        subject: &SceneEntity,
        geometry: PairGeometry,
        maps: &mut MapSnapshot,
    ) -> std::result::Result<OutcomeRecord, AnalysisError> {
        let profile = inv.profile;
        let direction = profile.apply_direction;
        let (observer, target) = match direction {
            ApplyDirection::ObserverToTarget => (&inv.anchor, subject),
            ApplyDirection::TargetToObserver => (subject, &inv.anchor),
        };
        let store = self.caps.store.as_ref();

        let old_state = maps
            .load(store, &observer.id, profile.channel)
            .await?
            .get(&target.id);

        let checks_cover =
            profile.cover_bonus || profile.raw_prerequisite != RawPrerequisite::None;
        let cover = if checks_cover {
            let stored = maps
                .load(store, &observer.id, StateChannel::Cover)
                .await?
                .get(&target.id)
                .cover()
                .unwrap_or_default();
            stored.max(geometry.target_cover(direction))
        } else {
            CoverState::None
        };
        let bonus = if profile.cover_bonus {
            cover.stealth_bonus()
        } else {
            0
        };

        let difficulty = match profile.difficulty {
            DifficultySource::ObserverPerception => perception_dc(observer)? - bonus,
            DifficultySource::SubjectStealth => stealth_dc(target, &inv.settings)? + bonus,
            DifficultySource::None => 0,
        };

        let roll = if profile.requires_roll {
            resolve_roll(inv.ctx.roll.as_ref(), difficulty)
        } else {
            ResolvedRoll::automatic()
        };

        let mut new_state = if roll.valid {
            self.table.next_state(profile.kind, old_state, roll.degree)
        } else {
            old_state
        };

        if inv.settings.enforce_raw
            && profile.raw_prerequisite == RawPrerequisite::CoverOrConcealment
        {
            let concealed = old_state.visibility() == Some(VisibilityState::Concealed);
            let satisfied =
                cover >= CoverState::Standard || concealed || !geometry.line_of_sight;
            if !satisfied {
                debug!(
                    observer = %observer.id,
                    target = %target.id,
                    "prerequisite not met; outcome reported unchanged"
                );
                new_state = old_state;
            }
        }

        Ok(OutcomeRecord::new(
            subject.id.clone(),
            observer.id.clone(),
            target.id.clone(),
            old_state,
            new_state,
            &roll,
            geometry.distance,
        ))
    }

    /// Forces the overridden subjects to their requested state.
    pub(crate) fn merge_overrides(ctx: &ActionContext, records: &mut [OutcomeRecord]) {
        let Some(overrides) = &ctx.overrides else {
            return;
        };
        debug!(action = %ctx.action, phase = "overriding", overrides = overrides.len());
        for record in records.iter_mut() {
            if let Some(state) = overrides.get(&record.subject)
                && !record.apply_override(*state)
            {
                warn!(
                    action = %ctx.action,
                    subject = %record.subject,
                    %state,
                    "ignoring override on the wrong channel"
                );
            }
        }
    }
}

fn perception_dc(entity: &SceneEntity) -> std::result::Result<i32, AnalysisError> {
    entity
        .stats
        .map(|stats| stats.perception_dc)
        .ok_or_else(|| AnalysisError::MissingStatBlock(entity.id.clone()))
}

fn stealth_dc(
    entity: &SceneEntity,
    settings: &StealthSettings,
) -> std::result::Result<i32, AnalysisError> {
    match entity.stats {
        Some(stats) => Ok(stats.stealth_dc),
        None if entity.actor_type == stealth_core::ActorType::Wall => Ok(settings.default_wall_dc),
        None => Err(AnalysisError::MissingStatBlock(entity.id.clone())),
    }
}
