//! Apply and revert.
//!
//! Changes are grouped by observer and each group is written under that
//! observer's lock: read map, set every pair, write map, record the ledger,
//! then derive effects. The map write is the commit point of a group. A
//! failure stops the call; groups already committed stay applied.

use std::collections::{HashMap, HashSet};

use stealth_core::{
    ActionProfile, ApplyDirection, EntityId, LedgerEntry, PerceptionChange, StateChannel,
    build_cache_entry_from_change, entries_to_revert_changes,
};
use tracing::{debug, error, info, warn};

use super::ActionEngine;
use crate::api::{ActionContext, CollaboratorError, EngineError, Result};
use crate::repository::LedgerKey;

impl ActionEngine {
    /// Applies the action and records undo entries under the message id.
    ///
    /// Returns the number of pairs written. An empty change set returns `0`
    /// without touching any collaborator.
    pub async fn apply(&self, ctx: &ActionContext) -> Result<usize> {
        let inv = self.prepare(ctx)?;
        let mut records = self.analyze_all(&inv).await?;
        Self::merge_overrides(ctx, &mut records);

        debug!(action = %ctx.action, phase = "filtering", records = records.len());
        let changes: Vec<PerceptionChange> = records
            .iter()
            .filter(|record| record.changed)
            .filter(|record| {
                ctx.overrides
                    .as_ref()
                    .is_none_or(|overrides| overrides.contains_key(&record.subject))
            })
            .map(|record| record.to_change())
            .collect();

        if changes.is_empty() {
            debug!(action = %ctx.action, message = %ctx.message_id, "nothing to apply");
            return Ok(0);
        }

        debug!(action = %ctx.action, phase = "applying", changes = changes.len());
        let key = LedgerKey::new(ctx.message_id.clone(), ctx.action);
        let applied = self
            .commit(inv.profile, Some(&key), changes)
            .await?;

        info!(
            action = %ctx.action,
            message = %ctx.message_id,
            applied,
            "applied perception changes"
        );
        Ok(applied)
    }

    /// Undoes an earlier apply of the same message and action.
    ///
    /// Ledger entries are the exact record. Without them the engine re-runs
    /// discovery and analysis and steps every pair back to the least stealthy
    /// state the action could have produced it from. That path is best effort
    /// and may not restore the prior state if the scene changed since.
    ///
    /// With `target_token_id` set only that subject is reverted and only its
    /// entries leave the ledger; otherwise the whole transaction is cleared.
    pub async fn revert(&self, ctx: &ActionContext) -> Result<usize> {
        let profile = ActionProfile::for_kind(ctx.action);
        let key = LedgerKey::new(ctx.message_id.clone(), ctx.action);
        let entries = self.caps.ledger().entries(&key)?;

        let reverted = if entries.is_empty() {
            self.revert_from_analysis(ctx).await?
        } else {
            self.revert_from_ledger(ctx, profile, &key, entries).await?
        };

        info!(
            action = %ctx.action,
            message = %ctx.message_id,
            reverted,
            "reverted perception changes"
        );
        Ok(reverted)
    }

    async fn revert_from_ledger(
        &self,
        ctx: &ActionContext,
        profile: &'static ActionProfile,
        key: &LedgerKey,
        entries: Vec<LedgerEntry>,
    ) -> Result<usize> {
        let anchor = Self::anchor_id(ctx, profile)?;
        let selected: Vec<LedgerEntry> = match &ctx.target_token_id {
            Some(subject) => entries
                .into_iter()
                .filter(|entry| &entry.entity_id == subject)
                .collect(),
            None => entries,
        };
        if selected.is_empty() {
            debug!(key = %key, "no ledger entries for the requested subject");
            return Ok(0);
        }

        let on_scene: HashSet<EntityId> = self
            .caps
            .scene()
            .entities()?
            .into_iter()
            .map(|entity| entity.id)
            .collect();

        // Newest first, so the oldest prior state lands last when a pair was
        // applied more than once.
        let mut resolvable = Vec::with_capacity(selected.len());
        for entry in selected.into_iter().rev() {
            if on_scene.contains(&entry.entity_id) && on_scene.contains(&anchor) {
                resolvable.push(entry);
            } else {
                warn!(
                    key = %key,
                    entity = %entry.entity_id,
                    "ledger entry references an entity no longer on the scene; skipping"
                );
            }
        }

        let changes = entries_to_revert_changes(profile.apply_direction, &anchor, &resolvable);
        let reverted = self.commit(profile, None, changes).await?;

        match &ctx.target_token_id {
            Some(subject) => {
                self.caps.ledger().remove_entity(key, subject)?;
            }
            None => self.caps.ledger().clear(key)?,
        }
        Ok(reverted)
    }

    async fn revert_from_analysis(&self, ctx: &ActionContext) -> Result<usize> {
        warn!(
            action = %ctx.action,
            message = %ctx.message_id,
            "no ledger entries; reverting from re-analysis (best effort)"
        );
        let inv = self.prepare(ctx)?;
        let records = self.analyze_all(&inv).await?;

        let changes: Vec<PerceptionChange> = records
            .into_iter()
            .filter(|record| record.roll_valid)
            .filter(|record| {
                ctx.target_token_id
                    .as_ref()
                    .is_none_or(|subject| &record.subject == subject)
            })
            .filter_map(|record| {
                let previous =
                    self.table
                        .predecessor(ctx.action, record.old_state, record.degree)?;
                Some(PerceptionChange {
                    observer: record.observer,
                    target: record.target,
                    new_state: previous,
                    old_state: Some(record.old_state),
                })
            })
            .collect();

        if changes.is_empty() {
            return Ok(0);
        }
        self.commit(inv.profile, None, changes).await
    }

    /// Writes the changes, then refreshes visuals if anything landed.
    async fn commit(
        &self,
        profile: &ActionProfile,
        ledger_key: Option<&LedgerKey>,
        changes: Vec<PerceptionChange>,
    ) -> Result<usize> {
        let result = self
            .write_grouped(profile.channel, profile.apply_direction, ledger_key, changes)
            .await;
        let committed = match &result {
            Ok(count) => *count,
            Err(err) => err.committed(),
        };
        if committed > 0 {
            self.refresh_visuals().await;
        }
        result
    }

    async fn write_grouped(
        &self,
        channel: StateChannel,
        direction: ApplyDirection,
        ledger_key: Option<&LedgerKey>,
        changes: Vec<PerceptionChange>,
    ) -> Result<usize> {
        let store = self.caps.store.as_ref();
        let mut committed = 0;

        for (observer, group) in group_by_observer(changes) {
            let lock = self.observer_lock(&observer);
            let _guard = lock.lock().await;

            let mut map = match store.get_map(&observer, channel).await {
                Ok(map) => map,
                Err(source) => return Err(external_failure(committed, source)),
            };

            let mut written = Vec::with_capacity(group.len());
            for mut change in group {
                change.old_state = Some(map.get(&change.target));
                if map.set(change.target.clone(), change.new_state) {
                    written.push(change);
                } else {
                    warn!(
                        observer = %observer,
                        target = %change.target,
                        state = %change.new_state,
                        "change is on another channel than the map; skipping"
                    );
                }
            }

            if let Err(source) = store.set_map(&observer, map).await {
                return Err(external_failure(committed, source));
            }

            if let Some(key) = ledger_key {
                let entries: Vec<LedgerEntry> = written
                    .iter()
                    .filter_map(|change| build_cache_entry_from_change(direction, change))
                    .collect();
                if let Err(err) = self.caps.ledger().append(key, &entries) {
                    error!(key = %key, observer = %observer, %err, "ledger write failed after map write");
                    return Err(err.into());
                }
            }
            committed += written.len();
            debug!(observer = %observer, changes = written.len(), "observer group committed");

            for change in &written {
                if let Err(source) = self
                    .caps
                    .effects
                    .apply_derived_effect(&change.target, &change.observer, change.new_state)
                    .await
                {
                    return Err(external_failure(committed, source));
                }
            }
        }

        Ok(committed)
    }

    async fn refresh_visuals(&self) {
        if let Err(err) = self.caps.visuals.refresh_entity_visuals().await {
            warn!(%err, "visual refresh failed");
        }
    }
}

fn external_failure(committed: usize, source: CollaboratorError) -> EngineError {
    error!(committed, %source, "external apply failed");
    EngineError::ExternalApply { committed, source }
}

/// Groups changes by observer, keeping first-seen order.
fn group_by_observer(changes: Vec<PerceptionChange>) -> Vec<(EntityId, Vec<PerceptionChange>)> {
    let mut groups: Vec<(EntityId, Vec<PerceptionChange>)> = Vec::new();
    let mut index: HashMap<EntityId, usize> = HashMap::new();
    for change in changes {
        match index.get(&change.observer) {
            Some(&slot) => groups[slot].1.push(change),
            None => {
                index.insert(change.observer.clone(), groups.len());
                groups.push((change.observer.clone(), vec![change]));
            }
        }
    }
    groups
}
