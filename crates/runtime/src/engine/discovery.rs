//! Subject discovery.

use stealth_core::{ActorType, AllianceRule, SceneEntity};
use tracing::debug;

use super::{ActionEngine, Invocation};
use crate::api::Result;

impl ActionEngine {
    /// Returns the candidate subjects for an invocation.
    ///
    /// The acting entity and the anchor never appear. Seek orders subjects
    /// by distance; every other action keeps scene order.
    pub(crate) fn discover(&self, inv: &Invocation<'_>) -> Result<Vec<SceneEntity>> {
        let entities = self.caps.scene().entities()?;
        let scanned = entities.len();
        let range = inv.settings.range_limit(inv.in_combat);

        let mut subjects: Vec<SceneEntity> = entities
            .into_iter()
            .filter(|entity| entity.id != inv.actor.id && entity.id != inv.anchor.id)
            .filter(|entity| admits_type(inv, entity))
            .filter(|entity| admits_alliance(inv, entity))
            .filter(|entity| !inv.ctx.encounter_only || entity.in_encounter)
            .filter(|entity| range.is_none_or(|max| inv.actor.distance_to(entity) <= max))
            .collect();

        if inv.profile.sort_by_distance {
            let origin = &inv.actor;
            subjects.sort_by(|a, b| origin.distance_to(a).total_cmp(&origin.distance_to(b)));
        }

        debug!(
            action = %inv.ctx.action,
            scanned,
            subjects = subjects.len(),
            ?range,
            "discovered subjects"
        );
        Ok(subjects)
    }
}

fn admits_type(inv: &Invocation<'_>, entity: &SceneEntity) -> bool {
    if entity.actor_type == ActorType::Wall {
        return inv.profile.admits_walls && inv.settings.wall_stealth;
    }
    !inv.profile.excluded_types.includes(entity.actor_type)
}

fn admits_alliance(inv: &Invocation<'_>, entity: &SceneEntity) -> bool {
    let allied = inv.actor.is_allied_with(entity);
    match inv.profile.alliance_rule {
        AllianceRule::AlliesOnly => allied,
        AllianceRule::IgnorableAllies => {
            let ignore = inv.ctx.ignore_allies.unwrap_or(inv.settings.ignore_allies);
            !(ignore && allied)
        }
    }
}
