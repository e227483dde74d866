//! Cached pair geometry.

use serde::{Deserialize, Serialize};
use stealth_core::{ApplyDirection, CoverState, SceneEntity};

use crate::api::SceneQuery;

/// Geometry between an anchor and a subject, measured once per position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairGeometry {
    pub distance: f64,
    pub line_of_sight: bool,
    /// Cover the subject has against the anchor.
    pub terrain_cover: CoverState,
    /// Cover the anchor has against the subject.
    pub reverse_cover: CoverState,
}

impl PairGeometry {
    pub fn measure(scene: &dyn SceneQuery, anchor: &SceneEntity, subject: &SceneEntity) -> Self {
        Self {
            distance: anchor.distance_to(subject),
            line_of_sight: scene.line_of_sight(anchor, subject),
            terrain_cover: scene.terrain_cover(anchor, subject),
            reverse_cover: scene.terrain_cover(subject, anchor),
        }
    }

    /// Terrain cover of the pair's target against its observer.
    pub fn target_cover(&self, direction: ApplyDirection) -> CoverState {
        match direction {
            ApplyDirection::ObserverToTarget => self.terrain_cover,
            ApplyDirection::TargetToObserver => self.reverse_cover,
        }
    }
}
