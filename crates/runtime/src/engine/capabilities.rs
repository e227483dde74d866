//! Explicit bundle of the collaborators the engine drives.

use std::sync::Arc;

use crate::api::{EffectApplier, PerceptionStore, SceneQuery, SettingsProvider, VisualRefresher};
use crate::repository::LedgerRepository;

/// Everything external the engine needs, passed in once at construction.
#[derive(Clone)]
pub struct Capabilities {
    pub(crate) store: Arc<dyn PerceptionStore>,
    pub(crate) effects: Arc<dyn EffectApplier>,
    pub(crate) visuals: Arc<dyn VisualRefresher>,
    pub(crate) scene: Arc<dyn SceneQuery>,
    pub(crate) settings: Arc<dyn SettingsProvider>,
    pub(crate) ledger: Arc<dyn LedgerRepository>,
}

impl Capabilities {
    pub fn new(
        store: Arc<dyn PerceptionStore>,
        effects: Arc<dyn EffectApplier>,
        visuals: Arc<dyn VisualRefresher>,
        scene: Arc<dyn SceneQuery>,
        settings: Arc<dyn SettingsProvider>,
        ledger: Arc<dyn LedgerRepository>,
    ) -> Self {
        Self {
            store,
            effects,
            visuals,
            scene,
            settings,
            ledger,
        }
    }

    pub fn scene(&self) -> &dyn SceneQuery {
        self.scene.as_ref()
    }

    pub fn ledger(&self) -> &dyn LedgerRepository {
        self.ledger.as_ref()
    }
}
