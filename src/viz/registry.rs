use std::collections::BTreeMap;

use crate::dom::document::Document;
use crate::foundation::core::VizKey;
use crate::foundation::error::TidesError;
use crate::viz::community::CommunityViz;
use crate::viz::contract::{VizController, VizOptions};
use crate::viz::data::DataSource;
use crate::viz::emotion::EmotionViz;
use crate::viz::ingredients::IngredientsViz;
use crate::viz::planets::PlanetsViz;
use crate::viz::ranking::RankingViz;
use crate::viz::stopwatch::StopwatchViz;

/// Controllers keyed by visualization key.
///
/// The orchestrator only sees `dyn VizController`; concrete chart types stay behind this table.
#[derive(Default)]
pub struct VizRegistry {
    controllers: BTreeMap<VizKey, Box<dyn VizController>>,
}

impl std::fmt::Debug for VizRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VizRegistry")
            .field("keys", &self.controllers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl VizRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six chart families of the standard page.
    pub fn standard() -> Self {
        let mut out = Self::new();
        out.register(Box::new(StopwatchViz::default()));
        out.register(Box::new(PlanetsViz::default()));
        out.register(Box::new(CommunityViz::default()));
        out.register(Box::new(RankingViz::default()));
        out.register(Box::new(EmotionViz::default()));
        out.register(Box::new(IngredientsViz::default()));
        out
    }

    /// Register `controller` under its own key, returning the one it replaced.
    pub fn register(&mut self, controller: Box<dyn VizController>) -> Option<Box<dyn VizController>> {
        self.controllers.insert(controller.key(), controller)
    }

    pub fn contains(&self, key: VizKey) -> bool {
        self.controllers.contains_key(&key)
    }

    pub fn get(&self, key: VizKey) -> Option<&dyn VizController> {
        self.controllers.get(&key).map(|c| &**c)
    }

    pub fn get_mut(&mut self, key: VizKey) -> Option<&mut (dyn VizController + 'static)> {
        self.controllers.get_mut(&key).map(|c| &mut **c)
    }

    pub fn keys(&self) -> impl Iterator<Item = VizKey> + '_ {
        self.controllers.keys().copied()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VizKey, &mut (dyn VizController + 'static))> {
        self.controllers.iter_mut().map(|(k, c)| (*k, &mut **c))
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Initialize every controller against its `viz-<key>` mount point.
    ///
    /// Setup errors are logged and returned; the failing controller stays registered but unusable,
    /// the rest of the page continues.
    pub fn init_all(
        &mut self,
        dom: &mut Document,
        options: &VizOptions,
        source: &dyn DataSource,
    ) -> Vec<(VizKey, TidesError)> {
        let mut failures = Vec::new();
        for (key, controller) in self.controllers.iter_mut() {
            if let Err(err) = controller.init(dom, &key.mount_id(), options.clone(), source) {
                tracing::warn!(viz = %key, error = %err, "visualization init failed");
                failures.push((*key, err));
            }
        }
        failures
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/registry.rs"]
mod tests;
