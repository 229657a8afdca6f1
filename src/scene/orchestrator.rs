use std::collections::BTreeSet;

use crate::animation::timing::TransitionTiming;
use crate::dom::document::Document;
use crate::foundation::core::{SceneName, SectionId, Step, VizKey};
use crate::foundation::error::{TidesError, TidesResult};
use crate::scene::registry::SceneRegistry;
use crate::scene::store::{SceneChange, SceneStore, SharedSubscriber, SubscriberId};
use crate::scroll::observer::ScrollEvent;
use crate::viz::contract::UpdateOptions;
use crate::viz::registry::VizRegistry;

/// Observable result of processing scroll events.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    SectionEntered {
        section: SectionId,
    },
    Mounted {
        viz: VizKey,
        section: SectionId,
    },
    MountFailed {
        viz: VizKey,
        section: SectionId,
        error: String,
    },
    SectionChanged {
        from: Option<SectionId>,
        to: SectionId,
    },
    SceneChanged {
        from: Option<SceneName>,
        to: Option<SceneName>,
    },
    StepReached {
        section: SectionId,
        step: Step,
        viz: Option<VizKey>,
    },
    UpdateFailed {
        viz: VizKey,
        step: Step,
        error: String,
    },
}

/// Scene and section state machine.
///
/// Owns the scene store (sole writer of the scene attribute), the current and previous section
/// pointers, and the mount-once guard. Controller failures are logged and reported as
/// [`Outcome`]s; they never change the scene state.
#[derive(Debug)]
pub struct SceneOrchestrator {
    registry: SceneRegistry,
    store: SceneStore,
    timing: TransitionTiming,
    production: bool,
    current_section: Option<SectionId>,
    previous_section: Option<SectionId>,
    mounted: BTreeSet<VizKey>,
    failed: BTreeSet<VizKey>,
    /// Mount attempts made in the batch being processed; one per controller.
    attempted: BTreeSet<VizKey>,
}

impl SceneOrchestrator {
    pub fn new(registry: SceneRegistry, timing: TransitionTiming) -> Self {
        Self {
            registry,
            store: SceneStore::new(),
            timing,
            production: false,
            current_section: None,
            previous_section: None,
            mounted: BTreeSet::new(),
            failed: BTreeSet::new(),
            attempted: BTreeSet::new(),
        }
    }

    /// Disable dev-only scene forcing.
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn current_scene(&self) -> Option<SceneName> {
        self.store.current()
    }

    pub fn current_section(&self) -> Option<&SectionId> {
        self.current_section.as_ref()
    }

    pub fn previous_section(&self) -> Option<&SectionId> {
        self.previous_section.as_ref()
    }

    pub fn timing(&self) -> TransitionTiming {
        self.timing
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Whether the orchestrator's mount-once guard has flipped for `viz`.
    pub fn has_mounted(&self, viz: VizKey) -> bool {
        self.mounted.contains(&viz)
    }

    /// Whether the last mount attempt for `viz` failed and a retry is pending.
    pub fn has_failed(&self, viz: VizKey) -> bool {
        self.failed.contains(&viz)
    }

    /// Scene store writes so far.
    pub fn scene_writes(&self) -> usize {
        self.store.writes()
    }

    pub fn subscribe(&mut self, subscriber: SharedSubscriber) -> SubscriberId {
        self.store.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Process one observer batch.
    ///
    /// Entries run first so mounts precede transitions, then dominance changes, then steps in
    /// ascending step order (stable for equal steps). A controller gets at most one mount attempt
    /// per batch.
    #[tracing::instrument(level = "debug", skip_all, fields(events = events.len()))]
    pub fn handle_batch(
        &mut self,
        dom: &mut Document,
        vizzes: &mut VizRegistry,
        events: &[ScrollEvent],
    ) -> Vec<Outcome> {
        let mut out = Vec::new();
        let mut steps = Vec::new();
        self.attempted.clear();
        for event in events {
            if let ScrollEvent::SectionEntered { section } = event {
                self.on_entered(dom, vizzes, section, &mut out);
            }
        }
        for event in events {
            match event {
                ScrollEvent::SectionDominant { section } => {
                    self.on_dominant(dom, vizzes, section, &mut out)
                }
                ScrollEvent::StepReached { section, step } => steps.push((section, *step)),
                ScrollEvent::SectionEntered { .. } => {}
            }
        }
        steps.sort_by_key(|(_, step)| *step);
        for (section, step) in steps {
            self.on_step(dom, vizzes, section, step, &mut out);
        }
        out
    }

    /// Dev-only: force the scene attribute. Rejected in production.
    pub fn force_scene(
        &mut self,
        dom: &mut Document,
        scene: Option<SceneName>,
    ) -> TidesResult<Option<SceneChange>> {
        if self.production {
            return Err(TidesError::setup("scene forcing is disabled in production"));
        }
        tracing::debug!(scene = ?scene, "scene forced");
        Ok(self.store.set(dom, scene))
    }

    fn on_entered(
        &mut self,
        dom: &mut Document,
        vizzes: &mut VizRegistry,
        section: &SectionId,
        out: &mut Vec<Outcome>,
    ) {
        out.push(Outcome::SectionEntered {
            section: section.clone(),
        });
        if let Some(viz) = self.registry.viz_for_section(section) {
            self.ensure_mounted(dom, vizzes, viz, section, out);
        }
    }

    fn on_dominant(
        &mut self,
        dom: &mut Document,
        vizzes: &mut VizRegistry,
        section: &SectionId,
        out: &mut Vec<Outcome>,
    ) {
        if self.current_section.as_ref() != Some(section) {
            let from = self.current_section.replace(section.clone());
            tracing::debug!(from = ?from.as_ref().map(SectionId::as_str), to = %section, "section changed");

            if let Some(viz) = from.as_ref().and_then(|s| self.registry.viz_for_section(s))
                && let Some(controller) = vizzes.get_mut(viz)
            {
                controller.on_transition_out(dom);
            }
            if let Some(viz) = self.registry.viz_for_section(section) {
                if self.failed.contains(&viz) {
                    self.ensure_mounted(dom, vizzes, viz, section, out);
                }
                if let Some(controller) = vizzes.get_mut(viz) {
                    controller.on_transition_in(dom);
                }
            }
            self.previous_section = from.clone();
            out.push(Outcome::SectionChanged {
                from,
                to: section.clone(),
            });
        }

        let Some(scene) = self.registry.scene_for_section(section) else {
            return;
        };
        if let Some(change) = self.store.set(dom, Some(scene)) {
            tracing::debug!(from = ?change.previous, to = %scene, "scene changed");
            out.push(Outcome::SceneChanged {
                from: change.previous,
                to: change.current,
            });
        }
    }

    fn on_step(
        &mut self,
        dom: &mut Document,
        vizzes: &mut VizRegistry,
        section: &SectionId,
        step: Step,
        out: &mut Vec<Outcome>,
    ) {
        let viz = self.registry.viz_for_section(section);
        out.push(Outcome::StepReached {
            section: section.clone(),
            step,
            viz,
        });
        let Some(viz) = viz else {
            tracing::debug!(section = %section, step = step.0, "step in section without visualization");
            return;
        };
        let Some(controller) = vizzes.get_mut(viz) else {
            tracing::warn!(viz = %viz, "no controller registered");
            return;
        };
        let options = UpdateOptions {
            transition: self.timing,
        };
        if let Err(err) = controller.update(dom, step, &options) {
            tracing::error!(viz = %viz, step = step.0, %err, "update failed");
            out.push(Outcome::UpdateFailed {
                viz,
                step,
                error: err.to_string(),
            });
        }
    }

    fn ensure_mounted(
        &mut self,
        dom: &mut Document,
        vizzes: &mut VizRegistry,
        viz: VizKey,
        section: &SectionId,
        out: &mut Vec<Outcome>,
    ) {
        if self.mounted.contains(&viz) || !self.attempted.insert(viz) {
            return;
        }
        let Some(controller) = vizzes.get_mut(viz) else {
            tracing::warn!(viz = %viz, "no controller registered");
            return;
        };
        if controller.is_mounted() {
            self.mounted.insert(viz);
            self.failed.remove(&viz);
            return;
        }
        match controller.mount(dom) {
            Ok(()) => {
                tracing::info!(viz = %viz, section = %section, "visualization mounted");
                self.mounted.insert(viz);
                self.failed.remove(&viz);
                out.push(Outcome::Mounted {
                    viz,
                    section: section.clone(),
                });
            }
            Err(err) => {
                tracing::error!(viz = %viz, %err, "mount failed");
                self.failed.insert(viz);
                out.push(Outcome::MountFailed {
                    viz,
                    section: section.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/orchestrator.rs"]
mod tests;
