use std::collections::BTreeMap;

use crate::config::manifest::PageManifest;
use crate::foundation::core::{SceneName, SectionId, VizKey};
use crate::illustrations::{IllustrationFactory, factory_for};

/// Static lookup tables between sections, scenes, visualizations and illustration factories.
///
/// Every lookup is total: unknown input yields `None`.
#[derive(Clone, Debug, Default)]
pub struct SceneRegistry {
    scenes: BTreeMap<SectionId, SceneName>,
    vizzes: BTreeMap<SectionId, VizKey>,
    hosts: BTreeMap<SceneName, SectionId>,
    factories: BTreeMap<SceneName, IllustrationFactory>,
}

impl SceneRegistry {
    /// Empty registry: no section resolves to anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables of [`PageManifest::standard`] with the built-in illustration factories.
    pub fn standard() -> Self {
        Self::from_manifest(&PageManifest::standard())
    }

    /// Build the tables from a manifest. When two sections claim the same scene the first one
    /// hosts it; [`PageManifest::validate`] rejects such manifests.
    pub fn from_manifest(manifest: &PageManifest) -> Self {
        let mut out = Self::new();
        for section in &manifest.sections {
            if let Some(scene) = section.scene {
                out.scenes.insert(section.id.clone(), scene);
                out.hosts.entry(scene).or_insert_with(|| section.id.clone());
            }
            if let Some(viz) = section.viz {
                out.vizzes.insert(section.id.clone(), viz);
            }
        }
        for scene in SceneName::ALL {
            if let Some(factory) = factory_for(scene) {
                out.factories.insert(scene, factory);
            }
        }
        out
    }

    /// Replace (or add) the illustration factory of `scene`.
    pub fn with_factory(mut self, scene: SceneName, factory: IllustrationFactory) -> Self {
        self.factories.insert(scene, factory);
        self
    }

    /// Drop the illustration factory of `scene`.
    pub fn without_factory(mut self, scene: SceneName) -> Self {
        self.factories.remove(&scene);
        self
    }

    pub fn scene_for_section(&self, section: &SectionId) -> Option<SceneName> {
        self.scenes.get(section).copied()
    }

    /// Visualization mounted in `section`, if it owns one.
    pub fn viz_for_section(&self, section: &SectionId) -> Option<VizKey> {
        self.vizzes.get(section).copied()
    }

    pub fn section_for_viz(&self, viz: VizKey) -> Option<&SectionId> {
        self.vizzes
            .iter()
            .find_map(|(section, key)| (*key == viz).then_some(section))
    }

    pub fn illustration_factory_for_scene(&self, scene: SceneName) -> Option<IllustrationFactory> {
        self.factories.get(&scene).copied()
    }

    /// Section whose element receives the scene's illustration.
    pub fn host_section_for_scene(&self, scene: SceneName) -> Option<&SectionId> {
        self.hosts.get(&scene)
    }

    /// Scenes that have both a factory and a host section.
    pub fn illustrated_scenes(&self) -> impl Iterator<Item = (SceneName, &SectionId)> + '_ {
        self.hosts
            .iter()
            .filter(|(scene, _)| self.factories.contains_key(scene))
            .map(|(scene, host)| (*scene, host))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/registry.rs"]
mod tests;
