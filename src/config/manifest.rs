//! Page manifest: the static description of sections, step markers and observer thresholds.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::animation::timing::TransitionTiming;
use crate::foundation::core::{SceneName, SectionId, Step, VizKey};
use crate::foundation::error::{TidesError, TidesResult};

/// Upper bound of the entry-threshold band.
pub const MAX_ENTRY_THRESHOLD: f64 = 0.25;

const STANDARD_MARKER_HEIGHT: f64 = 200.0;

/// Annotation rail text for the standard steps.
pub fn default_annotation(step: Step) -> Option<&'static str> {
    Some(match step.0 {
        1 => "Optimal duration: 15-30 seconds",
        2 => "First hour engagement crucial",
        3 => "Top artists dominate the soundscape",
        4 => "2022 saw the most diverse trends",
        5 => "BookTok drives publishing industry",
        6 => "Sound trends last 6-12 weeks",
        7 => "Engagement varies by community",
        8 => "30% of trends see revival",
        9 => "Positive emotions drive shares",
        10 => "Anger surprisingly viral",
        11 => "Key ingredients identified",
        12 => "Your recipe ready to test",
        _ => return None,
    })
}

/// Viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
        }
    }
}

/// Visibility thresholds used by the scroll observer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A section owns the scene above this ratio.
    pub dominance: f64,
    /// First visibility above this ratio counts as an entry.
    pub entry: f64,
    /// A step marker is reached above this ratio.
    pub step: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            dominance: 0.5,
            entry: 0.1,
            step: 0.5,
        }
    }
}

/// One step marker inside a section.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepMarkerSpec {
    pub step: Step,
    /// Offset from the section top.
    pub offset: f64,
    #[serde(default = "default_marker_height")]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

fn default_marker_height() -> f64 {
    STANDARD_MARKER_HEIGHT
}

/// One scrollable section.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionSpec {
    pub id: SectionId,
    /// Display name used in announcements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viz: Option<VizKey>,
    /// Body background class applied while this section is current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub top: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepMarkerSpec>,
    /// Count-up targets of the section's KPI tiles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kpis: Vec<f64>,
}

impl SectionSpec {
    pub fn new(id: &str, top: f64, height: f64) -> Self {
        Self {
            id: SectionId::new(id),
            name: None,
            scene: None,
            viz: None,
            background: None,
            top,
            height,
            steps: Vec::new(),
            kpis: Vec::new(),
        }
    }

    pub fn with_scene(mut self, scene: SceneName) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn with_viz(mut self, viz: VizKey) -> Self {
        self.viz = Some(viz);
        self
    }

    pub fn with_step(mut self, step: i64, offset: f64) -> Self {
        self.steps.push(StepMarkerSpec {
            step: Step(step),
            offset,
            height: STANDARD_MARKER_HEIGHT,
            annotation: None,
        });
        self
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Static page description consumed by [`crate::page::runtime::Page`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageManifest {
    #[serde(default)]
    pub viewport: ViewportSize,
    pub sections: Vec<SectionSpec>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub transition: TransitionTiming,
    /// Disables dev-only affordances (scene keys, scene chip).
    #[serde(default)]
    pub production: bool,
    /// Site root datasets are read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
}

impl PageManifest {
    /// The built-in seven-section page.
    pub fn standard() -> Self {
        let chapter = |id: &str, name: &str, top: f64, scene: SceneName, viz: VizKey, bg: &str, steps: [i64; 2]| {
            let mut section = SectionSpec::new(id, top, 1200.0)
                .with_scene(scene)
                .with_viz(viz)
                .with_step(steps[0], 300.0)
                .with_step(steps[1], 700.0);
            section.name = Some(name.to_string());
            section.background = Some(bg.to_string());
            for marker in &mut section.steps {
                marker.annotation = default_annotation(marker.step).map(str::to_string);
            }
            section
        };

        let mut landing = SectionSpec::new("section-landing", 0.0, 900.0).with_scene(SceneName::Cosmos);
        landing.name = Some("Landing".to_string());
        landing.background = Some("bg-cosmos".to_string());

        let mut ignite = chapter("section-ignite", "Ignite", 900.0, SceneName::Dawn, VizKey::Stopwatch, "bg-dawn", [1, 2]);
        ignite.kpis = vec![892.3, 15.0, 30.0];
        let surge = chapter("section-surge", "Surge", 2100.0, SceneName::Orbit, VizKey::Planets, "bg-cosmos-deep", [3, 4]);
        let spillover = chapter("section-spillover", "Spillover", 3300.0, SceneName::City, VizKey::Community, "bg-city", [5, 6]);
        let fade = chapter("section-fade", "Fade/Revival", 4500.0, SceneName::Forest, VizKey::Ranking, "bg-forest", [7, 8]);
        let mut takeaway = chapter("section-takeaway", "The Formula", 5700.0, SceneName::Air, VizKey::Emotion, "bg-neutral", [9, 10]);
        takeaway.kpis = vec![30.0, 6.5];
        let ingredients = chapter("section-ingredients", "Recipe Builder", 6900.0, SceneName::Lab, VizKey::Ingredients, "bg-lab", [11, 12]);

        Self {
            viewport: ViewportSize::default(),
            sections: vec![landing, ignite, surge, spillover, fade, takeaway, ingredients],
            thresholds: Thresholds::default(),
            transition: TransitionTiming::default(),
            production: false,
            data_root: None,
        }
    }

    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TidesResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| TidesError::validation(format!("parse page manifest JSON: {e}")))
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TidesResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TidesError::validation(format!("open page manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> TidesResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TidesError::serde(e.to_string()))
    }

    pub fn section(&self, id: &SectionId) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Section hosting visualization `viz`.
    pub fn section_for_viz(&self, viz: VizKey) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.viz == Some(viz))
    }

    /// Bottom edge of the lowest section.
    pub fn document_height(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| s.top + s.height)
            .fold(0.0, f64::max)
    }

    /// Reject manifests the runtime cannot honor.
    pub fn validate(&self) -> TidesResult<()> {
        fn unit(name: &str, v: f64) -> TidesResult<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(TidesError::validation(format!("threshold '{name}' must be in [0, 1], got {v}")))
            }
        }
        fn extent(what: &str, v: f64) -> TidesResult<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(TidesError::validation(format!("{what} must be finite and >= 0, got {v}")))
            }
        }

        let t = &self.thresholds;
        unit("dominance", t.dominance)?;
        unit("entry", t.entry)?;
        unit("step", t.step)?;
        if t.entry > MAX_ENTRY_THRESHOLD {
            return Err(TidesError::validation(format!(
                "entry threshold must be at most {MAX_ENTRY_THRESHOLD}, got {}",
                t.entry
            )));
        }
        if !(self.viewport.width.is_finite() && self.viewport.height.is_finite())
            || self.viewport.width <= 0.0
            || self.viewport.height <= 0.0
        {
            return Err(TidesError::validation("viewport dimensions must be finite and > 0"));
        }
        extent("transition duration", self.transition.duration_ms)?;

        let mut ids = BTreeSet::new();
        let mut scenes = BTreeSet::new();
        let mut vizzes = BTreeSet::new();
        for section in &self.sections {
            let id = section.id.as_str();
            if id.is_empty() {
                return Err(TidesError::validation("section id must be non-empty"));
            }
            if !ids.insert(id) {
                return Err(TidesError::validation(format!("duplicate section id '{id}'")));
            }
            if let Some(scene) = section.scene
                && !scenes.insert(scene)
            {
                return Err(TidesError::validation(format!(
                    "scene '{scene}' is hosted by more than one section"
                )));
            }
            if let Some(viz) = section.viz
                && !vizzes.insert(viz)
            {
                return Err(TidesError::validation(format!(
                    "visualization '{viz}' is mounted in more than one section"
                )));
            }
            extent(&format!("section '{id}' top"), section.top)?;
            extent(&format!("section '{id}' height"), section.height)?;

            let mut steps = BTreeSet::new();
            for marker in &section.steps {
                if !steps.insert(marker.step) {
                    return Err(TidesError::validation(format!(
                        "duplicate step {} in section '{id}'",
                        marker.step
                    )));
                }
                extent(&format!("step {} offset", marker.step), marker.offset)?;
                extent(&format!("step {} height", marker.step), marker.height)?;
            }
            for kpi in &section.kpis {
                if !kpi.is_finite() {
                    return Err(TidesError::validation(format!("non-finite KPI target in '{id}'")));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/manifest.rs"]
mod tests;
