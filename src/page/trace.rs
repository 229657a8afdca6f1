//! Scripted page input for `tides replay` and scenario tests.

use std::path::Path;

use crate::dom::document::NodeId;
use crate::foundation::core::{Millis, SectionId};
use crate::foundation::error::{TidesError, TidesResult};
use crate::page::runtime::{Page, TimelineEntry};
use crate::scroll::observer::IntersectionEntry;

/// Visibility sample naming its target by element id.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TraceEntry {
    pub target: String,
    pub ratio: f64,
}

/// One scripted input.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TraceStep {
    /// Scroll the viewport to `y`.
    Scroll { y: f64 },
    /// Scroll a section to the top of the viewport.
    Jump { section: String },
    /// Raw observer batch.
    Batch { entries: Vec<TraceEntry> },
    Click { target: String },
    Hover { target: String },
    Unhover { target: String },
    Key { key: String },
    /// Advance the page clock to `at_ms`.
    Tick { at_ms: f64 },
    ReducedMotion { enabled: bool },
    ToggleAudio,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trace {
    pub steps: Vec<TraceStep>,
}

impl Trace {
    pub fn from_reader<R: std::io::Read>(r: R) -> TidesResult<Self> {
        serde_json::from_reader(r).map_err(|e| TidesError::validation(format!("invalid trace: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> TidesResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| TidesError::validation(format!("open trace '{}': {e}", path.display())))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Scroll from the top to the bottom of `page` in `stride` pixel increments, ticking the
    /// clock `frame_ms` per step.
    pub fn sweep(page: &Page, stride: f64, frame_ms: f64) -> Self {
        let end = (page.manifest().document_height() - page.manifest().viewport.height).max(0.0);
        let stride = if stride.is_finite() && stride > 0.0 { stride } else { end.max(1.0) };
        let mut steps = Vec::new();
        let mut y = 0.0_f64;
        let mut at = 0.0_f64;
        loop {
            steps.push(TraceStep::Scroll { y: y.min(end) });
            at += frame_ms;
            steps.push(TraceStep::Tick { at_ms: at });
            if y >= end {
                break;
            }
            y += stride;
        }
        Self { steps }
    }
}

/// Apply every step to `page` and return its timeline, including entries recorded before the
/// replay started (page construction).
///
/// Targets that do not resolve to an element are skipped with a warning.
#[tracing::instrument(level = "debug", skip_all, fields(steps = trace.steps.len()))]
pub fn replay(page: &mut Page, trace: &Trace) -> Vec<TimelineEntry> {
    for step in &trace.steps {
        match step {
            TraceStep::Scroll { y } => {
                page.scroll_to(*y);
            }
            TraceStep::Jump { section } => {
                if !page.jump_to(&SectionId::new(section.as_str())) {
                    tracing::warn!(section = %section, "jump target not watched");
                }
            }
            TraceStep::Batch { entries } => {
                let resolved: Vec<IntersectionEntry> = entries
                    .iter()
                    .filter_map(|e| match page.dom().element_by_id(&e.target) {
                        Some(target) => Some(IntersectionEntry {
                            target,
                            ratio: e.ratio,
                        }),
                        None => {
                            tracing::warn!(target = %e.target, "batch target missing; skipped");
                            None
                        }
                    })
                    .collect();
                page.observe(&resolved);
            }
            TraceStep::Click { target } => {
                if let Some(node) = resolve(page, target) {
                    page.click(node);
                }
            }
            TraceStep::Hover { target } => {
                if let Some(node) = resolve(page, target) {
                    page.hover(node);
                }
            }
            TraceStep::Unhover { target } => {
                if let Some(node) = resolve(page, target) {
                    page.unhover(node);
                }
            }
            TraceStep::Key { key } => page.key(key),
            TraceStep::Tick { at_ms } => page.tick(Millis(*at_ms)),
            TraceStep::ReducedMotion { enabled } => page.set_reduced_motion(*enabled),
            TraceStep::ToggleAudio => {
                page.toggle_audio();
            }
        }
    }
    page.take_timeline()
}

/// Element by id, falling back to the first element carrying `target` as a class.
fn resolve(page: &Page, target: &str) -> Option<NodeId> {
    let dom = page.dom();
    let node = dom
        .element_by_id(target)
        .or_else(|| dom.first_by_class(dom.root(), target));
    if node.is_none() {
        tracing::warn!(target = %target, "trace target missing; skipped");
    }
    node
}

#[cfg(test)]
#[path = "../../tests/unit/page/trace.rs"]
mod tests;
