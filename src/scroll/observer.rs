//! Section and step-marker visibility tracking.
//!
//! The observer turns raw intersection ratios into three kinds of navigation events. It can be fed
//! either a viewport (ratios are computed from the `data-top`/`data-height` layout attributes) or
//! raw [`IntersectionEntry`] batches, which is what a browser intersection observer delivers.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::manifest::Thresholds;
use crate::dom::document::{Document, NodeId};
use crate::foundation::core::{SectionId, Step};
use crate::scroll::geometry::{Extent, Viewport};

/// Class carried by step markers.
pub const STEP_MARKER_CLASS: &str = "scroll-step";
/// Attribute holding a marker's declared step number.
pub const STEP_ATTR: &str = "data-step";

/// One visibility sample for an observed element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub ratio: f64,
}

/// Navigation events raised by [`ScrollObserver`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScrollEvent {
    /// First visibility above the entry threshold. At most once per section until reset.
    SectionEntered { section: SectionId },
    /// The section now has the highest ratio above the dominance threshold.
    SectionDominant { section: SectionId },
    /// A step marker crossed the step threshold.
    StepReached { section: SectionId, step: Step },
}

#[derive(Clone, Debug)]
struct WatchedSection {
    id: SectionId,
    node: NodeId,
    extent: Extent,
}

#[derive(Clone, Debug)]
struct WatchedMarker {
    section: SectionId,
    node: NodeId,
    step: Step,
    extent: Extent,
}

/// Watches sections and their step markers.
#[derive(Clone, Debug, Default)]
pub struct ScrollObserver {
    thresholds: Thresholds,
    sections: Vec<WatchedSection>,
    markers: Vec<WatchedMarker>,
    ratios: BTreeMap<NodeId, f64>,
    dominant: Option<SectionId>,
    entered: BTreeSet<SectionId>,
    above_step: BTreeSet<NodeId>,
}

impl ScrollObserver {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Start observing `sections` and every step marker inside them.
    ///
    /// Sections missing from the document and markers without a parsable step are skipped with a
    /// warning. Returns the number of sections now watched by this call.
    pub fn watch_sections(&mut self, dom: &Document, sections: &[SectionId]) -> usize {
        let mut added = 0;
        for id in sections {
            if self.sections.iter().any(|s| &s.id == id) {
                continue;
            }
            let Some(node) = dom.element_by_id(id.as_str()) else {
                tracing::warn!(section = %id, "section missing at observer setup; skipped");
                continue;
            };
            let extent = Extent::from_attrs(dom, node).unwrap_or_default();
            for marker in dom.find_by_class(node, STEP_MARKER_CLASS) {
                let Some(raw) = dom.attr(marker, STEP_ATTR) else {
                    tracing::warn!(section = %id, "step marker without {STEP_ATTR}; skipped");
                    continue;
                };
                let step = match Step::parse(raw) {
                    Ok(step) => step,
                    Err(err) => {
                        tracing::warn!(section = %id, error = %err, "step marker skipped");
                        continue;
                    }
                };
                self.markers.push(WatchedMarker {
                    section: id.clone(),
                    node: marker,
                    step,
                    extent: Extent::from_attrs(dom, marker).unwrap_or_default(),
                });
            }
            self.sections.push(WatchedSection {
                id: id.clone(),
                node,
                extent,
            });
            added += 1;
        }
        tracing::debug!(
            sections = self.sections.len(),
            markers = self.markers.len(),
            "observer watching"
        );
        added
    }

    /// Compute ratios for `viewport` and process the entries whose ratio changed.
    pub fn observe_viewport(&mut self, viewport: Viewport) -> Vec<ScrollEvent> {
        let targets = self
            .sections
            .iter()
            .map(|s| (s.node, s.extent))
            .chain(self.markers.iter().map(|m| (m.node, m.extent)));
        let entries: Vec<IntersectionEntry> = targets
            .filter_map(|(target, extent)| {
                let ratio = viewport.intersection_ratio(extent);
                let changed = self.ratios.get(&target).is_none_or(|prev| *prev != ratio);
                changed.then_some(IntersectionEntry { target, ratio })
            })
            .collect();
        if entries.is_empty() {
            return Vec::new();
        }
        self.observe_batch(&entries)
    }

    /// Process one batch of intersection entries.
    ///
    /// Events come out in a fixed order: entries (highest ratio first), then at most one dominance
    /// change, then reached steps in ascending step order. The result does not depend on the order
    /// of `entries`.
    #[tracing::instrument(level = "debug", skip_all, fields(entries = entries.len()))]
    pub fn observe_batch(&mut self, entries: &[IntersectionEntry]) -> Vec<ScrollEvent> {
        let mut touched: BTreeMap<usize, f64> = BTreeMap::new();
        let mut crossed: BTreeMap<usize, bool> = BTreeMap::new();
        for entry in entries {
            let ratio = if entry.ratio.is_finite() {
                entry.ratio.clamp(0.0, 1.0)
            } else {
                0.0
            };
            if let Some(i) = self.sections.iter().position(|s| s.node == entry.target) {
                touched.insert(i, ratio);
            } else if let Some(j) = self.markers.iter().position(|m| m.node == entry.target) {
                crossed.insert(j, ratio > self.thresholds.step);
            } else {
                tracing::debug!(target = ?entry.target, "entry for unwatched element ignored");
                continue;
            }
            self.ratios.insert(entry.target, ratio);
        }

        let mut events = Vec::new();

        let mut by_ratio: Vec<(usize, f64)> = touched.into_iter().collect();
        by_ratio.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        for (i, ratio) in &by_ratio {
            let id = &self.sections[*i].id;
            if *ratio > self.thresholds.entry && self.entered.insert(id.clone()) {
                events.push(ScrollEvent::SectionEntered {
                    section: id.clone(),
                });
            }
        }

        if !by_ratio.is_empty()
            && let Some(next) = self.pick_dominant()
        {
            tracing::debug!(section = %next, "section dominant");
            self.dominant = Some(next.clone());
            events.push(ScrollEvent::SectionDominant { section: next });
        }

        let mut reached: Vec<&WatchedMarker> = Vec::new();
        for (j, above) in crossed {
            let marker = &self.markers[j];
            if above {
                if self.above_step.insert(marker.node) {
                    reached.push(marker);
                }
            } else {
                self.above_step.remove(&marker.node);
            }
        }
        reached.sort_by_key(|m| m.step);
        events.extend(reached.into_iter().map(|m| ScrollEvent::StepReached {
            section: m.section.clone(),
            step: m.step,
        }));
        events
    }

    /// New dominant section, if it differs from the current one.
    ///
    /// Highest ratio above the threshold wins; when the current dominant section ties for the
    /// highest ratio it is kept.
    fn pick_dominant(&self) -> Option<SectionId> {
        let ratio_of = |s: &WatchedSection| self.ratios.get(&s.node).copied().unwrap_or(0.0);
        let best = self
            .sections
            .iter()
            .map(ratio_of)
            .filter(|r| *r > self.thresholds.dominance)
            .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |a| a.max(r))))?;
        let leaders: Vec<&WatchedSection> = self
            .sections
            .iter()
            .filter(|s| ratio_of(s) == best)
            .collect();
        if let Some(current) = &self.dominant
            && leaders.iter().any(|s| &s.id == current)
        {
            return None;
        }
        leaders.first().map(|s| s.id.clone())
    }

    /// Allow `section` to raise [`ScrollEvent::SectionEntered`] again.
    pub fn reset(&mut self, section: &SectionId) -> bool {
        self.entered.remove(section)
    }

    /// Forget every ratio, entry and dominance decision.
    pub fn reset_all(&mut self) {
        self.ratios.clear();
        self.entered.clear();
        self.above_step.clear();
        self.dominant = None;
    }

    pub fn dominant(&self) -> Option<&SectionId> {
        self.dominant.as_ref()
    }

    pub fn has_entered(&self, section: &SectionId) -> bool {
        self.entered.contains(section)
    }

    /// Last known ratio of `section` (0 when never observed).
    pub fn ratio(&self, section: &SectionId) -> f64 {
        self.sections
            .iter()
            .find(|s| &s.id == section)
            .and_then(|s| self.ratios.get(&s.node))
            .copied()
            .unwrap_or(0.0)
    }

    /// Scroll offset that brings `section` to the top of the viewport.
    pub fn scroll_to(&self, section: &SectionId) -> Option<f64> {
        self.sections
            .iter()
            .find(|s| &s.id == section)
            .map(|s| s.extent.top)
    }

    pub fn section_node(&self, section: &SectionId) -> Option<NodeId> {
        self.sections
            .iter()
            .find(|s| &s.id == section)
            .map(|s| s.node)
    }

    /// Watched step marker node for `step` in `section`.
    pub fn marker_node(&self, section: &SectionId, step: Step) -> Option<NodeId> {
        self.markers
            .iter()
            .find(|m| &m.section == section && m.step == step)
            .map(|m| m.node)
    }

    pub fn watched_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn watched_markers(&self) -> usize {
        self.markers.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/observer.rs"]
mod tests;
