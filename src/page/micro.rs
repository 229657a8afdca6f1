//! Small one-off flourishes layered over the charts.

use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::dom::task::DomTask;
use crate::foundation::core::{Millis, VizKey};
use crate::foundation::error::TidesResult;
use crate::viz::schedule::FrameScheduler;

/// Micro interaction names carried by [`Interaction::Micro`].
pub const COMET: &str = "comet";
pub const RANKING_DETAIL: &str = "ranking-detail";

const COMET_MS: f64 = 500.0;
const GLOW_MS: f64 = 200.0;
const LEAF_HINT_MS: f64 = 1700.0;
const PULSE_DELAY_MS: f64 = 500.0;
const PULSE_MS: f64 = 300.0;
const LEAF_HINT_RATIO: f64 = 0.3;
const PULSE_RATIO: f64 = 0.4;
const GLOW: &str = "box-shadow: 0 0 24px rgba(255, 255, 255, 0.6)";

#[derive(Clone, Debug, PartialEq)]
enum MicroTask {
    Dom(DomTask),
    /// Start of the delayed bubble pulse.
    Pulse,
}

/// Comet, leaf hint and bubble pulse, each with its own cleanup timer.
#[derive(Debug, Default)]
pub struct MicroInteractions {
    frames: FrameScheduler<MicroTask>,
    reduced_motion: bool,
    leaf_hint_shown: bool,
    pulse_shown: bool,
}

impl MicroInteractions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn live_tasks(&self) -> usize {
        self.frames.live_count()
    }

    pub fn leaf_hint_shown(&self) -> bool {
        self.leaf_hint_shown
    }

    pub fn pulse_shown(&self) -> bool {
        self.pulse_shown
    }

    /// Register the comet on the planets container and the one-time ranking detail click.
    pub fn install(&self, dom: &mut Document) -> TidesResult<()> {
        if let Some(planets) = dom.element_by_id(&VizKey::Planets.mount_id()) {
            dom.listen(
                planets,
                DomEventKind::Click,
                Interaction::Micro {
                    name: COMET.to_string(),
                },
            )?;
        }
        if let Some(ranking) = dom.element_by_id(&VizKey::Ranking.mount_id()) {
            dom.listen_once(
                ranking,
                DomEventKind::Click,
                Interaction::Micro {
                    name: RANKING_DETAIL.to_string(),
                },
            )?;
        }
        Ok(())
    }

    /// Streak across the planets container; a short glow under reduced motion.
    pub fn comet(&mut self, dom: &mut Document) -> TidesResult<()> {
        let Some(planets) = dom.element_by_id(&VizKey::Planets.mount_id()) else {
            return Ok(());
        };
        if self.reduced_motion {
            let previous = dom.attr(planets, "style").unwrap_or_default().to_string();
            dom.set_attr(planets, "style", GLOW)?;
            self.frames.after(
                GLOW_MS,
                MicroTask::Dom(DomTask::SetAttr {
                    node: planets,
                    name: "style",
                    value: previous,
                }),
            );
            return Ok(());
        }
        let overlay = dom.append_new(planets, "div", &[("class", "comet-overlay"), ("aria-hidden", "true")])?;
        dom.append_new(overlay, "div", &[("class", "comet")])?;
        self.frames.after(COMET_MS, MicroTask::Dom(DomTask::Remove(overlay)));
        Ok(())
    }

    /// First time the ranking section is at least 30% visible: two drifting leaves, or a plain
    /// fade-in of the annotation under reduced motion.
    pub fn maybe_leaf_hint(&mut self, dom: &mut Document, section: NodeId, ratio: f64) -> TidesResult<()> {
        if self.leaf_hint_shown || ratio < LEAF_HINT_RATIO {
            return Ok(());
        }
        self.leaf_hint_shown = true;
        if self.reduced_motion {
            if let Some(annotation) = dom.first_by_class(section, "annotation") {
                dom.set_attr(annotation, "style", "opacity: 1; transition: opacity 200ms")?;
            }
            return Ok(());
        }
        for i in 0..2 {
            let style = format!("left: {}%; animation-delay: {}ms", 30 + i * 40, i * 200);
            let leaf = dom.append_new(
                section,
                "div",
                &[("class", "hint-leaf"), ("aria-hidden", "true"), ("style", style.as_str())],
            )?;
            self.frames.after(LEAF_HINT_MS, MicroTask::Dom(DomTask::Remove(leaf)));
        }
        Ok(())
    }

    /// First time the emotion section is at least 40% visible, pulse the first three bubbles.
    pub fn maybe_bubble_pulse(&mut self, ratio: f64) {
        if self.pulse_shown || ratio < PULSE_RATIO {
            return;
        }
        self.pulse_shown = true;
        self.frames.after(PULSE_DELAY_MS, MicroTask::Pulse);
    }

    pub fn tick(&mut self, dom: &mut Document, now: Millis) {
        for fired in self.frames.advance(now) {
            let result = match fired.task {
                MicroTask::Dom(task) => task.apply(dom),
                MicroTask::Pulse => self.pulse(dom),
            };
            if let Err(err) = result {
                tracing::warn!(%err, "micro interaction timer failed");
            }
        }
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) -> usize {
        self.frames.cancel_all()
    }

    fn pulse(&mut self, dom: &mut Document) -> TidesResult<()> {
        let Some(emotion) = dom.element_by_id(&VizKey::Emotion.mount_id()) else {
            return Ok(());
        };
        for bubble in dom.find_by_class(emotion, "bubble").into_iter().take(3) {
            let Some(circle) = dom.find_by_tag(bubble, "circle").first().copied() else {
                continue;
            };
            let (name, value, restore) = if self.reduced_motion {
                ("stroke", "#FFFFFF", dom.attr(circle, "stroke").unwrap_or("none").to_string())
            } else {
                ("transform", "scale(1.05)", "scale(1)".to_string())
            };
            dom.set_attr(circle, name, value)?;
            self.frames.after(
                PULSE_MS,
                MicroTask::Dom(DomTask::SetAttr {
                    node: circle,
                    name,
                    value: restore,
                }),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/micro.rs"]
mod tests;
