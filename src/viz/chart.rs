//! Shared lifecycle driver for the built-in chart families.
//!
//! [`ChartController`] implements the [`VizController`] contract once (mount guard, step queue,
//! scheduler teardown, event emission). Each family only implements [`Chart`]: how to draw into
//! its root node and how to react to steps, frames and pointer actions.

use std::fmt;

use serde::de::DeserializeOwned;
use smallvec::SmallVec;

use crate::dom::document::{Document, NodeId};
use crate::foundation::core::{Millis, Step, VizKey};
use crate::foundation::error::{TidesError, TidesResult};
use crate::foundation::math::fmt_num;
use crate::viz::contract::{
    UpdateOptions, VisualizationState, VizController, VizEvent, VizEventKind, VizOptions,
};
use crate::viz::data::{DataOrigin, DataSource, load_or_fallback};
use crate::viz::emitter::{Emitter, Handler, SubscriptionId};
use crate::viz::schedule::FrameScheduler;

const MAX_PENDING_STEPS: usize = 32;

/// Work items a chart schedules on its own frame queue.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartTask {
    /// Chart-defined continuous or delayed animation.
    Animate(&'static str),
    /// Delete a transient node (tooltip, prompt, comet).
    RemoveNode(NodeId),
    /// Set an attribute when due (flash resets, fade-outs).
    SetAttr {
        node: NodeId,
        name: &'static str,
        value: String,
    },
}

/// State shared by every chart family.
#[derive(Debug)]
pub struct ChartCore<D> {
    pub(crate) key: VizKey,
    pub(crate) container: Option<NodeId>,
    pub(crate) root: Option<NodeId>,
    pub(crate) data: Option<D>,
    pub(crate) origin: Option<DataOrigin>,
    pub(crate) options: VizOptions,
    pub(crate) mounted: bool,
    pub(crate) current_step: Option<Step>,
    pub(crate) highlights: Vec<String>,
    pub(crate) pending: SmallVec<[(Step, UpdateOptions); 4]>,
    pub(crate) emitter: Emitter,
    pub(crate) frames: FrameScheduler<ChartTask>,
}

impl<D> ChartCore<D> {
    fn new(key: VizKey) -> Self {
        Self {
            key,
            container: None,
            root: None,
            data: None,
            origin: None,
            options: VizOptions::default(),
            mounted: false,
            current_step: None,
            highlights: Vec::new(),
            pending: SmallVec::new(),
            emitter: Emitter::new(),
            frames: FrameScheduler::new(),
        }
    }

    pub(crate) fn emit(&mut self, kind: VizEventKind) {
        let event = VizEvent::new(self.key, kind);
        self.emitter.emit(&event);
    }

    pub(crate) fn emit_with(&mut self, kind: VizEventKind, data: serde_json::Value) {
        let event = VizEvent::with_data(self.key, kind, data);
        self.emitter.emit(&event);
    }

    /// Dataset, or a lifecycle error if `init` never ran.
    pub(crate) fn data(&self) -> TidesResult<&D> {
        self.data
            .as_ref()
            .ok_or_else(|| TidesError::lifecycle(format!("{} has no data loaded", self.key)))
    }
}

/// Drawing and reaction logic of one chart family.
pub trait Chart {
    type Data: DeserializeOwned;

    const KEY: VizKey;

    /// Site-relative dataset path.
    const DATASET: &'static str;

    /// Built-in dataset used when the remote one is unavailable.
    fn sample_data() -> Self::Data;

    /// Build the chart under `root` (a fresh, empty node inside the mount point).
    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()>;

    /// Apply one step. Steps the chart does not know must be ignored.
    fn apply_step(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
        step: Step,
        options: &UpdateOptions,
    ) -> TidesResult<()>;

    /// One frame of a [`ChartTask::Animate`] task.
    fn animate(
        &mut self,
        _core: &mut ChartCore<Self::Data>,
        _dom: &mut Document,
        _root: NodeId,
        _name: &'static str,
        _now: Millis,
    ) -> TidesResult<()> {
        Ok(())
    }

    fn interact(
        &mut self,
        _core: &mut ChartCore<Self::Data>,
        _dom: &mut Document,
        _root: NodeId,
        _action: &str,
    ) -> TidesResult<()> {
        Ok(())
    }

    /// Reduced-motion preference changed while mounted.
    fn motion_changed(
        &mut self,
        _core: &mut ChartCore<Self::Data>,
        _dom: &mut Document,
        _root: NodeId,
    ) -> TidesResult<()> {
        Ok(())
    }

    fn transition_out(&mut self, _core: &mut ChartCore<Self::Data>, _dom: &mut Document, _root: NodeId) {}

    fn transition_in(&mut self, _core: &mut ChartCore<Self::Data>, _dom: &mut Document, _root: NodeId) {}

    /// Forget per-mount handles; called after the root subtree is freed.
    fn reset(&mut self) {}
}

/// [`VizController`] implementation shared by all chart families.
pub struct ChartController<C: Chart> {
    chart: C,
    core: ChartCore<C::Data>,
}

impl<C: Chart> fmt::Debug for ChartController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartController")
            .field("key", &C::KEY)
            .field("mounted", &self.core.mounted)
            .field("current_step", &self.core.current_step)
            .field("live_tasks", &self.core.frames.live_count())
            .finish_non_exhaustive()
    }
}

impl<C: Chart + Default> Default for ChartController<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: Chart> ChartController<C> {
    pub fn new(chart: C) -> Self {
        Self {
            chart,
            core: ChartCore::new(C::KEY),
        }
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn data(&self) -> Option<&C::Data> {
        self.core.data.as_ref()
    }

    /// How the dataset was obtained, once `init` ran.
    pub fn data_origin(&self) -> Option<DataOrigin> {
        self.core.origin
    }

    /// Chart root node while mounted.
    pub fn root(&self) -> Option<NodeId> {
        self.core.root
    }

    fn apply(&mut self, dom: &mut Document, step: Step, options: &UpdateOptions) -> TidesResult<()> {
        let root = self
            .core
            .root
            .ok_or_else(|| TidesError::lifecycle(format!("{} is not mounted", C::KEY)))?;
        self.core.current_step = Some(step);
        self.chart
            .apply_step(&mut self.core, dom, root, step, options)?;
        self.core
            .emit_with(VizEventKind::UpdateComplete, serde_json::json!({ "step": step.0 }));
        Ok(())
    }
}

impl<C: Chart> VizController for ChartController<C> {
    fn key(&self) -> VizKey {
        C::KEY
    }

    fn init(
        &mut self,
        dom: &mut Document,
        mount_id: &str,
        options: VizOptions,
        source: &dyn DataSource,
    ) -> TidesResult<()> {
        let container = dom.element_by_id(mount_id).ok_or_else(|| {
            TidesError::setup(format!("container not found: #{mount_id}"))
        })?;
        self.core.container = Some(container);
        self.core.options = options;

        let (data, origin) = load_or_fallback(source, C::DATASET, C::sample_data);
        self.core.data = Some(data);
        self.core.origin = Some(origin);
        self.core
            .emit_with(VizEventKind::DataReady, serde_json::json!({ "origin": origin }));
        Ok(())
    }

    fn mount(&mut self, dom: &mut Document) -> TidesResult<()> {
        if self.core.mounted {
            return Ok(());
        }
        let container = self
            .core
            .container
            .ok_or_else(|| TidesError::lifecycle(format!("{} mounted before init", C::KEY)))?;
        self.core.data()?;
        if !dom.contains(container) {
            return Err(TidesError::setup(format!(
                "{} mount point was removed",
                C::KEY
            )));
        }

        let class = format!("{}-chart", C::KEY);
        let root = dom.append_new(container, "div", &[("class", class.as_str())])?;
        if let Err(err) = self.chart.render(&mut self.core, dom, root) {
            self.core.frames.cancel_all();
            dom.remove(root);
            self.chart.reset();
            return Err(err);
        }
        self.core.root = Some(root);
        self.core.mounted = true;
        self.core.emit(VizEventKind::EnterComplete);

        let pending = std::mem::take(&mut self.core.pending);
        for (step, options) in pending {
            if let Err(err) = self.apply(dom, step, &options) {
                tracing::error!(viz = %C::KEY, step = step.0, error = %err, "queued step failed");
                self.core.emit_with(
                    VizEventKind::Error,
                    serde_json::json!({ "step": step.0, "error": err.to_string() }),
                );
            }
        }
        Ok(())
    }

    fn update(&mut self, dom: &mut Document, step: Step, options: &UpdateOptions) -> TidesResult<()> {
        if !self.core.mounted {
            if self.core.pending.len() == MAX_PENDING_STEPS {
                self.core.pending.remove(0);
            }
            self.core.pending.push((step, *options));
            tracing::debug!(viz = %C::KEY, step = step.0, "queued step until mount");
            return Ok(());
        }
        self.apply(dom, step, options)
    }

    fn unmount(&mut self, dom: &mut Document) -> TidesResult<()> {
        if !self.core.mounted {
            return Ok(());
        }
        self.core.frames.cancel_all();
        if let Some(root) = self.core.root.take() {
            dom.remove(root);
        }
        self.chart.reset();
        self.core.mounted = false;
        self.core.emit(VizEventKind::ExitComplete);
        Ok(())
    }

    fn destroy(&mut self, dom: &mut Document) -> TidesResult<()> {
        self.unmount(dom)?;
        self.core.data = None;
        self.core.origin = None;
        self.core.pending.clear();
        self.core.current_step = None;
        self.core.highlights.clear();
        self.core.emitter.clear();
        Ok(())
    }

    fn on(&mut self, kind: VizEventKind, handler: Handler) -> SubscriptionId {
        self.core.emitter.on(kind, handler)
    }

    fn off(&mut self, id: SubscriptionId) -> bool {
        self.core.emitter.off(id)
    }

    fn state(&self) -> VisualizationState {
        VisualizationState {
            mounted: self.core.mounted,
            current_step: self.core.current_step,
            data_ready: self.core.data.is_some(),
            reduced_motion: self.core.options.reduced_motion,
            highlights: self.core.highlights.clone(),
        }
    }

    fn set_reduced_motion(&mut self, dom: &mut Document, reduced: bool) -> TidesResult<()> {
        if self.core.options.reduced_motion == reduced {
            return Ok(());
        }
        self.core.options.reduced_motion = reduced;
        if let Some(root) = self.core.root {
            self.chart.motion_changed(&mut self.core, dom, root)?;
        }
        self.core.emit(VizEventKind::StateChange);
        Ok(())
    }

    fn resize(&mut self, dom: &mut Document, width: f64, height: f64) -> TidesResult<()> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(TidesError::validation("resize dimensions must be finite and > 0"));
        }
        self.core.options.width = width;
        self.core.options.height = height;
        if let Some(root) = self.core.root {
            self.core.frames.cancel_all();
            dom.clear_children(root);
            self.chart.reset();
            self.chart.render(&mut self.core, dom, root)?;
            if let Some(step) = self.core.current_step {
                self.chart
                    .apply_step(&mut self.core, dom, root, step, &UpdateOptions::default())?;
            }
        }
        self.core.emit(VizEventKind::Resize);
        Ok(())
    }

    fn tick(&mut self, dom: &mut Document, now: Millis) -> TidesResult<()> {
        let due = self.core.frames.advance(now);
        let Some(root) = self.core.root else {
            return Ok(());
        };
        for fired in due {
            match fired.task {
                ChartTask::Animate(name) => {
                    self.chart.animate(&mut self.core, dom, root, name, fired.now)?
                }
                ChartTask::RemoveNode(node) => {
                    dom.remove(node);
                }
                ChartTask::SetAttr { node, name, value } => {
                    if dom.contains(node) {
                        dom.set_attr(node, name, &value)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn interact(&mut self, dom: &mut Document, action: &str) -> TidesResult<()> {
        let Some(root) = self.core.root else {
            return Ok(());
        };
        self.chart.interact(&mut self.core, dom, root, action)
    }

    fn live_tasks(&self) -> usize {
        self.core.frames.live_count()
    }

    fn on_transition_out(&mut self, dom: &mut Document) {
        if let Some(root) = self.core.root {
            self.chart.transition_out(&mut self.core, dom, root);
        }
    }

    fn on_transition_in(&mut self, dom: &mut Document) {
        if let Some(root) = self.core.root {
            self.chart.transition_in(&mut self.core, dom, root);
        }
    }
}

/// Append a responsive `svg` sized to the chart options.
pub(crate) fn append_svg(
    dom: &mut Document,
    parent: NodeId,
    options: &VizOptions,
    label: &str,
) -> TidesResult<NodeId> {
    let view_box = format!("0 0 {} {}", fmt_num(options.width), fmt_num(options.height));
    dom.append_new(
        parent,
        "svg",
        &[
            ("viewBox", view_box.as_str()),
            ("role", "img"),
            ("aria-label", label),
        ],
    )
}

/// Set a numeric attribute formatted for markup.
pub(crate) fn set_num(dom: &mut Document, node: NodeId, name: &str, value: f64) -> TidesResult<()> {
    dom.set_attr(node, name, &fmt_num(value))
}

/// `1.2M` / `892.3K` / `60` style counts.
pub(crate) fn format_count(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{n:.0}")
    }
}

/// Staggered progress of item `index` at `elapsed_ms`, in `[0, 1]`.
pub(crate) fn staggered(elapsed_ms: f64, index: usize, stagger_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((elapsed_ms - index as f64 * stagger_ms) / duration_ms).clamp(0.0, 1.0)
}

/// Piecewise-linear color ramp over evenly spaced RGB stops, `t` in `[0, 1]`.
pub(crate) fn ramp(stops: &[[u8; 3]], t: f64) -> String {
    let Some(last) = stops.len().checked_sub(1) else {
        return "#000000".to_string();
    };
    if last == 0 {
        let [r, g, b] = stops[0];
        return format!("#{r:02x}{g:02x}{b:02x}");
    }
    let pos = t.clamp(0.0, 1.0) * last as f64;
    let i = (pos.floor() as usize).min(last - 1);
    let f = pos - i as f64;
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
    let (a, b) = (stops[i], stops[i + 1]);
    format!("#{:02x}{:02x}{:02x}", mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]))
}

#[cfg(test)]
#[path = "../../tests/unit/viz/chart.rs"]
mod tests;
