//! Stopwatch: video duration against engagement, drawn as a radial dial of donut sectors.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Arc, BezPath, Point, Vec2};

use crate::animation::ease::Ease;
use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::foundation::core::{Millis, Step, VizKey};
use crate::foundation::error::TidesResult;
use crate::foundation::math::fmt_num;
use crate::viz::chart::{
    Chart, ChartController, ChartCore, ChartTask, append_svg, format_count, ramp, set_num,
    staggered,
};
use crate::viz::contract::UpdateOptions;
use crate::viz::schedule::FrameHandle;

const VIRIDIS: [[u8; 3]; 5] = [
    [0x44, 0x01, 0x54],
    [0x3b, 0x52, 0x8b],
    [0x21, 0x91, 0x8c],
    [0x5e, 0xc9, 0x62],
    [0xfd, 0xe7, 0x25],
];
const REVEAL_STAGGER_MS: f64 = 50.0;
const REVEAL_MS: f64 = 300.0;
const SWEEP_MS: f64 = 2000.0;
const RESTING_OPACITY: f64 = 0.7;
const INNER_RADIUS: f64 = 30.0;

/// One duration bucket, stored on the wire as `[seconds, views]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct DurationBin {
    pub seconds: f64,
    pub views: f64,
}

impl From<(f64, f64)> for DurationBin {
    fn from((seconds, views): (f64, f64)) -> Self {
        Self { seconds, views }
    }
}

impl From<DurationBin> for (f64, f64) {
    fn from(b: DurationBin) -> Self {
        (b.seconds, b.views)
    }
}

#[derive(Clone, Copy, Debug)]
struct Running {
    handle: FrameHandle,
    started: Millis,
}

/// Radial duration chart with a replayable reveal and a glow sweep on section entry.
#[derive(Debug, Default)]
pub struct StopwatchChart {
    dial: Option<NodeId>,
    sectors: Vec<(NodeId, f64)>,
    reveal: Option<Running>,
    sweep: Option<(Running, NodeId)>,
    velocity: Option<NodeId>,
}

pub type StopwatchViz = ChartController<StopwatchChart>;

impl StopwatchChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sector nodes in data order.
    pub fn sectors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.sectors.iter().map(|(node, _)| *node)
    }

    fn run_reveal(&mut self, core: &mut ChartCore<Vec<DurationBin>>, dom: &mut Document) -> TidesResult<()> {
        if core.options.reduced_motion {
            return Ok(());
        }
        if let Some(prev) = self.reveal.take() {
            core.frames.cancel(prev.handle);
        }
        for (node, _) in &self.sectors {
            dom.set_attr(*node, "opacity", "0")?;
        }
        self.reveal = Some(Running {
            handle: core.frames.every_frame(ChartTask::Animate("reveal")),
            started: core.frames.now(),
        });
        Ok(())
    }

    fn play_glow_sweep(&mut self, core: &mut ChartCore<Vec<DurationBin>>, dom: &mut Document) -> TidesResult<()> {
        let Some(dial) = self.dial else {
            return Ok(());
        };
        if core.options.reduced_motion || self.sweep.is_some() {
            return Ok(());
        }
        let line = dom.append_new(
            dial,
            "line",
            &[
                ("class", "glow-sweep"),
                ("x1", "0"),
                ("y1", "0"),
                ("x2", "0"),
                ("y2", "-200"),
                ("stroke", "#00FFE0"),
                ("stroke-width", "3"),
                ("opacity", "0.8"),
            ],
        )?;
        let running = Running {
            handle: core.frames.every_frame(ChartTask::Animate("sweep")),
            started: core.frames.now(),
        };
        self.sweep = Some((running, line));
        Ok(())
    }

    fn stop_sweep(&mut self, core: &mut ChartCore<Vec<DurationBin>>, dom: &mut Document) {
        if let Some((running, line)) = self.sweep.take() {
            core.frames.cancel(running.handle);
            dom.remove(line);
        }
    }

    fn highlight_range(
        &mut self,
        core: &mut ChartCore<Vec<DurationBin>>,
        dom: &mut Document,
        min: f64,
        max: f64,
    ) -> TidesResult<()> {
        core.highlights.clear();
        for (node, seconds) in &self.sectors {
            let inside = (min..=max).contains(seconds);
            set_num(dom, *node, "opacity", if inside { 0.9 } else { 0.3 })?;
            dom.set_attr(*node, "stroke", if inside { "#00FFE0" } else { "none" })?;
            if inside {
                core.highlights.push(format!("{}s", fmt_num(*seconds)));
            }
        }
        Ok(())
    }

    fn show_velocity(&mut self, core: &ChartCore<Vec<DurationBin>>, dom: &mut Document, root: NodeId) -> TidesResult<()> {
        if self.velocity.is_some() {
            return Ok(());
        }
        let Some(peak) = core
            .data()?
            .iter()
            .copied()
            .max_by(|a, b| a.views.total_cmp(&b.views))
        else {
            return Ok(());
        };
        let panel = dom.append_new(root, "div", &[("class", "stopwatch-velocity")])?;
        let text = format!(
            "Peak velocity: {} views at {}s",
            format_count(peak.views),
            fmt_num(peak.seconds)
        );
        dom.set_text(panel, &text)?;
        self.velocity = Some(panel);
        Ok(())
    }
}

/// Closed donut sector from 12 o'clock, clockwise by `sweep` radians.
fn sector_path(inner: f64, outer: f64, sweep: f64) -> String {
    let start = -FRAC_PI_2;
    let outer_arc = Arc {
        center: Point::ZERO,
        radii: Vec2::new(outer, outer),
        start_angle: start,
        sweep_angle: sweep,
        x_rotation: 0.0,
    };
    let inner_arc = Arc {
        center: Point::ZERO,
        radii: Vec2::new(inner, inner),
        start_angle: start + sweep,
        sweep_angle: -sweep,
        x_rotation: 0.0,
    };
    let mut path = BezPath::new();
    path.move_to(Point::new(0.0, -outer));
    path.extend(outer_arc.append_iter(0.1));
    path.line_to(Point::new(
        inner * (start + sweep).cos(),
        inner * (start + sweep).sin(),
    ));
    path.extend(inner_arc.append_iter(0.1));
    path.close_path();
    path.to_svg()
}

impl Chart for StopwatchChart {
    type Data = Vec<DurationBin>;

    const KEY: VizKey = VizKey::Stopwatch;
    const DATASET: &'static str = "data/duration_engagement.json";

    fn sample_data() -> Self::Data {
        [
            (5.0, 234_500.0),
            (10.0, 445_600.0),
            (15.0, 892_300.0),
            (20.0, 756_400.0),
            (25.0, 623_100.0),
            (30.0, 512_300.0),
            (35.0, 423_100.0),
            (40.0, 334_500.0),
            (45.0, 267_800.0),
            (50.0, 198_900.0),
            (55.0, 145_600.0),
            (60.0, 89_200.0),
        ]
        .into_iter()
        .map(DurationBin::from)
        .collect()
    }

    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()> {
        let header = dom.append_new(root, "div", &[("class", "stopwatch-header")])?;
        let title = dom.append_new(header, "h3", &[])?;
        dom.set_text(title, "The Perfect Duration")?;
        let replay = dom.append_new(header, "button", &[("class", "replay-btn")])?;
        dom.set_text(replay, "Play")?;
        dom.listen(
            replay,
            DomEventKind::Click,
            Interaction::Viz {
                viz: VizKey::Stopwatch,
                action: "replay".to_string(),
            },
        )?;

        let (width, height) = (core.options.width, core.options.height);
        let svg = append_svg(
            dom,
            root,
            &core.options,
            "Stopwatch visualization showing video duration impact on engagement",
        )?;
        let translate = format!("translate({}, {})", fmt_num(width / 2.0), fmt_num(height / 2.0));
        let dial = dom.append_new(svg, "g", &[("transform", translate.as_str())])?;
        self.dial = Some(dial);

        let ring = ((width.min(height) - 140.0) / 2.0 - 40.0).max(INNER_RADIUS + 20.0);
        let face = ring * 0.97;
        let ring_attrs = [("class", "ring"), ("fill", "none"), ("stroke-width", "2")];
        let outer = dom.append_new(dial, "circle", &ring_attrs)?;
        set_num(dom, outer, "r", ring)?;
        let inner = dom.append_new(dial, "circle", &[("class", "face")])?;
        set_num(dom, inner, "r", face)?;

        let ticks = dom.append_new(dial, "g", &[("aria-hidden", "true")])?;
        for i in 0..60 {
            let a = f64::from(i) / 60.0 * TAU - FRAC_PI_2;
            let major = i % 5 == 0;
            let r1 = face - if major { 10.0 } else { 6.0 };
            let r2 = face - 2.0;
            let tick = dom.append_new(ticks, "line", &[("class", "tick")])?;
            set_num(dom, tick, "x1", r1 * a.cos())?;
            set_num(dom, tick, "y1", r1 * a.sin())?;
            set_num(dom, tick, "x2", r2 * a.cos())?;
            set_num(dom, tick, "y2", r2 * a.sin())?;
            set_num(dom, tick, "stroke-width", if major { 2.0 } else { 1.0 })?;
        }

        let bins = core.data()?;
        let (lo, hi) = bins.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.views), hi.max(b.views))
        });
        let r_min = (ring * 0.2).max(INNER_RADIUS);
        let r_max = ring * 0.92;
        let sectors_g = dom.append_new(dial, "g", &[("aria-label", "Duration segments")])?;
        self.sectors.clear();
        for bin in bins {
            // sqrt scale over the view extent
            let t = if hi > lo { ((bin.views - lo) / (hi - lo)).sqrt() } else { 1.0 };
            let outer_r = r_min + (r_max - r_min) * t;
            let sweep = (bin.seconds / 60.0).clamp(0.0, 1.0) * TAU;
            let d = sector_path(INNER_RADIUS, outer_r, sweep);
            let fill = ramp(&VIRIDIS, bin.seconds / 60.0);
            let seconds = fmt_num(bin.seconds);
            let node = dom.append_new(
                sectors_g,
                "path",
                &[
                    ("class", "sector"),
                    ("data-seconds", seconds.as_str()),
                    ("d", d.as_str()),
                    ("fill", fill.as_str()),
                    ("stroke", "rgba(255, 255, 255, 0.1)"),
                    ("stroke-width", "2"),
                ],
            )?;
            set_num(dom, node, "opacity", RESTING_OPACITY)?;
            self.sectors.push((node, bin.seconds));
        }

        for sec in [15.0, 30.0, 45.0, 60.0] {
            let a = sec / 60.0 * TAU - FRAC_PI_2;
            let r = ring + 25.0;
            let label = dom.append_new(dial, "text", &[("text-anchor", "middle"), ("class", "dial-label")])?;
            set_num(dom, label, "x", r * a.cos())?;
            set_num(dom, label, "y", r * a.sin())?;
            dom.set_text(label, &format!("{}s", fmt_num(sec)))?;
        }

        self.run_reveal(core, dom)
    }

    fn apply_step(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
        step: Step,
        _options: &UpdateOptions,
    ) -> TidesResult<()> {
        match step.0 {
            1 => self.highlight_range(core, dom, 15.0, 30.0),
            2 => self.show_velocity(core, dom, root),
            _ => Ok(()),
        }
    }

    fn animate(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
        name: &'static str,
        now: Millis,
    ) -> TidesResult<()> {
        match name {
            "reveal" => {
                let Some(running) = self.reveal else {
                    return Ok(());
                };
                let elapsed = now.0 - running.started.0;
                let mut done = true;
                for (i, (node, _)) in self.sectors.iter().enumerate() {
                    let t = staggered(elapsed, i, REVEAL_STAGGER_MS, REVEAL_MS);
                    done &= t >= 1.0;
                    set_num(dom, *node, "opacity", 0.6 * Ease::InOutCubic.apply(t))?;
                }
                if done {
                    core.frames.cancel(running.handle);
                    self.reveal = None;
                }
            }
            "sweep" => {
                let Some((running, line)) = self.sweep else {
                    return Ok(());
                };
                let t = ((now.0 - running.started.0) / SWEEP_MS).clamp(0.0, 1.0);
                if t >= 1.0 {
                    self.stop_sweep(core, dom);
                } else {
                    dom.set_attr(line, "transform", &format!("rotate({})", fmt_num(t * 360.0)))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn interact(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
        action: &str,
    ) -> TidesResult<()> {
        if action == "replay" {
            self.run_reveal(core, dom)?;
        }
        Ok(())
    }

    fn motion_changed(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
    ) -> TidesResult<()> {
        if core.options.reduced_motion {
            if let Some(running) = self.reveal.take() {
                core.frames.cancel(running.handle);
                for (node, _) in &self.sectors {
                    set_num(dom, *node, "opacity", RESTING_OPACITY)?;
                }
            }
            self.stop_sweep(core, dom);
        }
        Ok(())
    }

    fn transition_in(&mut self, core: &mut ChartCore<Self::Data>, dom: &mut Document, _root: NodeId) {
        if let Err(err) = self.play_glow_sweep(core, dom) {
            tracing::warn!(error = %err, "stopwatch glow sweep skipped");
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/stopwatch.rs"]
mod tests;
