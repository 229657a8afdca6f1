//! Ranking: community leaderboard under a forest canopy, with topic leaves to open.

use crate::animation::ease::Ease;
use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::foundation::core::{Millis, Step, VizKey};
use crate::foundation::error::TidesResult;
use crate::foundation::math::{Rng64, fmt_num};
use crate::viz::chart::{Chart, ChartController, ChartCore, ChartTask, append_svg, set_num, staggered};
use crate::viz::contract::{UpdateOptions, VizEventKind};
use crate::viz::schedule::FrameHandle;

const MARGIN_LEFT: f64 = 100.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_Y: f64 = 60.0;
const GROW_MS: f64 = 1000.0;
const GROW_STAGGER_MS: f64 = 100.0;
const CANOPY_SEED: u64 = 0xf0_7e57;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommunityRank {
    pub name: String,
    pub videos: f64,
    pub engagement: f64,
    pub rank: u32,
    pub topics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevivalPattern {
    pub trend: String,
    pub original_peak: String,
    pub revival: String,
    pub strength: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rankings {
    pub communities: Vec<CommunityRank>,
    #[serde(default)]
    pub revival_patterns: Vec<RevivalPattern>,
}

/// Quantity the bars encode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMetric {
    #[default]
    Videos,
    Engagement,
}

impl RankMetric {
    fn value(self, c: &CommunityRank) -> f64 {
        match self {
            Self::Videos => c.videos,
            Self::Engagement => c.engagement,
        }
    }
}

#[derive(Clone, Debug)]
struct Bar {
    name: String,
    value_bar: NodeId,
    leaf: NodeId,
    topics: NodeId,
}

/// Horizontal bar ranking with a grow-in animation.
#[derive(Debug, Default)]
pub struct RankingChart {
    metric: RankMetric,
    inner_width: f64,
    bars: Vec<Bar>,
    canopy: Option<NodeId>,
    revival: Option<NodeId>,
    grow: Option<(FrameHandle, Millis)>,
}

pub type RankingViz = ChartController<RankingChart>;

impl RankingChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(&self) -> RankMetric {
        self.metric
    }

    /// Value bar for community `name`.
    pub fn value_bar(&self, name: &str) -> Option<NodeId> {
        self.bars.iter().find(|b| b.name == name).map(|b| b.value_bar)
    }

    /// Target widths for the current metric, in bar order.
    fn target_widths(&self, data: &Rankings) -> Vec<f64> {
        let max = match self.metric {
            // engagement rates share a fixed 0..10% axis
            RankMetric::Engagement => 0.1,
            RankMetric::Videos => data.communities.iter().map(|c| c.videos).fold(0.0, f64::max),
        };
        data.communities
            .iter()
            .map(|c| {
                if max > 0.0 {
                    (self.metric.value(c) / max).clamp(0.0, 1.0) * self.inner_width
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn set_widths(&self, dom: &mut Document, widths: &[f64], progress: impl Fn(usize) -> f64) -> TidesResult<()> {
        for (i, (bar, w)) in self.bars.iter().zip(widths).enumerate() {
            set_num(dom, bar.value_bar, "width", w * progress(i))?;
        }
        Ok(())
    }

    fn start_grow(&mut self, core: &mut ChartCore<Rankings>, dom: &mut Document) -> TidesResult<()> {
        if let Some((handle, _)) = self.grow.take() {
            core.frames.cancel(handle);
        }
        let widths = self.target_widths(core.data()?);
        if core.options.reduced_motion {
            return self.set_widths(dom, &widths, |_| 1.0);
        }
        self.set_widths(dom, &widths, |_| 0.0)?;
        self.grow = Some((core.frames.every_frame(ChartTask::Animate("grow")), core.frames.now()));
        Ok(())
    }

    fn update_metric(&mut self, core: &mut ChartCore<Rankings>, dom: &mut Document, metric: RankMetric) -> TidesResult<()> {
        self.metric = metric;
        if let Some((handle, _)) = self.grow.take() {
            core.frames.cancel(handle);
        }
        let widths = self.target_widths(core.data()?);
        self.set_widths(dom, &widths, |_| 1.0)?;
        core.emit_with(VizEventKind::KpiChange, serde_json::json!({ "metric": metric }));
        Ok(())
    }

    fn show_revival(&mut self, core: &mut ChartCore<Rankings>, dom: &mut Document, root: NodeId) -> TidesResult<()> {
        if self.revival.is_none() {
            let panel = dom.append_new(root, "ul", &[("class", "revival-patterns")])?;
            for p in &core.data()?.revival_patterns {
                let item = dom.append_new(panel, "li", &[("class", "revival")])?;
                set_num(dom, item, "data-strength", p.strength)?;
                let text = format!("{}: peak {}, revival {}", p.trend, p.original_peak, p.revival);
                dom.set_text(item, &text)?;
            }
            self.revival = Some(panel);
        }
        core.highlights = core.data()?.revival_patterns.iter().map(|p| p.trend.clone()).collect();
        Ok(())
    }

    fn reveal_leaf(&mut self, core: &mut ChartCore<Rankings>, dom: &mut Document, name: &str) -> TidesResult<()> {
        let Some(bar) = self.bars.iter().find(|b| b.name == name) else {
            return Ok(());
        };
        if !core.options.reduced_motion {
            dom.set_attr(bar.leaf, "transform", "rotate(15)")?;
            dom.set_attr(bar.leaf, "opacity", "0.3")?;
        }
        dom.set_attr(bar.topics, "opacity", "1")?;
        let topics = core
            .data()?
            .communities
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.topics.clone())
            .unwrap_or_default();
        core.emit_with(
            VizEventKind::LeafReveal,
            serde_json::json!({ "community": name, "topics": topics }),
        );
        Ok(())
    }

    fn draw_canopy(&mut self, dom: &mut Document, svg: NodeId, width: f64, height: f64) -> TidesResult<()> {
        let canopy = dom.append_new(svg, "g", &[("class", "canopy-bg"), ("opacity", "0.1")])?;
        let d = format!(
            "M 0,{} Q {},{} {},{} T {},{} L {},0 L 0,0 Z",
            fmt_num(height * 0.3),
            fmt_num(width * 0.25),
            fmt_num(height * 0.2),
            fmt_num(width * 0.5),
            fmt_num(height * 0.25),
            fmt_num(width),
            fmt_num(height * 0.3),
            fmt_num(width),
        );
        dom.append_new(canopy, "path", &[("d", d.as_str()), ("opacity", "0.05")])?;
        let mut rng = Rng64::new(CANOPY_SEED);
        for _ in 0..20 {
            let transform = format!(
                "translate({}, {}) rotate({})",
                fmt_num(rng.range(0.0, width)),
                fmt_num(rng.range(0.0, height * 0.3)),
                fmt_num(rng.range(0.0, 360.0)),
            );
            dom.append_new(
                canopy,
                "path",
                &[
                    ("class", "canopy-leaf"),
                    ("d", "M0,0 Q5,-10 10,-5 T15,0 Q10,5 5,0 Z"),
                    ("transform", transform.as_str()),
                    ("opacity", "0.1"),
                ],
            )?;
        }
        self.canopy = Some(canopy);
        Ok(())
    }
}

impl Chart for RankingChart {
    type Data = Rankings;

    const KEY: VizKey = VizKey::Ranking;
    const DATASET: &'static str = "data/community_rankings.json";

    fn sample_data() -> Self::Data {
        let community = |name: &str, videos: f64, engagement: f64, rank: u32, topics: [&str; 3]| CommunityRank {
            name: name.to_string(),
            videos,
            engagement,
            rank,
            topics: topics.iter().map(|t| t.to_string()).collect(),
        };
        let revival = |trend: &str, original_peak: &str, revival: &str, strength: f64| RevivalPattern {
            trend: trend.to_string(),
            original_peak: original_peak.to_string(),
            revival: revival.to_string(),
            strength,
        };
        Rankings {
            communities: vec![
                community("BookTok", 450_230.0, 0.0823, 1, ["romance", "fantasy", "thriller"]),
                community("FoodTok", 382_190.0, 0.0756, 2, ["recipes", "restaurants", "cooking"]),
                community("CleanTok", 234_560.0, 0.0698, 3, ["organizing", "cleaning", "minimalism"]),
                community("FitTok", 567_230.0, 0.0912, 4, ["workout", "nutrition", "wellness"]),
                community("ArtTok", 189_230.0, 0.0654, 5, ["painting", "digital", "crafts"]),
            ],
            revival_patterns: vec![
                revival("Y2K Fashion", "2021-03", "2023-08", 0.7),
                revival("Cottagecore", "2020-06", "2023-04", 0.6),
            ],
        }
    }

    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()> {
        let (width, height) = (core.options.width, core.options.height);
        let svg = append_svg(dom, root, &core.options, "Community ranking visualization with topic breakdown")?;
        self.draw_canopy(dom, svg, width, height)?;

        let translate = format!("translate({}, {})", fmt_num(MARGIN_LEFT), fmt_num(MARGIN_Y));
        let g = dom.append_new(svg, "g", &[("transform", translate.as_str())])?;
        self.inner_width = (width - MARGIN_LEFT - MARGIN_RIGHT).max(0.0);
        let inner_height = (height - 2.0 * MARGIN_Y).max(0.0);
        let leaves = dom.append_new(g, "g", &[("class", "falling-leaves")])?;

        let data = core.data()?;
        let n = data.communities.len().max(1) as f64;
        // band scale with 20% padding
        let band = inner_height / n;
        let bar_h = band * 0.8;
        self.bars.clear();
        for (i, c) in data.communities.iter().enumerate() {
            let y = i as f64 * band + band * 0.1;
            let row_t = format!("translate(0, {})", fmt_num(y));
            let row = dom.append_new(
                g,
                "g",
                &[("class", "ranking-bar"), ("data-name", c.name.as_str()), ("transform", row_t.as_str())],
            )?;
            let bg = dom.append_new(row, "rect", &[("class", "bar-bg"), ("opacity", "0.3")])?;
            set_num(dom, bg, "width", self.inner_width)?;
            set_num(dom, bg, "height", bar_h)?;
            let value_bar = dom.append_new(row, "rect", &[("class", "value-bar"), ("width", "0"), ("opacity", "0.7")])?;
            set_num(dom, value_bar, "height", bar_h)?;
            let label = dom.append_new(row, "text", &[("x", "-10"), ("text-anchor", "end")])?;
            set_num(dom, label, "y", bar_h / 2.0)?;
            dom.set_text(label, &c.name)?;
            let value = dom.append_new(row, "text", &[("class", "engagement-value")])?;
            set_num(dom, value, "y", bar_h / 2.0)?;
            dom.set_text(value, &format!("{:.1}%", c.engagement * 100.0))?;

            let leaf_t = format!("translate({}, {})", fmt_num(self.inner_width - 100.0), fmt_num(i as f64 * inner_height / 5.0));
            let leaf_group = dom.append_new(leaves, "g", &[("class", "leaf-group"), ("transform", leaf_t.as_str())])?;
            let leaf = dom.append_new(
                leaf_group,
                "path",
                &[("class", "leaf"), ("d", "M0,0 Q10,-20 20,-10 T30,0 Q20,10 10,0 Z"), ("opacity", "0.6")],
            )?;
            let topics = dom.append_new(leaf_group, "text", &[("class", "leaf-topics"), ("x", "40"), ("opacity", "0")])?;
            dom.set_text(topics, &c.topics.join(", "))?;
            dom.listen(
                leaf,
                DomEventKind::Click,
                Interaction::Viz {
                    viz: VizKey::Ranking,
                    action: format!("leaf:{}", c.name),
                },
            )?;
            self.bars.push(Bar {
                name: c.name.clone(),
                value_bar,
                leaf,
                topics,
            });
        }
        self.start_grow(core, dom)
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
            7 => self.update_metric(core, dom, RankMetric::Engagement),
            8 => self.show_revival(core, dom, root),
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
        if name != "grow" {
            return Ok(());
        }
        let Some((handle, started)) = self.grow else {
            return Ok(());
        };
        let elapsed = now.0 - started.0;
        let widths = self.target_widths(core.data()?);
        self.set_widths(dom, &widths, |i| {
            Ease::InOutCubic.apply(staggered(elapsed, i, GROW_STAGGER_MS, GROW_MS))
        })?;
        let last = self.bars.len().saturating_sub(1);
        if staggered(elapsed, last, GROW_STAGGER_MS, GROW_MS) >= 1.0 {
            core.frames.cancel(handle);
            self.grow = None;
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
        match action.strip_prefix("leaf:") {
            Some(name) => self.reveal_leaf(core, dom, name),
            None => Ok(()),
        }
    }

    fn motion_changed(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
    ) -> TidesResult<()> {
        if core.options.reduced_motion {
            if let Some((handle, _)) = self.grow.take() {
                core.frames.cancel(handle);
                let widths = self.target_widths(core.data()?);
                self.set_widths(dom, &widths, |_| 1.0)?;
            }
        }
        Ok(())
    }

    fn transition_in(&mut self, _core: &mut ChartCore<Self::Data>, dom: &mut Document, _root: NodeId) {
        if let Some(canopy) = self.canopy {
            if let Err(err) = dom.set_attr(canopy, "opacity", "0.2") {
                tracing::warn!(error = %err, "canopy reveal skipped");
            }
        }
    }

    fn transition_out(&mut self, core: &mut ChartCore<Self::Data>, dom: &mut Document, _root: NodeId) {
        if core.options.reduced_motion {
            return;
        }
        for bar in &self.bars {
            if let Err(err) = dom.set_attr(bar.leaf, "opacity", "0") {
                tracing::warn!(error = %err, "leaf fade skipped");
            }
        }
    }

    fn reset(&mut self) {
        self.bars.clear();
        self.canopy = None;
        self.revival = None;
        self.grow = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/ranking.rs"]
mod tests;
