//! Community: network of communities and the sounds they share.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;

use kurbo::{Point, Vec2};

use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::foundation::core::{Step, VizKey};
use crate::foundation::error::TidesResult;
use crate::foundation::math::{Rng64, fmt_num};
use crate::viz::chart::{Chart, ChartController, ChartCore, append_svg, set_num};
use crate::viz::contract::{UpdateOptions, VizEventKind};

const LAYOUT_SEED: u64 = 0x5eed_c0de;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetNodeKind {
    Community,
    Sound,
}

impl NetNodeKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::Sound => "sound",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NetNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NetNodeKind,
    /// Community video count.
    #[serde(default)]
    pub size: Option<f64>,
    /// Sound display name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_weeks: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NetLink {
    pub source: String,
    pub target: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Network {
    pub nodes: Vec<NetNode>,
    pub links: Vec<NetLink>,
}

impl Network {
    /// `id` plus every node sharing a link with it.
    pub fn connected(&self, id: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::from([id.to_string()]);
        for link in &self.links {
            if link.source == id {
                out.insert(link.target.clone());
            }
            if link.target == id {
                out.insert(link.source.clone());
            }
        }
        out
    }
}

/// Static network layout: communities on an outer ring, sounds pulled toward the communities
/// that use them.
pub fn layout(network: &Network, width: f64, height: f64) -> BTreeMap<String, Point> {
    let center = Point::new(width / 2.0, height / 2.0);
    let ring = width.min(height) * 0.35;
    let communities: Vec<&NetNode> = network
        .nodes
        .iter()
        .filter(|n| n.kind == NetNodeKind::Community)
        .collect();
    let mut out = BTreeMap::new();
    for (i, node) in communities.iter().enumerate() {
        let a = i as f64 / communities.len() as f64 * TAU;
        out.insert(node.id.clone(), center + Vec2::new(ring * a.cos(), ring * a.sin()));
    }
    for node in network.nodes.iter().filter(|n| n.kind == NetNodeKind::Sound) {
        let anchors: Vec<Point> = network
            .connected(&node.id)
            .iter()
            .filter_map(|id| out.get(id).copied())
            .collect();
        let mean = if anchors.is_empty() {
            center
        } else {
            let sum = anchors.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
            (sum / anchors.len() as f64).to_point()
        };
        let mut rng = Rng64::for_key(LAYOUT_SEED, &node.id);
        let jitter = Vec2::new(rng.range(-20.0, 20.0), rng.range(-20.0, 20.0));
        out.insert(node.id.clone(), center.lerp(mean, 0.5) + jitter);
    }
    out
}

/// Network diagram with hover highlighting and community filtering.
#[derive(Debug, Default)]
pub struct CommunityChart {
    nodes: BTreeMap<String, NodeId>,
}

pub type CommunityViz = ChartController<CommunityChart>;

impl CommunityChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node group drawn for network node `id`.
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).copied()
    }

    fn fade_except(&self, dom: &mut Document, keep: &BTreeSet<String>, dim: f64) -> TidesResult<()> {
        for (id, node) in &self.nodes {
            set_num(dom, *node, "opacity", if keep.contains(id) { 1.0 } else { dim })?;
        }
        Ok(())
    }

    fn filter_by_community(&mut self, core: &mut ChartCore<Network>, dom: &mut Document, id: &str) -> TidesResult<()> {
        let keep = core.data()?.connected(id);
        self.fade_except(dom, &keep, 0.2)?;
        core.highlights = keep.into_iter().collect();
        Ok(())
    }

    fn highlight_sounds(&mut self, core: &mut ChartCore<Network>, dom: &mut Document, root: NodeId) -> TidesResult<()> {
        for rect in dom.find_by_class(root, "sound-rect") {
            dom.set_attr(rect, "opacity", "1")?;
            dom.add_class(rect, "glow")?;
        }
        core.highlights = core
            .data()?
            .nodes
            .iter()
            .filter(|n| n.kind == NetNodeKind::Sound)
            .map(|n| n.id.clone())
            .collect();
        Ok(())
    }
}

impl Chart for CommunityChart {
    type Data = Network;

    const KEY: VizKey = VizKey::Community;
    const DATASET: &'static str = "data/community_network.json";

    fn sample_data() -> Self::Data {
        let community = |id: &str, size: f64| NetNode {
            id: id.to_string(),
            kind: NetNodeKind::Community,
            size: Some(size),
            name: None,
            duration_weeks: None,
        };
        let sound = |id: &str, name: &str, weeks: f64| NetNode {
            id: id.to_string(),
            kind: NetNodeKind::Sound,
            size: None,
            name: Some(name.to_string()),
            duration_weeks: Some(weeks),
        };
        let link = |source: &str, target: &str, value: f64| NetLink {
            source: source.to_string(),
            target: target.to_string(),
            value,
        };
        Network {
            nodes: vec![
                community("BookTok", 450_230.0),
                community("FoodTok", 382_190.0),
                community("CleanTok", 234_560.0),
                community("FitTok", 567_230.0),
                sound("sound1", "Trending Audio 1", 8.0),
                sound("sound2", "Viral Beat", 12.0),
                sound("sound3", "Dance Track", 6.0),
            ],
            links: vec![
                link("BookTok", "sound1", 0.8),
                link("FoodTok", "sound2", 0.6),
                link("CleanTok", "sound3", 0.7),
                link("FitTok", "sound1", 0.5),
                link("BookTok", "sound2", 0.4),
            ],
        }
    }

    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()> {
        let svg = append_svg(
            dom,
            root,
            &core.options,
            "Network visualization showing community and sound connections",
        )?;
        let g = dom.append_new(svg, "g", &[])?;
        let links_g = dom.append_new(g, "g", &[("class", "links")])?;
        let nodes_g = dom.append_new(g, "g", &[("class", "nodes")])?;

        let network = core.data()?;
        let positions = layout(network, core.options.width, core.options.height);
        let max_size = network
            .nodes
            .iter()
            .filter_map(|n| n.size)
            .fold(0.0_f64, f64::max);

        for link in &network.links {
            let (Some(a), Some(b)) = (positions.get(&link.source), positions.get(&link.target)) else {
                tracing::debug!(source = %link.source, target = %link.target, "dangling link skipped");
                continue;
            };
            let line = dom.append_new(links_g, "line", &[("class", "link"), ("opacity", "0.3")])?;
            set_num(dom, line, "x1", a.x)?;
            set_num(dom, line, "y1", a.y)?;
            set_num(dom, line, "x2", b.x)?;
            set_num(dom, line, "y2", b.y)?;
            set_num(dom, line, "stroke-width", 1.0 + 4.0 * link.value.clamp(0.0, 1.0))?;
        }

        self.nodes.clear();
        for node in &network.nodes {
            let Some(p) = positions.get(&node.id) else {
                continue;
            };
            let class = format!("node {}", node.kind.as_str());
            let transform = format!("translate({}, {})", fmt_num(p.x), fmt_num(p.y));
            let group = dom.append_new(
                nodes_g,
                "g",
                &[
                    ("class", class.as_str()),
                    ("data-id", node.id.as_str()),
                    ("transform", transform.as_str()),
                ],
            )?;
            match node.kind {
                NetNodeKind::Community => {
                    let r = match (node.size, max_size > 0.0) {
                        (Some(size), true) => 20.0 + 40.0 * (size / max_size).sqrt(),
                        _ => 20.0,
                    };
                    let circle = dom.append_new(group, "circle", &[("class", "community-circle")])?;
                    set_num(dom, circle, "r", r)?;
                }
                NetNodeKind::Sound => {
                    dom.append_new(
                        group,
                        "rect",
                        &[
                            ("class", "sound-rect"),
                            ("x", "-15"),
                            ("y", "-15"),
                            ("width", "30"),
                            ("height", "30"),
                            ("rx", "6"),
                            ("opacity", "0.8"),
                        ],
                    )?;
                }
            }
            let label = dom.append_new(group, "text", &[("text-anchor", "middle")])?;
            let short: String = node.id.chars().take(10).collect();
            dom.set_text(label, &short)?;

            for (kind, action) in [
                (DomEventKind::MouseEnter, format!("hover:{}", node.id)),
                (DomEventKind::MouseLeave, "unhover".to_string()),
            ] {
                dom.listen(
                    group,
                    kind,
                    Interaction::Viz {
                        viz: VizKey::Community,
                        action,
                    },
                )?;
            }
            self.nodes.insert(node.id.clone(), group);
        }
        Ok(())
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
            5 => self.filter_by_community(core, dom, "BookTok"),
            6 => self.highlight_sounds(core, dom, root),
            _ => Ok(()),
        }
    }

    fn interact(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
        action: &str,
    ) -> TidesResult<()> {
        if action == "unhover" {
            let all: BTreeSet<String> = self.nodes.keys().cloned().collect();
            return self.fade_except(dom, &all, 1.0);
        }
        let Some(id) = action.strip_prefix("hover:") else {
            return Ok(());
        };
        let network = core.data()?;
        let keep = network.connected(id);
        let sound = network
            .nodes
            .iter()
            .find(|n| n.id == id && n.kind == NetNodeKind::Sound)
            .map(|n| serde_json::json!({ "sound": n.id, "name": n.name }));
        self.fade_except(dom, &keep, 0.3)?;
        if let Some(payload) = sound {
            core.emit_with(VizEventKind::HoverAudio, payload);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/community.rs"]
mod tests;
