//! Emotion: caption tokens as bubbles, placed by sentiment and engagement.

use std::collections::BTreeMap;

use kurbo::{Point, Vec2};

use crate::animation::ease::Ease;
use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::foundation::core::{Millis, Step, VizKey};
use crate::foundation::error::{TidesError, TidesResult};
use crate::foundation::math::fmt_num;
use crate::viz::chart::{Chart, ChartController, ChartCore, ChartTask, append_svg, set_num, staggered};
use crate::viz::contract::{UpdateOptions, VizEventKind};
use crate::viz::schedule::FrameHandle;

const PAD: f64 = 50.0;
const SETTLE_ITERATIONS: usize = 120;
const RELAX_PASSES: usize = 64;
const ENTER_MS: f64 = 800.0;
const ENTER_STAGGER_MS: f64 = 50.0;
const HIGH_ENGAGEMENT: f64 = 0.75;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmotionToken {
    pub word: String,
    pub emotion: String,
    /// `-1.0..=1.0`.
    pub sentiment: f64,
    /// `0.0..=1.0`.
    pub engagement: f64,
    pub count: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionData {
    pub tokens: Vec<EmotionToken>,
    #[serde(default)]
    pub emotion_categories: Vec<String>,
    #[serde(default)]
    pub emotion_colors: BTreeMap<String, String>,
}

/// Which quantity the bubble fill encodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLayer {
    #[default]
    Emotion,
    Sentiment,
}

#[derive(Clone, Debug)]
struct Bubble {
    word: String,
    group: NodeId,
    circle: NodeId,
    at: Point,
}

/// Bubble cloud with a settle pass instead of a live force simulation.
#[derive(Debug, Default)]
pub struct EmotionChart {
    layer: EmotionLayer,
    bubbles: Vec<Bubble>,
    enter: Option<(FrameHandle, Millis)>,
}

pub type EmotionViz = ChartController<EmotionChart>;

/// Bubble radius for a token count, sqrt-scaled into `10..=50`.
fn radius(count: f64, max_count: f64) -> f64 {
    if max_count <= 0.0 {
        return 10.0;
    }
    10.0 + 40.0 * (count.max(0.0) / max_count).sqrt()
}

/// Place bubbles near their sentiment/engagement targets without overlap.
///
/// Deterministic: each iteration pulls every bubble halfway toward its target, then pushes
/// overlapping pairs apart along their center line. Collision-only passes finish the layout.
pub fn settle(targets: &[Point], radii: &[f64]) -> Vec<Point> {
    let mut pos = targets.to_vec();
    for _ in 0..SETTLE_ITERATIONS {
        for (p, t) in pos.iter_mut().zip(targets) {
            *p = p.lerp(*t, 0.5);
        }
        separate(&mut pos, radii);
    }
    for _ in 0..RELAX_PASSES {
        if !separate(&mut pos, radii) {
            break;
        }
    }
    pos
}

/// One collision pass; returns whether anything moved.
fn separate(pos: &mut [Point], radii: &[f64]) -> bool {
    let mut moved = false;
    for i in 0..pos.len() {
        for j in (i + 1)..pos.len() {
            let delta = pos[j] - pos[i];
            let min = radii[i] + radii[j] + 2.0;
            let dist = delta.hypot();
            if dist >= min {
                continue;
            }
            let dir = if dist > 1e-9 {
                delta / dist
            } else {
                // coincident centers
                Vec2::new(1.0, 0.0)
            };
            let push = dir * ((min - dist) / 2.0);
            pos[i] -= push;
            pos[j] += push;
            moved = true;
        }
    }
    moved
}

impl EmotionChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self) -> EmotionLayer {
        self.layer
    }

    /// Bubble group for `word`.
    pub fn bubble(&self, word: &str) -> Option<NodeId> {
        self.bubbles.iter().find(|b| b.word == word).map(|b| b.group)
    }

    fn fill_for(&self, data: &EmotionData, token: &EmotionToken) -> String {
        match self.layer {
            EmotionLayer::Emotion => data
                .emotion_colors
                .get(&token.emotion)
                .cloned()
                .unwrap_or_else(|| "#888888".to_string()),
            EmotionLayer::Sentiment if token.sentiment >= 0.0 => "#00FFE0".to_string(),
            EmotionLayer::Sentiment => "#EF4444".to_string(),
        }
    }

    fn toggle_layer(&mut self, core: &mut ChartCore<EmotionData>, dom: &mut Document, root: NodeId, layer: EmotionLayer) -> TidesResult<()> {
        self.layer = layer;
        let data = core.data()?;
        for (bubble, token) in self.bubbles.iter().zip(&data.tokens) {
            dom.set_attr(bubble.circle, "fill", &self.fill_for(data, token))?;
        }
        if let Some(svg) = dom.find_by_tag(root, "svg").first().copied() {
            let name = match layer {
                EmotionLayer::Emotion => "emotion",
                EmotionLayer::Sentiment => "sentiment",
            };
            dom.set_attr(svg, "data-layer", name)?;
        }
        Ok(())
    }

    fn highlight_engagement(&mut self, core: &mut ChartCore<EmotionData>, dom: &mut Document) -> TidesResult<()> {
        let mut lit = Vec::new();
        for (bubble, token) in self.bubbles.iter().zip(&core.data()?.tokens) {
            let high = token.engagement > HIGH_ENGAGEMENT;
            set_num(dom, bubble.group, "opacity", if high { 1.0 } else { 0.3 })?;
            if high {
                lit.push(token.word.clone());
            }
        }
        core.highlights = lit;
        Ok(())
    }

    fn place_all(&self, dom: &mut Document, progress: impl Fn(usize) -> f64, from: Point) -> TidesResult<()> {
        for (i, bubble) in self.bubbles.iter().enumerate() {
            let p = from.lerp(bubble.at, progress(i));
            dom.set_attr(bubble.group, "transform", &format!("translate({}, {})", fmt_num(p.x), fmt_num(p.y)))?;
        }
        Ok(())
    }

    fn emphasize_outlines(&self, dom: &mut Document) -> TidesResult<()> {
        for bubble in &self.bubbles {
            dom.set_attr(bubble.circle, "stroke-width", "3")?;
        }
        Ok(())
    }
}

impl Chart for EmotionChart {
    type Data = EmotionData;

    const KEY: VizKey = VizKey::Emotion;
    const DATASET: &'static str = "data/emotion_tokens.json";

    fn sample_data() -> Self::Data {
        let token = |word: &str, emotion: &str, sentiment: f64, engagement: f64, count: f64| EmotionToken {
            word: word.to_string(),
            emotion: emotion.to_string(),
            sentiment,
            engagement,
            count,
        };
        EmotionData {
            tokens: vec![
                token("amazing", "joy", 0.9, 0.85, 1523.0),
                token("love", "joy", 0.8, 0.78, 2341.0),
                token("excited", "surprise", 0.7, 0.72, 892.0),
                token("sad", "sadness", -0.6, 0.65, 567.0),
                token("angry", "anger", -0.8, 0.82, 423.0),
                token("fear", "fear", -0.7, 0.68, 334.0),
                token("disgusting", "disgust", -0.9, 0.71, 234.0),
                token("beautiful", "joy", 0.85, 0.88, 1892.0),
                token("terrible", "fear", -0.75, 0.69, 445.0),
                token("wow", "surprise", 0.6, 0.75, 1234.0),
            ],
            emotion_categories: ["joy", "surprise", "sadness", "anger", "fear", "disgust"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            emotion_colors: [
                ("joy", "#FFEB3B"),
                ("surprise", "#00FFE0"),
                ("sadness", "#3B82F6"),
                ("anger", "#EF4444"),
                ("fear", "#8B5CF6"),
                ("disgust", "#10B981"),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }

    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()> {
        let (width, height) = (core.options.width, core.options.height);
        let svg = append_svg(dom, root, &core.options, "Bubble cloud showing emotion and engagement correlation")?;
        dom.set_attr(svg, "data-layer", "emotion")?;

        let data = core.data()?;
        let max_count = data.tokens.iter().map(|t| t.count).fold(0.0, f64::max);
        let radii: Vec<f64> = data.tokens.iter().map(|t| radius(t.count, max_count)).collect();
        let targets: Vec<Point> = data
            .tokens
            .iter()
            .map(|t| {
                let x = PAD + (t.sentiment.clamp(-1.0, 1.0) + 1.0) / 2.0 * (width - 2.0 * PAD);
                let y = height - PAD - t.engagement.clamp(0.0, 1.0) * (height - 2.0 * PAD);
                Point::new(x, y)
            })
            .collect();
        let placed = settle(&targets, &radii);

        self.bubbles.clear();
        for ((token, at), r) in data.tokens.iter().zip(placed).zip(&radii) {
            let group = dom.append_new(svg, "g", &[("class", "bubble"), ("data-word", token.word.as_str())])?;
            let circle = dom.append_new(group, "circle", &[("opacity", "0.7"), ("stroke-width", "1")])?;
            set_num(dom, circle, "r", *r)?;
            dom.set_attr(circle, "fill", &self.fill_for(data, token))?;
            let label = dom.append_new(group, "text", &[("text-anchor", "middle"), ("pointer-events", "none")])?;
            dom.set_attr(label, "font-size", &format!("{}px", fmt_num((r / 3.0).min(14.0))))?;
            dom.set_text(label, &token.word)?;
            dom.listen(
                group,
                DomEventKind::Click,
                Interaction::Viz {
                    viz: VizKey::Emotion,
                    action: format!("bubble:{}", token.word),
                },
            )?;
            self.bubbles.push(Bubble {
                word: token.word.clone(),
                group,
                circle,
                at,
            });
        }

        let x_label = dom.append_new(svg, "text", &[("class", "axis-label"), ("text-anchor", "middle")])?;
        set_num(dom, x_label, "x", width / 2.0)?;
        set_num(dom, x_label, "y", height - 10.0)?;
        dom.set_text(x_label, "Negative Sentiment | Positive Sentiment")?;
        let y_label = dom.append_new(svg, "text", &[("class", "axis-label"), ("text-anchor", "middle"), ("x", "20")])?;
        set_num(dom, y_label, "y", height / 2.0)?;
        dom.set_attr(y_label, "transform", &format!("rotate(-90, 20, {})", fmt_num(height / 2.0)))?;
        dom.set_text(y_label, "Engagement Rate")?;

        if core.options.reduced_motion {
            self.place_all(dom, |_| 1.0, Point::ZERO)?;
        } else {
            self.place_all(dom, |_| 0.0, Point::new(width / 2.0, height / 2.0))?;
            self.enter = Some((core.frames.every_frame(ChartTask::Animate("enter")), core.frames.now()));
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
            9 => self.toggle_layer(core, dom, root, EmotionLayer::Sentiment),
            10 => self.highlight_engagement(core, dom),
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
        if name != "enter" {
            return Ok(());
        }
        let Some((handle, started)) = self.enter else {
            return Ok(());
        };
        let elapsed = now.0 - started.0;
        let center = Point::new(core.options.width / 2.0, core.options.height / 2.0);
        self.place_all(
            dom,
            |i| Ease::InOutCubic.apply(staggered(elapsed, i, ENTER_STAGGER_MS, ENTER_MS)),
            center,
        )?;
        let last = self.bubbles.len().saturating_sub(1);
        if staggered(elapsed, last, ENTER_STAGGER_MS, ENTER_MS) >= 1.0 {
            core.frames.cancel(handle);
            self.enter = None;
        }
        Ok(())
    }

    fn interact(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        _dom: &mut Document,
        _root: NodeId,
        action: &str,
    ) -> TidesResult<()> {
        let Some(word) = action.strip_prefix("bubble:") else {
            return Ok(());
        };
        let Some(token) = core.data()?.tokens.iter().find(|t| t.word == word) else {
            return Ok(());
        };
        let payload = serde_json::to_value(token).map_err(|e| TidesError::serde(e.to_string()))?;
        core.emit_with(VizEventKind::BubbleClick, payload);
        Ok(())
    }

    fn motion_changed(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
    ) -> TidesResult<()> {
        if !core.options.reduced_motion {
            return Ok(());
        }
        if let Some((handle, _)) = self.enter.take() {
            core.frames.cancel(handle);
            self.place_all(dom, |_| 1.0, Point::ZERO)?;
        }
        self.emphasize_outlines(dom)
    }

    fn reset(&mut self) {
        self.bubbles.clear();
        self.enter = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/emotion.rs"]
mod tests;
