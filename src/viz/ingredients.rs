//! Ingredients: card grid of viral-recipe factors with a compare-impact quiz modal.

use std::collections::BTreeSet;

use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::foundation::core::{Millis, Step, VizKey};
use crate::foundation::error::TidesResult;
use crate::foundation::math::fmt_num;
use crate::viz::chart::{Chart, ChartController, ChartCore, ChartTask, staggered};
use crate::viz::contract::{UpdateOptions, VizEventKind};
use crate::viz::schedule::FrameHandle;

const KEY_INGREDIENTS: [&str; 3] = ["sound_reuse", "video_length_bucket", "caption_emotion_family"];
const CARD_STAGGER_MS: f64 = 50.0;
const CARD_MS: f64 = 400.0;
const PROMPT_VISIBLE_MS: f64 = 5000.0;
const PROMPT_FADE_MS: f64 = 400.0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImpactMetrics {
    pub views: String,
    pub shares: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ingredient {
    pub ingredient: String,
    pub label: String,
    pub icon: String,
    pub description: String,
    pub with: ImpactMetrics,
    pub without: ImpactMetrics,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
struct Modal {
    node: NodeId,
    name: NodeId,
    with_views: NodeId,
    without_views: NodeId,
    comparison_with: NodeId,
    guess: NodeId,
}

/// Ingredient cards; the quiz modal is a shell filled on open.
#[derive(Debug, Default)]
pub struct IngredientsChart {
    cards: Vec<(String, NodeId)>,
    modal: Option<Modal>,
    selected: Option<String>,
    guesses: BTreeSet<String>,
    cards_in: Option<(FrameHandle, Millis)>,
}

pub type IngredientsViz = ChartController<IngredientsChart>;

impl IngredientsChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card node for ingredient key `key`.
    pub fn card(&self, key: &str) -> Option<NodeId> {
        self.cards.iter().find(|(k, _)| k == key).map(|(_, n)| *n)
    }

    pub fn quiz_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Ingredients a guess was recorded for.
    pub fn guesses(&self) -> &BTreeSet<String> {
        &self.guesses
    }

    fn build_modal(&mut self, dom: &mut Document, root: NodeId) -> TidesResult<()> {
        let node = dom.append_new(
            root,
            "div",
            &[("class", "quiz-modal"), ("role", "dialog"), ("aria-hidden", "true")],
        )?;
        let content = dom.append_new(node, "div", &[("class", "quiz-content")])?;
        let close = dom.append_new(content, "button", &[("class", "quiz-close"), ("aria-label", "Close quiz")])?;
        let title = dom.append_new(content, "h2", &[])?;
        dom.set_text(title, "Test Your Intuition")?;
        let name = dom.append_new(content, "h3", &[("class", "quiz-ingredient-name")])?;
        let comparison_with = dom.append_new(content, "div", &[("class", "comparison-with")])?;
        let with_views = dom.append_new(comparison_with, "span", &[("class", "metric-value")])?;
        let comparison_without = dom.append_new(content, "div", &[("class", "comparison-without")])?;
        let without_views = dom.append_new(comparison_without, "span", &[("class", "metric-value")])?;
        let guess = dom.append_new(content, "button", &[("class", "quiz-guess")])?;
        dom.set_text(guess, "Make Your Guess First")?;
        let reveal = dom.append_new(content, "button", &[("class", "quiz-reveal")])?;
        dom.set_text(reveal, "Reveal Impact")?;

        for (node, action) in [(close, "close"), (guess, "guess"), (reveal, "reveal")] {
            dom.listen(
                node,
                DomEventKind::Click,
                Interaction::Viz {
                    viz: VizKey::Ingredients,
                    action: action.to_string(),
                },
            )?;
        }
        self.modal = Some(Modal {
            node,
            name,
            with_views,
            without_views,
            comparison_with,
            guess,
        });
        Ok(())
    }

    fn open_quiz(&mut self, core: &mut ChartCore<Vec<Ingredient>>, dom: &mut Document, key: &str) -> TidesResult<()> {
        let Some(modal) = self.modal else {
            return Ok(());
        };
        let Some(item) = core.data()?.iter().find(|i| i.ingredient == key) else {
            return Ok(());
        };
        dom.set_text(modal.name, &item.label)?;
        dom.set_text(modal.with_views, &item.with.views)?;
        dom.set_text(modal.without_views, &item.without.views)?;
        dom.remove_class(modal.comparison_with, "winner")?;
        let guessed = self.guesses.contains(key);
        dom.set_text(modal.guess, if guessed { "Guess Recorded" } else { "Make Your Guess First" })?;
        if guessed {
            dom.set_attr(modal.guess, "disabled", "true")?;
        } else {
            dom.remove_attr(modal.guess, "disabled");
        }
        dom.set_attr(modal.node, "aria-hidden", "false")?;
        dom.add_class(modal.node, "active")?;
        let label = item.label.clone();
        self.selected = Some(key.to_string());
        core.emit_with(VizEventKind::QuizOpened, serde_json::json!({ "ingredient": label }));
        Ok(())
    }

    fn close_quiz(&mut self, core: &mut ChartCore<Vec<Ingredient>>, dom: &mut Document) -> TidesResult<()> {
        let (Some(modal), Some(_)) = (self.modal, self.selected.take()) else {
            return Ok(());
        };
        dom.remove_class(modal.node, "active")?;
        dom.set_attr(modal.node, "aria-hidden", "true")?;
        core.emit(VizEventKind::QuizClosed);
        Ok(())
    }

    fn record_guess(&mut self, dom: &mut Document) -> TidesResult<()> {
        let (Some(modal), Some(key)) = (self.modal, self.selected.clone()) else {
            return Ok(());
        };
        self.guesses.insert(key);
        dom.set_text(modal.guess, "Guess Recorded")?;
        dom.set_attr(modal.guess, "disabled", "true")
    }

    fn reveal_answer(&mut self, core: &mut ChartCore<Vec<Ingredient>>, dom: &mut Document) -> TidesResult<()> {
        let (Some(modal), Some(key)) = (self.modal, self.selected.as_deref()) else {
            return Ok(());
        };
        dom.add_class(modal.comparison_with, "winner")?;
        let label = core
            .data()?
            .iter()
            .find(|i| i.ingredient == key)
            .map(|i| i.label.clone());
        core.emit_with(VizEventKind::AnswerRevealed, serde_json::json!({ "ingredient": label }));
        Ok(())
    }

    fn highlight_key(&mut self, core: &mut ChartCore<Vec<Ingredient>>, dom: &mut Document) -> TidesResult<()> {
        core.highlights.clear();
        for key in KEY_INGREDIENTS {
            if let Some(card) = self.card(key) {
                dom.add_class(card, "highlighted")?;
                core.highlights.push(key.to_string());
            }
        }
        Ok(())
    }

    fn show_prompt(&mut self, core: &mut ChartCore<Vec<Ingredient>>, dom: &mut Document, root: NodeId) -> TidesResult<()> {
        let prompt = dom.create_element("div");
        dom.set_attr(prompt, "class", "quiz-prompt")?;
        dom.set_text(
            prompt,
            "Ready to build your viral recipe? Click any ingredient to test your intuition!",
        )?;
        dom.prepend_child(root, prompt)?;
        core.frames.after(
            PROMPT_VISIBLE_MS,
            ChartTask::SetAttr {
                node: prompt,
                name: "style",
                value: "opacity: 0".to_string(),
            },
        );
        core.frames.after(PROMPT_VISIBLE_MS + PROMPT_FADE_MS, ChartTask::RemoveNode(prompt));
        Ok(())
    }

    fn set_card_progress(&self, dom: &mut Document, progress: impl Fn(usize) -> f64) -> TidesResult<()> {
        for (i, (_, card)) in self.cards.iter().enumerate() {
            let t = progress(i);
            let style = format!(
                "opacity: {}; transform: translateY({}px)",
                fmt_num(t),
                fmt_num(20.0 * (1.0 - t)),
            );
            dom.set_attr(*card, "style", &style)?;
        }
        Ok(())
    }
}

fn sample(
    ingredient: &str,
    label: &str,
    icon: &str,
    description: &str,
    with: (&str, &str),
    without: (&str, &str),
    examples: &[&str],
) -> Ingredient {
    let metrics = |(views, shares): (&str, &str)| ImpactMetrics {
        views: views.to_string(),
        shares: shares.to_string(),
    };
    Ingredient {
        ingredient: ingredient.to_string(),
        label: label.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
        with: metrics(with),
        without: metrics(without),
        examples: examples.iter().map(|e| e.to_string()).collect(),
    }
}

impl Chart for IngredientsChart {
    type Data = Vec<Ingredient>;

    const KEY: VizKey = VizKey::Ingredients;
    const DATASET: &'static str = "data/ingredients_sample.json";

    fn sample_data() -> Self::Data {
        vec![
            sample("video_length_bucket", "Video Duration", "⏱️", "Optimal length for engagement", ("892K", "45K"), ("234K", "12K"), &["15-30 sec sweet spot", "60 sec for tutorials"]),
            sample("sound_reuse", "Trending Audio", "🎵", "Using viral sounds", ("1.2M", "89K"), ("156K", "8K"), &["Original sounds", "Remixes"]),
            sample("hashtag_count", "Hashtag Strategy", "#️⃣", "3-5 targeted hashtags", ("678K", "34K"), ("234K", "11K"), &["#ForYou", "#Viral", "Niche tags"]),
            sample("duet_stitch", "Duet/Stitch", "🔄", "Collaborative features", ("934K", "67K"), ("445K", "23K"), &["React videos", "Challenges"]),
            sample("posting_time_bucket", "Timing", "🕐", "Peak hours posting", ("789K", "56K"), ("345K", "19K"), &["6-10 AM", "7-11 PM"]),
            sample("caption_emotion_family", "Emotional Hook", "💭", "Caption sentiment", ("823K", "61K"), ("412K", "28K"), &["Joy", "Surprise", "Nostalgia"]),
            sample("creator_reach", "Creator Base", "👥", "Follower count impact", ("1.5M", "112K"), ("89K", "4K"), &["Micro-influencer", "Rising creator"]),
            sample("effects_used", "Visual Effects", "✨", "Filters and transitions", ("934K", "72K"), ("567K", "31K"), &["Green screen", "Time warp"]),
            sample("sound_age", "Sound Freshness", "📈", "Timing the trend wave", ("1.1M", "95K"), ("234K", "15K"), &["First 48 hours", "Peak week"]),
        ]
    }

    fn render(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        root: NodeId,
    ) -> TidesResult<()> {
        let grid = dom.append_new(
            root,
            "div",
            &[("class", "ingredients-grid"), ("role", "list"), ("aria-label", "Viral recipe ingredients")],
        )?;
        self.cards.clear();
        for item in core.data()? {
            let aria = format!("{}: {}", item.label, item.description);
            let card = dom.append_new(
                grid,
                "div",
                &[
                    ("class", "ingredient-card"),
                    ("role", "listitem"),
                    ("tabindex", "0"),
                    ("data-ingredient", item.ingredient.as_str()),
                    ("aria-label", aria.as_str()),
                ],
            )?;
            let icon = dom.append_new(card, "div", &[("class", "card-icon")])?;
            dom.set_text(icon, &item.icon)?;
            let title = dom.append_new(card, "h3", &[("class", "card-title")])?;
            dom.set_text(title, &item.label)?;
            let desc = dom.append_new(card, "p", &[("class", "card-description")])?;
            dom.set_text(desc, &item.description)?;
            dom.listen(
                card,
                DomEventKind::Click,
                Interaction::Viz {
                    viz: VizKey::Ingredients,
                    action: format!("open:{}", item.ingredient),
                },
            )?;
            self.cards.push((item.ingredient.clone(), card));
        }
        self.build_modal(dom, root)?;

        if !core.options.reduced_motion {
            self.set_card_progress(dom, |_| 0.0)?;
            self.cards_in = Some((core.frames.every_frame(ChartTask::Animate("cards")), core.frames.now()));
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
            11 => self.highlight_key(core, dom),
            12 => self.show_prompt(core, dom, root),
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
        if name != "cards" {
            return Ok(());
        }
        let Some((handle, started)) = self.cards_in else {
            return Ok(());
        };
        let elapsed = now.0 - started.0;
        self.set_card_progress(dom, |i| staggered(elapsed, i, CARD_STAGGER_MS, CARD_MS))?;
        let last = self.cards.len().saturating_sub(1);
        if staggered(elapsed, last, CARD_STAGGER_MS, CARD_MS) >= 1.0 {
            core.frames.cancel(handle);
            self.cards_in = None;
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
        match action {
            "close" => self.close_quiz(core, dom),
            "guess" => self.record_guess(dom),
            "reveal" => self.reveal_answer(core, dom),
            _ => match action.strip_prefix("open:") {
                Some(key) => self.open_quiz(core, dom, key),
                None => Ok(()),
            },
        }
    }

    fn motion_changed(
        &mut self,
        core: &mut ChartCore<Self::Data>,
        dom: &mut Document,
        _root: NodeId,
    ) -> TidesResult<()> {
        if core.options.reduced_motion {
            if let Some((handle, _)) = self.cards_in.take() {
                core.frames.cancel(handle);
                self.set_card_progress(dom, |_| 1.0)?;
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.cards.clear();
        self.modal = None;
        self.selected = None;
        self.cards_in = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viz/ingredients.rs"]
mod tests;
