use std::cell::{Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::animation::ease::Ease;
use crate::config::manifest::{PageManifest, SectionSpec, default_annotation};
use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
use crate::dom::task::DomTask;
use crate::foundation::core::{Millis, SceneName, SectionId, Step, VizKey};
use crate::foundation::error::TidesResult;
use crate::foundation::math::fmt_num;
use crate::page::micro::{COMET, MicroInteractions, RANKING_DETAIL};
use crate::scene::illustration::{IllustrationMounter, MountOp};
use crate::scene::orchestrator::{Outcome, SceneOrchestrator};
use crate::scene::registry::SceneRegistry;
use crate::scene::store::{SceneChip, SharedSubscriber};
use crate::scroll::geometry::Viewport;
use crate::scroll::observer::{IntersectionEntry, STEP_ATTR, STEP_MARKER_CLASS, ScrollEvent, ScrollObserver};
use crate::viz::contract::{VizEvent, VizEventKind, VizOptions};
use crate::viz::data::DataSource;
use crate::viz::registry::VizRegistry;
use crate::viz::schedule::{FrameHandle, FrameScheduler};

pub const LOADED_ANNOUNCEMENT: &str = "TikTok Tides loaded and ready";
pub const LIVE_REGION_ID: &str = "live-region";
pub const HELP_TEXT: &str = "Keys: 1-6 jump to a chapter, Escape closes panels, ? shows this help";

/// Micro interaction name of the audio toggle button.
pub const AUDIO_TOGGLE: &str = "audio-toggle";
/// Prefix of nav link interactions, followed by the section id.
pub const NAV_PREFIX: &str = "nav:";

const KPI_MS: f64 = 1000.0;
const KPI_STAGGER_MS: f64 = 100.0;
const AUDIO_PREVIEW_MS: f64 = 2000.0;
const REDUCED_MOTION_CLASS: &str = "reduced-motion";
const OVERLAYS: [&str; 3] = ["detail-panel", "detail-drawer", "quiz-modal"];

/// Background layers injected into their host sections.
const SCENE_LAYERS: [(&str, &str); 5] = [
    ("section-landing", "scene--stars"),
    ("section-surge", "scene--orbits"),
    ("section-spillover", "scene--grid"),
    ("section-fade", "scene--canopy"),
    ("section-takeaway", "scene--bubbles"),
];

/// Controller events the page listens to.
const PAGE_EVENTS: [VizEventKind; 9] = [
    VizEventKind::EnterComplete,
    VizEventKind::ArtistHighlight,
    VizEventKind::HoverAudio,
    VizEventKind::LeafReveal,
    VizEventKind::KpiChange,
    VizEventKind::BubbleClick,
    VizEventKind::QuizOpened,
    VizEventKind::QuizClosed,
    VizEventKind::AnswerRevealed,
];

/// Something observable that happened on the page.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    Lifecycle(Outcome),
    Illustration(MountOp),
    Viz(VizEvent),
    Announcement { text: String },
    Help { text: String },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineEntry {
    pub at_ms: f64,
    pub scroll_y: f64,
    #[serde(flatten)]
    pub record: Record,
}

#[derive(Clone, Debug, PartialEq)]
enum PageTask {
    Dom(DomTask),
    CountUp { node: NodeId, target: f64, start: Millis },
}

/// The assembled page.
///
/// Owns the document and every component that touches it. Scroll, pointer, keyboard and clock
/// input all enter through `Page`; each call processes the resulting observer batch, routes
/// interactions to their owners and drains controller events before returning.
#[derive(Debug)]
pub struct Page {
    manifest: PageManifest,
    dom: Document,
    vizzes: VizRegistry,
    observer: ScrollObserver,
    orchestrator: SceneOrchestrator,
    mounter: Rc<RefCell<IllustrationMounter>>,
    micro: MicroInteractions,
    events: Rc<RefCell<Vec<VizEvent>>>,
    frames: FrameScheduler<PageTask>,
    clock: Millis,
    scroll_y: f64,
    reduced_motion: bool,
    muted: bool,
    mount_ops_seen: usize,
    counted: BTreeSet<SectionId>,
    timeline: Vec<TimelineEntry>,
}

impl Page {
    /// Build the document from `manifest`, initialize controllers against `source` and process
    /// the initial viewport.
    ///
    /// Controller setup failures are logged and leave that controller unusable; everything else
    /// continues.
    pub fn new(manifest: PageManifest, source: &dyn DataSource) -> TidesResult<Self> {
        manifest.validate()?;
        let mut dom = Document::new();
        build_document(&mut dom, &manifest)?;
        inject_scene_layers(&mut dom)?;

        let mut vizzes = VizRegistry::standard();
        let options = VizOptions::default();
        let failures = vizzes.init_all(&mut dom, &options, source);
        if !failures.is_empty() {
            tracing::warn!(failed = failures.len(), "some visualizations are unavailable");
        }
        let events = Rc::new(RefCell::new(Vec::new()));
        for (_, controller) in vizzes.iter_mut() {
            for kind in PAGE_EVENTS {
                let sink = events.clone();
                controller.on(
                    kind,
                    Box::new(move |event: &VizEvent| sink.borrow_mut().push(event.clone())),
                );
            }
        }

        let registry = SceneRegistry::from_manifest(&manifest);
        let mut orchestrator = SceneOrchestrator::new(registry.clone(), manifest.transition)
            .with_production(manifest.production);
        let mounter = Rc::new(RefCell::new(IllustrationMounter::new(registry)));
        mounter.borrow().ensure_hosts(&mut dom)?;
        let shared: SharedSubscriber = mounter.clone();
        orchestrator.subscribe(shared);
        if !manifest.production {
            let chip = SceneChip::install(&mut dom, None)?;
            orchestrator.subscribe(Rc::new(RefCell::new(chip)));
        }

        let micro = MicroInteractions::new();
        micro.install(&mut dom)?;

        let mut observer = ScrollObserver::new(manifest.thresholds);
        let ids: Vec<SectionId> = manifest.sections.iter().map(|s| s.id.clone()).collect();
        observer.watch_sections(&dom, &ids);

        let mut page = Self {
            manifest,
            dom,
            vizzes,
            observer,
            orchestrator,
            mounter,
            micro,
            events,
            frames: FrameScheduler::new(),
            clock: Millis(0.0),
            scroll_y: 0.0,
            reduced_motion: false,
            muted: true,
            mount_ops_seen: 0,
            counted: BTreeSet::new(),
            timeline: Vec::new(),
        };
        page.drain_viz_events();
        page.announce(LOADED_ANNOUNCEMENT);
        tracing::info!(sections = ids.len(), "page ready");
        page.scroll_to(0.0);
        Ok(page)
    }

    /// [`PageManifest::standard`] page.
    pub fn standard(source: &dyn DataSource) -> TidesResult<Self> {
        Self::new(PageManifest::standard(), source)
    }

    pub fn dom(&self) -> &Document {
        &self.dom
    }

    pub fn manifest(&self) -> &PageManifest {
        &self.manifest
    }

    pub fn vizzes(&self) -> &VizRegistry {
        &self.vizzes
    }

    pub fn observer(&self) -> &ScrollObserver {
        &self.observer
    }

    pub fn orchestrator(&self) -> &SceneOrchestrator {
        &self.orchestrator
    }

    pub fn mounter(&self) -> Ref<'_, IllustrationMounter> {
        self.mounter.borrow()
    }

    pub fn micro(&self) -> &MicroInteractions {
        &self.micro
    }

    pub fn current_scene(&self) -> Option<SceneName> {
        self.orchestrator.current_scene()
    }

    pub fn clock(&self) -> Millis {
        self.clock
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn take_timeline(&mut self) -> Vec<TimelineEntry> {
        std::mem::take(&mut self.timeline)
    }

    /// Current live-region text.
    pub fn announcement(&self) -> Option<&str> {
        self.dom
            .element_by_id(LIVE_REGION_ID)
            .and_then(|node| self.dom.text(node))
    }

    /// Scroll position as a percentage of the scrollable range; 0 when nothing scrolls.
    pub fn progress_percent(&self) -> f64 {
        let max = self.max_scroll();
        if max <= 0.0 {
            return 0.0;
        }
        (self.scroll_y / max * 100.0).clamp(0.0, 100.0)
    }

    /// Live timers and animation frames across the page, micro interactions, illustration and
    /// controllers.
    pub fn live_tasks(&self) -> usize {
        let controllers: usize = self
            .vizzes
            .keys()
            .filter_map(|key| self.vizzes.get(key))
            .map(|c| c.live_tasks())
            .sum();
        self.frames.live_count()
            + self.micro.live_tasks()
            + self.mounter.borrow().live_tasks()
            + controllers
    }

    /// Scroll to `y` (clamped to the scrollable range) and process what the observer reports.
    pub fn scroll_to(&mut self, y: f64) -> Vec<ScrollEvent> {
        self.scroll_y = if y.is_finite() {
            y.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
        let viewport = Viewport::new(self.scroll_y, self.manifest.viewport.height);
        let events = self.observer.observe_viewport(viewport);
        self.update_progress();
        self.process(&events);
        events
    }

    /// Feed a raw intersection batch, bypassing geometry.
    pub fn observe(&mut self, entries: &[IntersectionEntry]) -> Vec<ScrollEvent> {
        let events = self.observer.observe_batch(entries);
        self.process(&events);
        events
    }

    /// Scroll so `section` sits at the top of the viewport.
    pub fn jump_to(&mut self, section: &SectionId) -> bool {
        match self.observer.scroll_to(section) {
            Some(y) => {
                self.scroll_to(y);
                true
            }
            None => false,
        }
    }

    pub fn click(&mut self, node: NodeId) {
        self.pointer(node, DomEventKind::Click);
    }

    pub fn hover(&mut self, node: NodeId) {
        self.pointer(node, DomEventKind::MouseEnter);
    }

    pub fn unhover(&mut self, node: NodeId) {
        self.pointer(node, DomEventKind::MouseLeave);
    }

    /// Keyboard input: `1`-`6` jump to chapters, `Escape` closes overlays, `?` shows help.
    /// Outside production, digits `1`-`7` also force the matching scene.
    pub fn key(&mut self, key: &str) {
        match key {
            "Escape" => self.close_overlays(),
            "?" => {
                tracing::info!("{HELP_TEXT}");
                self.record(Record::Help {
                    text: HELP_TEXT.to_string(),
                });
            }
            _ => {
                let Some(digit) = single_digit(key) else {
                    return;
                };
                if (1..=6).contains(&digit) {
                    let chapter = self
                        .manifest
                        .sections
                        .iter()
                        .filter(|s| s.viz.is_some())
                        .nth(digit as usize - 1)
                        .map(|s| s.id.clone());
                    if let Some(section) = chapter {
                        self.jump_to(&section);
                    }
                }
                if !self.manifest.production
                    && let Some(scene) = SceneName::from_digit(digit)
                {
                    self.force_scene(Some(scene));
                }
            }
        }
    }

    /// Dev-only scene override. Ignored (with a warning) in production.
    pub fn force_scene(&mut self, scene: Option<SceneName>) {
        match self.orchestrator.force_scene(&mut self.dom, scene) {
            Ok(Some(change)) => {
                self.record(Record::Lifecycle(Outcome::SceneChanged {
                    from: change.previous,
                    to: change.current,
                }));
                self.collect_mount_ops();
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "scene key ignored"),
        }
    }

    /// Toggle the reduced-motion preference everywhere.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if reduced == self.reduced_motion {
            return;
        }
        self.reduced_motion = reduced;
        let body = self.dom.body();
        let result = if reduced {
            self.dom.add_class(body, REDUCED_MOTION_CLASS)
        } else {
            self.dom.remove_class(body, REDUCED_MOTION_CLASS)
        };
        if let Err(err) = result {
            tracing::warn!(%err, "reduced-motion class not updated");
        }
        for (key, controller) in self.vizzes.iter_mut() {
            if let Err(err) = controller.set_reduced_motion(&mut self.dom, reduced) {
                tracing::warn!(viz = %key, %err, "reduced motion not applied");
            }
        }
        self.mounter.borrow_mut().set_reduced_motion(reduced);
        self.micro.set_reduced_motion(reduced);
        tracing::debug!(reduced, "reduced motion changed");
    }

    /// Flip the audio preview mute; returns the new muted state.
    pub fn toggle_audio(&mut self) -> bool {
        self.muted = !self.muted;
        if let Some(button) = self.dom.first_by_class(self.dom.root(), AUDIO_TOGGLE) {
            let pressed = if self.muted { "true" } else { "false" };
            if let Err(err) = self.dom.set_attr(button, "aria-pressed", pressed) {
                tracing::warn!(%err, "audio toggle not updated");
            }
        }
        self.announce(if self.muted { "Audio muted" } else { "Audio unmuted" });
        self.muted
    }

    /// Advance the page clock and every scheduler. The clock never moves backwards.
    pub fn tick(&mut self, now: Millis) {
        if now.0 > self.clock.0 {
            self.clock = now;
        }
        let now = self.clock;
        for (key, controller) in self.vizzes.iter_mut() {
            if let Err(err) = controller.tick(&mut self.dom, now) {
                tracing::warn!(viz = %key, %err, "controller frame failed");
            }
        }
        self.mounter.borrow_mut().tick(&mut self.dom, now);
        self.micro.tick(&mut self.dom, now);
        for fired in self.frames.advance(now) {
            let result = match fired.task {
                PageTask::Dom(task) => task.apply(&mut self.dom),
                PageTask::CountUp {
                    node,
                    target,
                    start,
                } => self.count_up(fired.handle, node, target, start, now),
            };
            if let Err(err) = result {
                tracing::warn!(%err, "page timer failed");
            }
        }
        self.drain_viz_events();
    }

    /// Destroy every controller, remove the illustration and cancel all page timers.
    pub fn shutdown(&mut self) {
        for (key, controller) in self.vizzes.iter_mut() {
            if let Err(err) = controller.destroy(&mut self.dom) {
                tracing::error!(viz = %key, %err, "destroy failed");
            }
        }
        self.mounter.borrow_mut().detach_current(&mut self.dom);
        self.collect_mount_ops();
        self.micro.cancel_all();
        self.frames.cancel_all();
        self.events.borrow_mut().clear();
        tracing::info!("page shut down");
    }

    fn max_scroll(&self) -> f64 {
        (self.manifest.document_height() - self.manifest.viewport.height).max(0.0)
    }

    fn process(&mut self, events: &[ScrollEvent]) {
        if !events.is_empty() {
            let outcomes = self
                .orchestrator
                .handle_batch(&mut self.dom, &mut self.vizzes, events);
            for outcome in outcomes {
                self.react(&outcome);
                self.record(Record::Lifecycle(outcome));
                self.collect_mount_ops();
            }
        }
        self.check_micro();
        self.drain_viz_events();
    }

    fn react(&mut self, outcome: &Outcome) {
        let result = match outcome {
            Outcome::SectionEntered { section } => self.start_kpis(section),
            Outcome::SectionChanged { to, .. } => self.section_changed(to),
            Outcome::StepReached { section, step, .. } => self.annotate(section, *step),
            _ => Ok(()),
        };
        if let Err(err) = result {
            tracing::warn!(%err, "page reaction failed");
        }
    }

    fn section_changed(&mut self, section: &SectionId) -> TidesResult<()> {
        for link in self.dom.find_by_class(self.dom.root(), "nav-link") {
            let current = self.dom.attr(link, "data-section") == Some(section.as_str());
            self.dom
                .set_attr(link, "aria-current", if current { "true" } else { "false" })?;
        }

        let body = self.dom.body();
        let declared = self.manifest.section(section);
        for background in self.manifest.sections.iter().filter_map(|s| s.background.as_deref()) {
            self.dom.remove_class(body, background)?;
        }
        if let Some(background) = declared.and_then(|s| s.background.as_deref()) {
            self.dom.add_class(body, background)?;
        }

        let name = declared.map_or(section.as_str(), SectionSpec::display_name);
        let scene = declared.and_then(|s| s.scene).map_or("no", SceneName::as_str);
        let text = format!("{name} section entered - {scene} scene");
        self.announce(&text);
        Ok(())
    }

    /// Annotation text for a reached step; unknown steps leave the rail unchanged.
    fn annotate(&mut self, section: &SectionId, step: Step) -> TidesResult<()> {
        let declared = self
            .manifest
            .section(section)
            .and_then(|s| s.steps.iter().find(|m| m.step == step))
            .and_then(|m| m.annotation.clone());
        let Some(text) = declared.or_else(|| default_annotation(step).map(str::to_string)) else {
            return Ok(());
        };
        let Some(node) = self.observer.section_node(section) else {
            return Ok(());
        };
        if let Some(rail) = self.dom.first_by_class(node, "annotation") {
            self.dom.set_text(rail, &text)?;
        }
        Ok(())
    }

    fn start_kpis(&mut self, section: &SectionId) -> TidesResult<()> {
        if !self.counted.insert(section.clone()) {
            return Ok(());
        }
        let Some(node) = self.observer.section_node(section) else {
            return Ok(());
        };
        for (i, kpi) in self.dom.find_by_class(node, "kpi-value").into_iter().enumerate() {
            let Some(target) = self
                .dom
                .attr(kpi, "data-target")
                .and_then(|raw| raw.parse::<f64>().ok())
            else {
                continue;
            };
            self.dom.set_text(kpi, &format_kpi(0.0, target))?;
            let start = self.clock.after(i as f64 * KPI_STAGGER_MS);
            self.frames.every_frame(PageTask::CountUp {
                node: kpi,
                target,
                start,
            });
        }
        Ok(())
    }

    fn count_up(
        &mut self,
        handle: FrameHandle,
        node: NodeId,
        target: f64,
        start: Millis,
        now: Millis,
    ) -> TidesResult<()> {
        let t = ((now.0 - start.0) / KPI_MS).clamp(0.0, 1.0);
        let value = target * Ease::OutCubic.apply(t);
        if !self.dom.contains(node) {
            self.frames.cancel(handle);
            return Ok(());
        }
        self.dom.set_text(node, &format_kpi(value, target))?;
        if t >= 1.0 {
            self.frames.cancel(handle);
        }
        Ok(())
    }

    fn check_micro(&mut self) {
        let sections = |viz| self.orchestrator.registry().section_for_viz(viz).cloned();
        let (ranking, emotion) = (sections(VizKey::Ranking), sections(VizKey::Emotion));
        if let Some(section) = ranking
            && let Some(node) = self.observer.section_node(&section)
        {
            let ratio = self.observer.ratio(&section);
            if let Err(err) = self.micro.maybe_leaf_hint(&mut self.dom, node, ratio) {
                tracing::warn!(%err, "leaf hint failed");
            }
        }
        if let Some(section) = emotion {
            let ratio = self.observer.ratio(&section);
            self.micro.maybe_bubble_pulse(ratio);
        }
    }

    fn pointer(&mut self, node: NodeId, kind: DomEventKind) {
        for interaction in self.dom.dispatch(node, kind) {
            let result = match interaction {
                Interaction::Egg { egg } => self.mounter.borrow_mut().handle_egg(&mut self.dom, egg),
                Interaction::Viz { viz, action } => match self.vizzes.get_mut(viz) {
                    Some(controller) => controller.interact(&mut self.dom, &action),
                    None => Ok(()),
                },
                Interaction::Micro { name } => self.micro_action(&name),
            };
            if let Err(err) = result {
                tracing::warn!(%err, "interaction failed");
            }
        }
        self.drain_viz_events();
    }

    fn micro_action(&mut self, name: &str) -> TidesResult<()> {
        match name {
            COMET => self.micro.comet(&mut self.dom),
            RANKING_DETAIL => {
                let title = self
                    .orchestrator
                    .registry()
                    .section_for_viz(VizKey::Ranking)
                    .and_then(|id| self.manifest.section(id))
                    .map_or("Ranking", SectionSpec::display_name)
                    .to_string();
                self.open_overlay("detail-panel", &title, "Select a community to reveal its topics")
            }
            AUDIO_TOGGLE => {
                self.toggle_audio();
                Ok(())
            }
            _ => {
                if let Some(section) = name.strip_prefix(NAV_PREFIX) {
                    self.jump_to(&SectionId::new(section));
                }
                Ok(())
            }
        }
    }

    fn close_overlays(&mut self) {
        if let Some(quiz) = self.vizzes.get_mut(VizKey::Ingredients)
            && quiz.is_mounted()
            && let Err(err) = quiz.interact(&mut self.dom, "close")
        {
            tracing::warn!(%err, "quiz close failed");
        }
        for class in OVERLAYS {
            for node in self.dom.find_by_class(self.dom.root(), class) {
                if let Err(err) = self.dom.set_attr(node, "aria-hidden", "true") {
                    tracing::warn!(%err, "overlay not closed");
                }
            }
        }
        self.drain_viz_events();
    }

    fn open_overlay(&mut self, class: &str, title: &str, body: &str) -> TidesResult<()> {
        let Some(overlay) = self.dom.first_by_class(self.dom.root(), class) else {
            return Ok(());
        };
        if let Some(node) = self.dom.first_by_class(overlay, "detail-title") {
            self.dom.set_text(node, title)?;
        }
        if let Some(node) = self.dom.first_by_class(overlay, "detail-body") {
            self.dom.set_text(node, body)?;
        }
        self.dom.set_attr(overlay, "aria-hidden", "false")
    }

    fn drain_viz_events(&mut self) {
        loop {
            let drained = std::mem::take(&mut *self.events.borrow_mut());
            if drained.is_empty() {
                return;
            }
            for event in drained {
                if let Err(err) = self.on_viz_event(&event) {
                    tracing::warn!(viz = %event.viz, %err, "controller event not handled");
                }
                self.record(Record::Viz(event));
            }
        }
    }

    fn on_viz_event(&mut self, event: &VizEvent) -> TidesResult<()> {
        let text = |key: &str| {
            event
                .data
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        match event.kind {
            VizEventKind::HoverAudio if !self.muted => {
                let Some(preview) = self.dom.first_by_class(self.dom.root(), "audio-preview") else {
                    return Ok(());
                };
                self.dom.set_attr(preview, "data-sound", &text("sound"))?;
                self.dom.add_class(preview, "playing")?;
                self.frames.after(
                    AUDIO_PREVIEW_MS,
                    PageTask::Dom(DomTask::RemoveClass {
                        node: preview,
                        class: "playing",
                    }),
                );
                Ok(())
            }
            VizEventKind::LeafReveal => {
                let topics: Vec<String> = event
                    .data
                    .get("topics")
                    .and_then(|v| v.as_array())
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|t| t.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                self.open_overlay("detail-panel", &text("community"), &topics.join(", "))
            }
            VizEventKind::BubbleClick => {
                let count = event.data.get("count").and_then(|c| c.as_f64()).unwrap_or(0.0);
                let body = format!("{} - {} mentions", text("emotion"), fmt_num(count));
                self.open_overlay("detail-drawer", &text("word"), &body)
            }
            VizEventKind::QuizOpened => {
                let line = format!("Testing {} impact", text("ingredient"));
                self.announce(&line);
                Ok(())
            }
            VizEventKind::ArtistHighlight => self.micro.comet(&mut self.dom),
            _ => Ok(()),
        }
    }

    fn announce(&mut self, text: &str) {
        if let Some(region) = self.dom.element_by_id(LIVE_REGION_ID)
            && let Err(err) = self.dom.set_text(region, text)
        {
            tracing::warn!(%err, "live region not updated");
        }
        self.record(Record::Announcement {
            text: text.to_string(),
        });
    }

    fn update_progress(&mut self) {
        let Some(bar) = self.dom.first_by_class(self.dom.root(), "progress-bar") else {
            return;
        };
        let percent = self.progress_percent();
        let style = format!("width: {}%", fmt_num(percent));
        let now = fmt_num(percent.round());
        for (name, value) in [("style", style.as_str()), ("aria-valuenow", now.as_str())] {
            if let Err(err) = self.dom.set_attr(bar, name, value) {
                tracing::warn!(%err, "progress bar not updated");
            }
        }
    }

    fn collect_mount_ops(&mut self) {
        let ops: Vec<MountOp> = {
            let mounter = self.mounter.borrow();
            let fresh = mounter
                .log()
                .get(self.mount_ops_seen..)
                .map(<[MountOp]>::to_vec)
                .unwrap_or_default();
            self.mount_ops_seen = mounter.log().len();
            fresh
        };
        for op in ops {
            self.record(Record::Illustration(op));
        }
    }

    fn record(&mut self, record: Record) {
        self.timeline.push(TimelineEntry {
            at_ms: self.clock.0,
            scroll_y: self.scroll_y,
            record,
        });
    }
}

fn single_digit(key: &str) -> Option<u32> {
    let mut chars = key.chars();
    let digit = chars.next()?.to_digit(10)?;
    chars.next().is_none().then_some(digit)
}

/// KPI text: one decimal for fractional targets, whole numbers otherwise.
fn format_kpi(value: f64, target: f64) -> String {
    if target.fract() != 0.0 {
        format!("{value:.1}")
    } else {
        format!("{}", value.round() as i64)
    }
}

/// Build the static page skeleton for `manifest` under `body`.
pub fn build_document(dom: &mut Document, manifest: &PageManifest) -> TidesResult<()> {
    let body = dom.body();
    let env = if manifest.production {
        "production"
    } else {
        "development"
    };
    dom.set_attr(body, "data-env", env)?;

    let nav = dom.append_new(body, "nav", &[("class", "site-nav"), ("aria-label", "Chapters")])?;
    let links = dom.append_new(nav, "ul", &[("class", "nav-links")])?;
    for section in manifest.sections.iter().filter(|s| s.viz.is_some()) {
        let item = dom.append_new(links, "li", &[])?;
        let href = format!("#{}", section.id);
        let link = dom.append_new(
            item,
            "a",
            &[
                ("class", "nav-link"),
                ("href", href.as_str()),
                ("data-section", section.id.as_str()),
                ("aria-current", "false"),
            ],
        )?;
        dom.set_text(link, section.display_name())?;
        dom.listen(
            link,
            DomEventKind::Click,
            Interaction::Micro {
                name: format!("{NAV_PREFIX}{}", section.id),
            },
        )?;
    }

    dom.append_new(
        body,
        "div",
        &[
            ("class", "progress-bar"),
            ("role", "progressbar"),
            ("aria-valuemin", "0"),
            ("aria-valuemax", "100"),
            ("aria-valuenow", "0"),
            ("style", "width: 0%"),
        ],
    )?;
    dom.append_new(
        body,
        "div",
        &[("id", LIVE_REGION_ID), ("class", "sr-only"), ("role", "status"), ("aria-live", "polite")],
    )?;

    let main = dom.append_new(body, "main", &[])?;
    for section in &manifest.sections {
        build_section(dom, main, section)?;
    }

    for class in ["detail-panel", "detail-drawer"] {
        let overlay = dom.append_new(body, "aside", &[("class", class), ("aria-hidden", "true")])?;
        dom.append_new(overlay, "h3", &[("class", "detail-title")])?;
        dom.append_new(overlay, "p", &[("class", "detail-body")])?;
    }

    let tray = dom.append_new(body, "div", &[("class", "audio-tray")])?;
    let toggle = dom.append_new(
        tray,
        "button",
        &[("class", AUDIO_TOGGLE), ("aria-pressed", "true"), ("aria-label", "Toggle audio previews")],
    )?;
    dom.listen(
        toggle,
        DomEventKind::Click,
        Interaction::Micro {
            name: AUDIO_TOGGLE.to_string(),
        },
    )?;
    dom.append_new(tray, "div", &[("class", "audio-preview"), ("data-sound", "")])?;
    Ok(())
}

fn build_section(dom: &mut Document, main: NodeId, section: &SectionSpec) -> TidesResult<()> {
    let (top, height) = (fmt_num(section.top), fmt_num(section.height));
    let node = dom.append_new(
        main,
        "section",
        &[
            ("id", section.id.as_str()),
            ("class", "section"),
            ("data-top", top.as_str()),
            ("data-height", height.as_str()),
        ],
    )?;
    let heading = dom.append_new(node, "h2", &[])?;
    dom.set_text(heading, section.display_name())?;
    dom.append_new(node, "div", &[("class", "annotation")])?;

    if let Some(viz) = section.viz {
        let id = viz.mount_id();
        dom.append_new(node, "div", &[("id", id.as_str()), ("class", "viz-container")])?;
    }
    if !section.kpis.is_empty() {
        let grid = dom.append_new(node, "div", &[("class", "kpi-grid")])?;
        for target in &section.kpis {
            let tile = dom.append_new(grid, "div", &[("class", "kpi")])?;
            let target = fmt_num(*target);
            let value = dom.append_new(tile, "span", &[("class", "kpi-value"), ("data-target", target.as_str())])?;
            dom.set_text(value, "0")?;
        }
    }
    for marker in &section.steps {
        let id = format!("{}-step-{}", section.id, marker.step);
        let step = marker.step.to_string();
        let top = fmt_num(section.top + marker.offset);
        let height = fmt_num(marker.height);
        dom.append_new(
            node,
            "div",
            &[
                ("id", id.as_str()),
                ("class", STEP_MARKER_CLASS),
                (STEP_ATTR, step.as_str()),
                ("data-top", top.as_str()),
                ("data-height", height.as_str()),
            ],
        )?;
    }
    Ok(())
}

/// Prepend the decorative background layer into each host section that lacks one.
///
/// Returns the number of layers created.
pub fn inject_scene_layers(dom: &mut Document) -> TidesResult<usize> {
    let mut created = 0;
    for (host, layer) in SCENE_LAYERS {
        let Some(section) = dom.element_by_id(host) else {
            continue;
        };
        if dom.first_by_class(section, layer).is_some() {
            continue;
        }
        let div = dom.create_element("div");
        dom.set_attr(div, "class", &format!("scene-layer {layer}"))?;
        dom.set_attr(div, "aria-hidden", "true")?;
        dom.prepend_child(section, div)?;
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
#[path = "../../tests/unit/page/runtime.rs"]
mod tests;
