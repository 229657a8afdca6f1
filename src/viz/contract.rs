use crate::animation::timing::TransitionTiming;
use crate::dom::document::Document;
use crate::foundation::core::{Millis, Step, VizKey};
use crate::foundation::error::TidesResult;
use crate::viz::data::DataSource;
use crate::viz::emitter::{Handler, SubscriptionId};

/// Palette family requested by the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Accessible,
    Print,
}

impl ColorScheme {
    /// Five-color categorical palette.
    pub fn palette(self) -> [&'static str; 5] {
        match self {
            Self::Default => ["#00FFE0", "#FF00E0", "#FFEB3B", "#3B82F6", "#EF4444"],
            Self::Accessible => ["#0066CC", "#FF6600", "#009900", "#990099", "#FFCC00"],
            Self::Print => ["#000000", "#666666", "#999999", "#CCCCCC", "#FFFFFF"],
        }
    }
}

/// Options passed to [`VizController::init`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VizOptions {
    /// Container width in pixels.
    pub width: f64,
    /// Container height in pixels.
    pub height: f64,
    pub color_scheme: ColorScheme,
    /// Animation speed multiplier.
    pub animation_speed: f64,
    /// Respect the reduced-motion preference.
    pub reduced_motion: bool,
}

impl Default for VizOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            color_scheme: ColorScheme::Default,
            animation_speed: 1.0,
            reduced_motion: false,
        }
    }
}

/// Options passed with every step update.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UpdateOptions {
    pub transition: TransitionTiming,
}

/// Snapshot of a controller's lifecycle state.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct VisualizationState {
    /// True after the first successful mount, until unmount/destroy.
    pub mounted: bool,
    /// Last applied step, if any.
    pub current_step: Option<Step>,
    /// Dataset loaded (remote or fallback).
    pub data_ready: bool,
    pub reduced_motion: bool,
    /// Chart-specific highlighted element keys.
    pub highlights: Vec<String>,
}

/// Events controllers publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VizEventKind {
    DataReady,
    EnterComplete,
    UpdateComplete,
    ExitComplete,
    Error,
    Resize,
    StateChange,
    /// Planets: top artists highlighted.
    ArtistHighlight,
    /// Community: a sound node was hovered.
    HoverAudio,
    /// Ranking: a community bar was opened.
    LeafReveal,
    /// Ranking: ranking metric switched.
    KpiChange,
    /// Emotion: a bubble was clicked.
    BubbleClick,
    /// Ingredients: quiz modal opened.
    QuizOpened,
    QuizClosed,
    AnswerRevealed,
}

/// One published event with a JSON payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VizEvent {
    pub viz: VizKey,
    pub kind: VizEventKind,
    pub data: serde_json::Value,
}

impl VizEvent {
    pub fn new(viz: VizKey, kind: VizEventKind) -> Self {
        Self {
            viz,
            kind,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(viz: VizKey, kind: VizEventKind, data: serde_json::Value) -> Self {
        Self { viz, kind, data }
    }
}

/// Lifecycle contract every visualization family implements.
///
/// The orchestrator is written against this trait only. Every method that touches the page takes
/// the [`Document`] explicitly; a controller only ever modifies nodes inside its own mount point.
pub trait VizController {
    fn key(&self) -> VizKey;

    /// Resolve the mount point and load data.
    ///
    /// Fails only on unrecoverable setup errors (mount point missing). Data errors are recovered
    /// with built-in sample data.
    fn init(
        &mut self,
        dom: &mut Document,
        mount_id: &str,
        options: VizOptions,
        source: &dyn DataSource,
    ) -> TidesResult<()>;

    /// First DOM construction. Idempotent; emits [`VizEventKind::EnterComplete`] on success.
    fn mount(&mut self, dom: &mut Document) -> TidesResult<()>;

    /// Apply a step-indexed change. Unknown steps are a no-op.
    ///
    /// Steps arriving before mount are queued and replayed in order on mount.
    fn update(&mut self, dom: &mut Document, step: Step, options: &UpdateOptions) -> TidesResult<()>;

    /// Release DOM nodes, timers and listeners owned by the controller.
    fn unmount(&mut self, dom: &mut Document) -> TidesResult<()>;

    /// `unmount`, then drop loaded data and subscriptions.
    fn destroy(&mut self, dom: &mut Document) -> TidesResult<()>;

    fn on(&mut self, kind: VizEventKind, handler: Handler) -> SubscriptionId;

    fn off(&mut self, id: SubscriptionId) -> bool;

    fn state(&self) -> VisualizationState;

    fn is_mounted(&self) -> bool {
        self.state().mounted
    }

    fn is_data_ready(&self) -> bool {
        self.state().data_ready
    }

    /// Runtime reduced-motion toggle.
    fn set_reduced_motion(&mut self, _dom: &mut Document, _reduced: bool) -> TidesResult<()> {
        Ok(())
    }

    fn resize(&mut self, _dom: &mut Document, _width: f64, _height: f64) -> TidesResult<()> {
        Ok(())
    }

    /// Advance the controller's own frame scheduler.
    fn tick(&mut self, _dom: &mut Document, _now: Millis) -> TidesResult<()> {
        Ok(())
    }

    /// Handle a pointer interaction registered by this controller.
    fn interact(&mut self, _dom: &mut Document, _action: &str) -> TidesResult<()> {
        Ok(())
    }

    /// Live animation frames and timers.
    fn live_tasks(&self) -> usize {
        0
    }

    /// Called when the page leaves this controller's section.
    fn on_transition_out(&mut self, _dom: &mut Document) {}

    /// Called when the page enters this controller's section.
    fn on_transition_in(&mut self, _dom: &mut Document) {}
}
