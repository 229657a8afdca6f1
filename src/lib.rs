//! Tides is a headless scrollytelling engine.
//!
//! A page is a stack of sections. As the viewport moves, a scroll observer reports which
//! sections are visible, which one dominates and which step markers were crossed. The scene
//! orchestrator turns those reports into:
//!
//! - a single active scene written to `body[data-scene]`
//! - exactly-once visualization mounts and ordered step updates
//! - one decorative illustration at a time, detached before the next attaches
//!
//! [`Page`] wires everything to an in-memory [`Document`] so whole scroll sessions can be
//! scripted with a [`Trace`] and inspected as a timeline.
#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod dom;
pub mod foundation;
pub mod illustrations;
pub mod page;
/// Offline illustration rasterization.
pub mod render;
pub mod scene;
pub mod scroll;
pub mod viz;

pub use crate::animation::ease::Ease;
pub use crate::animation::timing::TransitionTiming;
pub use crate::config::manifest::{PageManifest, SectionSpec, StepMarkerSpec, Thresholds, ViewportSize};
pub use crate::dom::document::{DomEventKind, Document, Interaction, NodeId};
pub use crate::foundation::core::{Millis, SceneName, SectionId, Step, VizKey};
pub use crate::foundation::error::{TidesError, TidesResult};
pub use crate::page::runtime::{Page, Record, TimelineEntry};
pub use crate::page::trace::{Trace, TraceEntry, TraceStep, replay};
pub use crate::scene::illustration::{IllustrationMounter, MountOp};
pub use crate::scene::orchestrator::{Outcome, SceneOrchestrator};
pub use crate::scene::registry::SceneRegistry;
pub use crate::scene::store::{SceneChange, SceneStore, SceneSubscriber};
pub use crate::scroll::observer::{IntersectionEntry, ScrollEvent, ScrollObserver};
pub use crate::viz::contract::{UpdateOptions, VizController, VizEvent, VizEventKind, VizOptions};
pub use crate::viz::data::{DataSource, FsDataSource, MemoryDataSource, OfflineDataSource};
pub use crate::viz::registry::VizRegistry;
