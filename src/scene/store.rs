use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::document::{Document, NodeId};
use crate::foundation::core::SceneName;
use crate::foundation::error::TidesResult;

/// Attribute on `body` mirroring the active scene.
pub const SCENE_ATTR: &str = "data-scene";

/// One write to the scene store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SceneChange {
    pub previous: Option<SceneName>,
    pub current: Option<SceneName>,
}

/// Reader notified after every effective scene change.
pub trait SceneSubscriber {
    fn scene_changed(&mut self, dom: &mut Document, change: &SceneChange) -> TidesResult<()>;
}

impl<F> SceneSubscriber for F
where
    F: FnMut(&mut Document, &SceneChange) -> TidesResult<()>,
{
    fn scene_changed(&mut self, dom: &mut Document, change: &SceneChange) -> TidesResult<()> {
        (self)(dom, change)
    }
}

/// Shared handle to a subscriber; the owner keeps a clone to drive it directly.
pub type SharedSubscriber = Rc<RefCell<dyn SceneSubscriber>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

struct SubscriberEntry {
    id: SubscriberId,
    subscriber: SharedSubscriber,
}

/// Typed holder of the active scene.
///
/// Writes go through [`SceneStore::set`], which is crate-private: the orchestrator owns the only
/// store and is the single writer. Each effective change updates `body[data-scene]` and then
/// notifies subscribers in registration order.
#[derive(Default)]
pub struct SceneStore {
    current: Option<SceneName>,
    subscribers: Vec<SubscriberEntry>,
    next_id: u64,
    writes: usize,
}

impl std::fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneStore")
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .field("writes", &self.writes)
            .finish()
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SceneName> {
        self.current
    }

    /// Number of effective changes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn subscribe(&mut self, subscriber: SharedSubscriber) -> SubscriberId {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        self.subscribers.push(SubscriberEntry { id, subscriber });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|entry| entry.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Set the scene. Returns the change, or `None` when `scene` is already current.
    ///
    /// Subscriber failures are logged and do not stop the remaining subscribers.
    pub(crate) fn set(&mut self, dom: &mut Document, scene: Option<SceneName>) -> Option<SceneChange> {
        if scene == self.current {
            return None;
        }
        let change = SceneChange {
            previous: self.current,
            current: scene,
        };
        self.current = scene;
        self.writes += 1;

        let body = dom.body();
        match scene {
            Some(scene) => {
                if let Err(err) = dom.set_attr(body, SCENE_ATTR, scene.as_str()) {
                    tracing::warn!(%err, "scene attribute not written");
                }
            }
            None => dom.remove_attr(body, SCENE_ATTR),
        }

        for entry in &self.subscribers {
            let Ok(mut subscriber) = entry.subscriber.try_borrow_mut() else {
                tracing::warn!(id = entry.id.0, "scene subscriber busy; notification skipped");
                continue;
            };
            if let Err(err) = subscriber.scene_changed(dom, &change) {
                tracing::warn!(id = entry.id.0, %err, "scene subscriber failed");
            }
        }
        Some(change)
    }
}

/// Dev-only chip showing `scene: <name|none>`.
#[derive(Clone, Copy, Debug)]
pub struct SceneChip {
    node: NodeId,
}

impl SceneChip {
    pub const CLASS: &'static str = "scene-chip";

    /// Create the chip under `body`, labelled with the current scene.
    pub fn install(dom: &mut Document, current: Option<SceneName>) -> TidesResult<Self> {
        let body = dom.body();
        let node = dom.append_new(body, "div", &[("class", Self::CLASS), ("aria-hidden", "true")])?;
        dom.set_text(node, &Self::label(current))?;
        Ok(Self { node })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn label(scene: Option<SceneName>) -> String {
        format!("scene: {}", scene.map_or("none", SceneName::as_str))
    }
}

impl SceneSubscriber for SceneChip {
    fn scene_changed(&mut self, dom: &mut Document, change: &SceneChange) -> TidesResult<()> {
        dom.set_text(self.node, &Self::label(change.current))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/store.rs"]
mod tests;
