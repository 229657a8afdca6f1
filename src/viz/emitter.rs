use std::collections::BTreeMap;
use std::fmt;

use crate::viz::contract::{VizEvent, VizEventKind};

/// Subscription handle returned by [`Emitter::on`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Boxed event handler.
pub type Handler = Box<dyn FnMut(&VizEvent)>;

/// Minimal publish/subscribe surface owned by each controller.
#[derive(Default)]
pub struct Emitter {
    next: u64,
    handlers: BTreeMap<SubscriptionId, (VizEventKind, Handler)>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: VizEventKind, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.handlers.insert(id, (kind, handler));
        id
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.handlers.remove(&id).is_some()
    }

    /// Deliver `event` to every handler subscribed to its kind, in subscription order.
    pub fn emit(&mut self, event: &VizEvent) {
        for (kind, handler) in self.handlers.values_mut() {
            if *kind == event.kind {
                handler(event);
            }
        }
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
