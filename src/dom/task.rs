use crate::dom::document::{Document, NodeId};
use crate::foundation::error::TidesResult;

/// Deferred document mutation scheduled on a [`crate::viz::schedule::FrameScheduler`].
///
/// Used for cleanup of short-lived decoration: spawned nodes are removed and temporary attribute
/// changes are restored by a timer owned by whoever spawned them.
#[derive(Clone, Debug, PartialEq)]
pub enum DomTask {
    Remove(NodeId),
    SetAttr {
        node: NodeId,
        name: &'static str,
        value: String,
    },
    RemoveClass {
        node: NodeId,
        class: &'static str,
    },
}

impl DomTask {
    /// Apply the mutation. Targets that were freed in the meantime are skipped.
    pub fn apply(&self, dom: &mut Document) -> TidesResult<()> {
        match self {
            Self::Remove(node) => {
                dom.remove(*node);
                Ok(())
            }
            Self::SetAttr { node, name, value } if dom.contains(*node) => {
                dom.set_attr(*node, name, value)
            }
            Self::RemoveClass { node, class } if dom.contains(*node) => {
                dom.remove_class(*node, class)
            }
            _ => Ok(()),
        }
    }
}
