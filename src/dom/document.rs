use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::VizKey;
use crate::foundation::error::{TidesError, TidesResult};

/// Handle to one element in a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

/// Handle to one registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Pointer events the page reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomEventKind {
    Click,
    MouseEnter,
    MouseLeave,
}

/// Easter eggs attached to scene illustrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EggKind {
    /// Forest canopy click drops a leaf.
    DropLeaf,
    /// City skyline hover lights beacons on two buildings.
    Beacons,
    /// Lab beaker click spawns bubbles.
    Bubbles,
}

/// What a listener does when its event fires.
///
/// Listeners are data, not closures: the page routes the returned interactions to their owner,
/// which keeps every handler reachable from exactly one node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// Illustration easter egg, handled by the illustration mounter.
    Egg { egg: EggKind },
    /// Controller-owned interaction, handled by the controller for `viz`.
    Viz { viz: VizKey, action: String },
    /// Page-level micro interaction.
    Micro { name: String },
}

#[derive(Clone, Debug)]
struct Listener {
    node: NodeId,
    kind: DomEventKind,
    interaction: Interaction,
    once: bool,
}

#[derive(Clone, Debug)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Headless element tree standing in for the page DOM.
///
/// The tree starts with `html > body`. Nodes created but never attached, or detached later, stay
/// in the arena until [`Document::remove`] frees them together with their listeners.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: BTreeMap<NodeId, NodeData>,
    listeners: BTreeMap<ListenerId, Listener>,
    next_node: u64,
    next_listener: u64,
    root: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with an `html` root and a `body`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: BTreeMap::new(),
            listeners: BTreeMap::new(),
            next_node: 0,
            next_listener: 0,
            root: NodeId(0),
            body: NodeId(0),
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.link(root, body, false);
        doc.root = root;
        doc.body = body;
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            NodeData {
                tag: tag.to_string(),
                attrs: Vec::new(),
                text: None,
                children: Vec::new(),
                parent: None,
            },
        );
        id
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_new(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> TidesResult<NodeId> {
        self.node(parent)?;
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(id, name, value)?;
        }
        self.link(parent, id, false);
        Ok(id)
    }

    /// Whether `node` still exists in the arena.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append `child` as the last child of `parent`, moving it if already attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TidesResult<()> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link(parent, child, false);
        Ok(())
    }

    /// Insert `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> TidesResult<()> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link(parent, child, true);
        Ok(())
    }

    /// Unparent `node`, keeping it (and its listeners) alive for re-insertion.
    pub fn detach(&mut self, node: NodeId) {
        self.unlink(node);
    }

    /// Detach `node` and free its whole subtree and every listener registered inside it.
    ///
    /// Returns the number of freed nodes (0 for an unknown node).
    pub fn remove(&mut self, node: NodeId) -> usize {
        if !self.contains(node) || node == self.root || node == self.body {
            return 0;
        }
        self.unlink(node);
        let doomed: BTreeSet<NodeId> = self.subtree(node).into_iter().collect();
        self.listeners.retain(|_, l| !doomed.contains(&l.node));
        for id in &doomed {
            self.nodes.remove(id);
        }
        doomed.len()
    }

    /// Free every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) -> usize {
        let children = self.children(node).to_vec();
        children.into_iter().map(|c| self.remove(c)).sum()
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == self.root {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> TidesResult<()> {
        let data = self.node_mut(node)?;
        match data.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => data.attrs.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(data) = self.nodes.get_mut(&node) {
            data.attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self, node: NodeId) -> &[(String, String)] {
        self.nodes
            .get(&node)
            .map(|n| n.attrs.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> TidesResult<()> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let next = match self.attr(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", &next)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> TidesResult<()> {
        let Some(existing) = self.attr(node, "class") else {
            return Ok(());
        };
        let next = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "class", &next)
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) -> TidesResult<()> {
        self.node_mut(node)?.text = Some(text.to_string());
        Ok(())
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node)?.text.as_deref()
    }

    /// Attached element with the given `id` attribute (document order).
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.subtree(self.root)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    /// `within` and its descendants carrying `class`, in document order.
    pub fn find_by_class(&self, within: NodeId, class: &str) -> Vec<NodeId> {
        self.subtree(within)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// First match of [`Document::find_by_class`].
    pub fn first_by_class(&self, within: NodeId, class: &str) -> Option<NodeId> {
        self.subtree(within)
            .into_iter()
            .find(|n| self.has_class(*n, class))
    }

    /// `within` and its descendants with the given tag, in document order.
    pub fn find_by_tag(&self, within: NodeId, tag: &str) -> Vec<NodeId> {
        self.subtree(within)
            .into_iter()
            .filter(|n| self.tag(*n) == Some(tag))
            .collect()
    }

    /// Closest ancestor-or-self carrying `class`.
    pub fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if self.has_class(id, class) {
                return Some(id);
            }
            cur = self.parent(id);
        }
        None
    }

    /// `node` followed by all of its descendants in pre-order.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(node) {
            return out;
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Register a listener on `node` itself.
    pub fn listen(
        &mut self,
        node: NodeId,
        kind: DomEventKind,
        interaction: Interaction,
    ) -> TidesResult<ListenerId> {
        self.add_listener(node, kind, interaction, false)
    }

    /// Register a listener that unregisters itself after the first dispatch.
    pub fn listen_once(
        &mut self,
        node: NodeId,
        kind: DomEventKind,
        interaction: Interaction,
    ) -> TidesResult<ListenerId> {
        self.add_listener(node, kind, interaction, true)
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Total registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners registered anywhere inside `node`'s subtree.
    pub fn listeners_within(&self, node: NodeId) -> usize {
        let inside: BTreeSet<NodeId> = self.subtree(node).into_iter().collect();
        self.listeners
            .values()
            .filter(|l| inside.contains(&l.node))
            .count()
    }

    /// Fire `kind` at `target`, bubbling to the root.
    ///
    /// Returns the matching interactions innermost first; `once` listeners are dropped.
    pub fn dispatch(&mut self, target: NodeId, kind: DomEventKind) -> Vec<Interaction> {
        let mut out = Vec::new();
        let mut spent = Vec::new();
        let mut cur = Some(target);
        while let Some(node) = cur {
            for (id, l) in &self.listeners {
                if l.node == node && l.kind == kind {
                    out.push(l.interaction.clone());
                    if l.once {
                        spent.push(*id);
                    }
                }
            }
            cur = self.parent(node);
        }
        for id in spent {
            self.listeners.remove(&id);
        }
        out
    }

    fn add_listener(
        &mut self,
        node: NodeId,
        kind: DomEventKind,
        interaction: Interaction,
        once: bool,
    ) -> TidesResult<ListenerId> {
        self.node(node)?;
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(
            id,
            Listener {
                node,
                kind,
                interaction,
                once,
            },
        );
        Ok(id)
    }

    fn node(&self, node: NodeId) -> TidesResult<&NodeData> {
        self.nodes
            .get(&node)
            .ok_or_else(|| TidesError::validation(format!("unknown node {node:?}")))
    }

    fn node_mut(&mut self, node: NodeId) -> TidesResult<&mut NodeData> {
        self.nodes
            .get_mut(&node)
            .ok_or_else(|| TidesError::validation(format!("unknown node {node:?}")))
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> TidesResult<()> {
        self.node(parent)?;
        self.node(child)?;
        let mut cur = Some(parent);
        while let Some(id) = cur {
            if id == child {
                return Err(TidesError::validation(
                    "cannot insert a node into its own subtree",
                ));
            }
            cur = self.parent(id);
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId, front: bool) {
        if let Some(p) = self.nodes.get_mut(&parent) {
            if front {
                p.children.insert(0, child);
            } else {
                p.children.push(child);
            }
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/document.rs"]
mod tests;
