//! Arena-backed live document.
//!
//! Nodes are addressed by [`NodeId`] and never freed; a node removed from
//! the tree stays addressable but is no longer connected to `body`.

use std::collections::BTreeMap;
use std::fmt;

use super::node::{has_class, ClickAction, Element, Listener, Node};
use super::observer::{MutationRecord, ObserverHandle, ObserverRegistry};
use super::selector::SelectorList;
use crate::types::errors::DomError;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum SlotKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

struct Slot {
    kind: SlotKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
}

/// A click listener that fired during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredListener {
    pub node: NodeId,
    pub action: ClickAction,
}

/// The live page: a `body` root, its subtree, and mutation observers.
pub struct Document {
    slots: Vec<Slot>,
    body: NodeId,
    observers: ObserverRegistry,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Slot {
            kind: SlotKind::Element {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
            },
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        };
        Self {
            slots: vec![body],
            body: NodeId(0),
            observers: ObserverRegistry::default(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, DomError> {
        self.slots.get(id.0).ok_or(DomError::NodeNotFound(id.0))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, DomError> {
        self.slots.get_mut(id.0).ok_or(DomError::NodeNotFound(id.0))
    }

    fn element_attrs_mut(&mut self, id: NodeId) -> Result<&mut BTreeMap<String, String>, DomError> {
        match &mut self.slot_mut(id)?.kind {
            SlotKind::Element { attributes, .. } => Ok(attributes),
            SlotKind::Text(_) => Err(DomError::NotAnElement(id.0)),
        }
    }

    // ─── Construction ───

    /// Copies an owned tree into the arena as a detached subtree.
    pub fn adopt(&mut self, node: &Node) -> NodeId {
        let id = NodeId(self.slots.len());
        let (kind, listeners) = match node {
            Node::Text(t) => (SlotKind::Text(t.clone()), Vec::new()),
            Node::Element(el) => (
                SlotKind::Element {
                    tag: el.tag.clone(),
                    attributes: el.attributes.clone(),
                },
                el.listeners.clone(),
            ),
        };
        self.slots.push(Slot {
            kind,
            parent: None,
            children: Vec::new(),
            listeners,
        });
        if let Node::Element(el) = node {
            for child in &el.children {
                let child_id = self.adopt(child);
                self.slots[child_id.0].parent = Some(id);
                self.slots[id.0].children.push(child_id);
            }
        }
        id
    }

    /// Deep copy of a live subtree as an owned tree.
    pub fn snapshot(&self, id: NodeId) -> Result<Node, DomError> {
        self.snapshot_with(id, &|_| None)
    }

    /// Deep copy where any descendant for which `substitute` returns a tree
    /// is copied as that tree instead.
    pub fn snapshot_with(
        &self,
        id: NodeId,
        substitute: &dyn Fn(NodeId) -> Option<Node>,
    ) -> Result<Node, DomError> {
        let slot = self.slot(id)?;
        match &slot.kind {
            SlotKind::Text(t) => Ok(Node::Text(t.clone())),
            SlotKind::Element { tag, attributes } => {
                let children = slot
                    .children
                    .iter()
                    .map(|c| match substitute(*c) {
                        Some(node) => Ok(node),
                        None => self.snapshot_with(*c, substitute),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Node::Element(Element {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                    children,
                    listeners: slot.listeners.clone(),
                }))
            }
        }
    }

    // ─── Tree mutation ───

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !matches!(self.slot(parent)?.kind, SlotKind::Element { .. }) {
            return Err(DomError::NotAnElement(parent.0));
        }
        if self.slot(child)?.parent.is_some() || child == self.body {
            return Err(DomError::AlreadyAttached(child.0));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{} cannot be inserted under its own descendant {}",
                child, parent
            )));
        }
        Ok(())
    }

    /// Appends a detached node to `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.slots[child.0].parent = Some(parent);
        self.slots[parent.0].children.push(child);
        self.notify(MutationRecord {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    /// Adopts and appends an owned tree; returns the new node.
    pub fn append(&mut self, parent: NodeId, node: &Node) -> Result<NodeId, DomError> {
        let id = self.adopt(node);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Appends several trees as a single mutation record, the way a host
    /// coalesces an infinite-scroll page load.
    pub fn append_all(&mut self, parent: NodeId, nodes: &[Node]) -> Result<Vec<NodeId>, DomError> {
        let ids: Vec<NodeId> = nodes.iter().map(|n| self.adopt(n)).collect();
        for id in &ids {
            self.check_insertable(parent, *id)?;
        }
        for id in &ids {
            self.slots[id.0].parent = Some(parent);
            self.slots[parent.0].children.push(*id);
        }
        self.notify(MutationRecord {
            target: parent,
            added: ids.clone(),
            removed: Vec::new(),
        });
        Ok(ids)
    }

    /// Detaches a node from its parent.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self.slot(id)?.parent.ok_or(DomError::Detached(id.0))?;
        self.slots[parent.0].children.retain(|c| *c != id);
        self.slots[id.0].parent = None;
        self.notify(MutationRecord {
            target: parent,
            added: Vec::new(),
            removed: vec![id],
        });
        Ok(())
    }

    /// Puts the detached `new` where `old` is and detaches `old`.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        let parent = self.slot(old)?.parent.ok_or(DomError::Detached(old.0))?;
        self.check_insertable(parent, new)?;
        let pos = self.slots[parent.0]
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or(DomError::Detached(old.0))?;
        self.slots[parent.0].children[pos] = new;
        self.slots[new.0].parent = Some(parent);
        self.slots[old.0].parent = None;
        self.notify(MutationRecord {
            target: parent,
            added: vec![new],
            removed: vec![old],
        });
        Ok(())
    }

    // ─── Inspection ───

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|s| s.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(id.0)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.slots.get(id.0)?.kind {
            SlotKind::Element { tag, .. } => Some(tag),
            SlotKind::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    /// True when `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// True when the node is reachable from `body`.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.body, id)
    }

    pub fn text_content(&self, id: NodeId) -> Result<String, DomError> {
        let mut out = String::new();
        self.collect_text(id, None, &mut out)?;
        Ok(out)
    }

    /// Text content leaving out descendant elements that carry `class`.
    pub fn text_content_skipping(&self, id: NodeId, class: &str) -> Result<String, DomError> {
        let mut out = String::new();
        self.collect_text(id, Some(class), &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, id: NodeId, skip: Option<&str>, out: &mut String) -> Result<(), DomError> {
        let slot = self.slot(id)?;
        match &slot.kind {
            SlotKind::Text(t) => out.push_str(t),
            SlotKind::Element { .. } => {
                for child in &slot.children {
                    if skip.map_or(false, |class| self.has_class(*child, class)) {
                        continue;
                    }
                    self.collect_text(*child, skip, out)?;
                }
            }
        }
        Ok(())
    }

    // ─── Attributes ───

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.slots.get(id.0)?.kind {
            SlotKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            SlotKind::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_attrs_mut(id)?
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        Ok(self.element_attrs_mut(id)?.remove(name).is_some())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        match self.slots.get(id.0).map(|s| &s.kind) {
            Some(SlotKind::Element { attributes, .. }) => has_class(attributes, class),
            _ => false,
        }
    }

    // ─── Selectors ───

    pub fn matches(&self, id: NodeId, selectors: &SelectorList) -> bool {
        match self.slots.get(id.0).map(|s| &s.kind) {
            Some(SlotKind::Element { tag, attributes }) => selectors.matches(tag, attributes),
            _ => false,
        }
    }

    /// Connected elements matching `selectors`, `body` included, in document order.
    pub fn query_all(&self, selectors: &SelectorList) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.body, true, selectors, &mut out);
        out
    }

    /// Descendants of `root` matching `selectors`, `root` excluded, in document order.
    pub fn query_within(&self, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(root, false, selectors, &mut out);
        out
    }

    fn walk(&self, id: NodeId, include_self: bool, selectors: &SelectorList, out: &mut Vec<NodeId>) {
        if include_self && self.matches(id, selectors) {
            out.push(id);
        }
        for child in self.children(id) {
            self.walk(*child, true, selectors, out);
        }
    }

    // ─── Events ───

    pub fn add_listener(&mut self, id: NodeId, listener: Listener) -> Result<(), DomError> {
        self.slot_mut(id)?.listeners.push(listener);
        Ok(())
    }

    /// Bubbles a click from `target` towards the root.
    ///
    /// Every listener on a node fires; the walk ends after a node on which
    /// any listener stopped propagation.
    pub fn dispatch_click(&self, target: NodeId) -> Result<Vec<FiredListener>, DomError> {
        self.slot(target)?;
        let mut fired = Vec::new();
        let mut cur = Some(target);
        while let Some(id) = cur {
            let slot = self.slot(id)?;
            let mut stop = false;
            for listener in &slot.listeners {
                fired.push(FiredListener {
                    node: id,
                    action: listener.action.clone(),
                });
                stop |= listener.stop_propagation;
            }
            if stop {
                break;
            }
            cur = slot.parent;
        }
        Ok(fired)
    }

    // ─── Observers ───

    /// Subscribes to childList mutations anywhere under `root`.
    pub fn observe(&mut self, root: NodeId) -> ObserverHandle {
        self.observers.register(root)
    }

    /// Ends a subscription. Records already queued stay in the handle.
    pub fn disconnect(&mut self, handle: &ObserverHandle) -> bool {
        self.observers.unregister(handle.id())
    }

    /// Number of live subscriptions.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, record: MutationRecord) {
        let targets: Vec<_> = self
            .observers
            .roots()
            .into_iter()
            .filter(|(_, root)| self.contains(*root, record.target))
            .map(|(id, _)| id)
            .collect();
        self.observers.deliver(&targets, &record);
    }
}
