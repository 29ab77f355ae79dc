//! Owned, detached node trees.
//!
//! A [`Node`] is a value: cloning it deep-copies the whole subtree. These are
//! what gets inserted into a [`Document`](super::Document) and what a
//! snapshot of a live subtree produces.

use std::collections::BTreeMap;

/// A detached element or text node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// An element with attributes, children and click listeners.
///
/// `class` is an ordinary space-separated attribute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
    pub listeners: Vec<Listener>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        let joined = match self.attributes.get("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.attributes.insert("class".to_string(), joined);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::text(text));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        has_class(&self.attributes, class)
    }
}

pub(crate) fn has_class(attributes: &BTreeMap<String, String>, class: &str) -> bool {
    attributes
        .get("class")
        .map(|c| c.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// What a click listener does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Swap the enclosing placeholder back for its original content.
    Reveal,
    /// A handler owned by the host page, identified by name.
    Host(String),
}

/// A click listener attached to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub action: ClickAction,
    pub stop_propagation: bool,
}

impl Listener {
    pub fn host(name: &str) -> Self {
        Self {
            action: ClickAction::Host(name.to_string()),
            stop_propagation: false,
        }
    }

    pub fn reveal() -> Self {
        Self {
            action: ClickAction::Reveal,
            stop_propagation: true,
        }
    }
}
