//! Arena-backed content tree
//!
//! The renderer adapters build one tree per content region. Elements carry
//! classes, attributes and an inline style; text lives only in text nodes.
//! Nodes removed from the tree stay in the arena but are unreachable from the
//! root, so every query walks from the root and never sees them.

use std::collections::BTreeMap;

use super::style::InlineStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    pub style: InlineStyle,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: InlineStyle::default(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTree {
    /// Create a tree holding only a `body` root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Element("body".to_string()))],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::new(NodeKind::Element(tag.to_string())))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::new(NodeKind::Text(text.to_string())))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Replace `old` in its parent's child list with `replacements`, in order.
    ///
    /// Returns false when `old` is the root or already detached.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> bool {
        let Some(parent) = self.nodes.get(old.0).and_then(|n| n.parent) else {
            return false;
        };
        if !self.nodes[parent.0].children.contains(&old) {
            return false;
        }
        for &id in replacements {
            if let Some(prev) = self.nodes[id.0].parent {
                self.nodes[prev.0].children.retain(|&c| c != id);
            }
            self.nodes[id.0].parent = Some(parent);
        }
        let Some(position) = self.nodes[parent.0].children.iter().position(|&c| c == old) else {
            return false;
        };
        let siblings = &mut self.nodes[parent.0].children;
        siblings.splice(position..=position, replacements.iter().copied());
        self.nodes[old.0].parent = None;
        true
    }

    /// Replace an element by its own children.
    pub fn unwrap_element(&mut self, id: NodeId) -> bool {
        let children = self.nodes[id.0].children.clone();
        self.replace_with(id, &children)
    }

    /// Merge adjacent text siblings throughout the tree.
    pub fn normalize(&mut self) {
        for id in self.descendants(self.root) {
            let children = self.nodes[id.0].children.clone();
            let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());
            for child in children {
                let child_text = self.nodes[child.0].text().map(str::to_string);
                let previous_is_text = merged
                    .last()
                    .map(|&prev| self.nodes[prev.0].text().is_some())
                    .unwrap_or(false);
                match (child_text, previous_is_text) {
                    (Some(text), true) => {
                        let prev = merged[merged.len() - 1];
                        if let NodeKind::Text(existing) = &mut self.nodes[prev.0].kind {
                            existing.push_str(&text);
                        }
                        self.nodes[child.0].parent = None;
                    }
                    _ => merged.push(child),
                }
            }
            self.nodes[id.0].children = merged;
        }
    }

    /// Pre-order walk starting at (and including) `from`.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Every attached text node in document order.
    pub fn text_nodes(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.nodes[id.0].text().is_some())
            .collect()
    }

    /// Every attached element carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.nodes[id.0].has_class(class))
            .collect()
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let node = &mut self.nodes[id.0];
        if !node.has_class(class) {
            node.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.nodes[id.0].classes.retain(|c| c != class);
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id.0]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.nodes[n.0].text())
            .collect()
    }

    /// Style of `id` after inheriting from every ancestor.
    pub fn computed_style(&self, id: NodeId) -> InlineStyle {
        let mut style = InlineStyle::default();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            style.inherit_from(&node.style);
            cursor = node.parent;
        }
        style
    }
}
