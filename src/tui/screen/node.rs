//! Nodes of the retained screen tree

use ratatui::layout::Rect;
use std::collections::HashMap;

/// Handle to a node stored in a [`Screen`](super::Screen).
///
/// Slots are recycled after removal, but each reuse bumps the slot's
/// generation: once a node is removed every lookup through its id returns
/// `None`, even after another node took its slot. Holding a `NodeId` never
/// keeps a node alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(super) index: usize,
    pub(super) generation: u32,
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// What a node is, and the state interactive kinds carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Layout-only grouping node
    Container,
    /// Static text
    Text,
    Button,
    /// A link is only interactive when it points somewhere
    Link { href: Option<String> },
    Input { value: String },
    Select { options: Vec<String>, selected: usize },
    TextArea { value: String },
}

impl NodeKind {
    /// Whether the kind takes focus without an explicit tab index
    pub fn is_interactive(&self) -> bool {
        match self {
            NodeKind::Button
            | NodeKind::Input { .. }
            | NodeKind::Select { .. }
            | NodeKind::TextArea { .. } => true,
            NodeKind::Link { href } => href.is_some(),
            NodeKind::Container | NodeKind::Text => false,
        }
    }

    /// Current text value of editable kinds
    pub fn value(&self) -> Option<&str> {
        match self {
            NodeKind::Input { value } | NodeKind::TextArea { value } => Some(value),
            NodeKind::Select { options, selected } => options.get(*selected).map(String::as_str),
            _ => None,
        }
    }
}

/// Description of a node to create, optionally with children
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub label: String,
    pub tab_index: Option<i32>,
    pub disabled: bool,
    pub role: Option<String>,
    pub attributes: HashMap<String, String>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            tab_index: None,
            disabled: false,
            role: None,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn container() -> Self {
        Self::new(NodeKind::Container, "")
    }

    /// Horizontal row of nodes
    pub fn group(children: Vec<NodeSpec>) -> Self {
        Self::container().with_role("group").with_children(children)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text, text)
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::new(NodeKind::Button, label)
    }

    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(NodeKind::Link { href: Some(href.into()) }, label)
    }

    pub fn input(label: impl Into<String>) -> Self {
        Self::new(NodeKind::Input { value: String::new() }, label)
    }

    pub fn select(label: impl Into<String>, options: Vec<String>) -> Self {
        Self::new(NodeKind::Select { options, selected: 0 }, label)
    }

    pub fn textarea(label: impl Into<String>) -> Self {
        Self::new(NodeKind::TextArea { value: String::new() }, label)
    }

    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }
}

/// A node living in the screen arena
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub label: String,
    pub tab_index: Option<i32>,
    pub disabled: bool,
    pub role: Option<String>,
    pub attributes: HashMap<String, String>,
    /// Area occupied during the last layout pass
    pub area: Rect,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    pub(super) fn from_spec(spec: &NodeSpec) -> Self {
        Self {
            kind: spec.kind.clone(),
            label: spec.label.clone(),
            tab_index: spec.tab_index,
            disabled: spec.disabled,
            role: spec.role.clone(),
            attributes: spec.attributes.clone(),
            area: Rect::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Interactive kinds, or anything with a tab index other than -1.
    /// Disabled nodes never take focus.
    pub fn is_focusable(&self) -> bool {
        if self.disabled {
            return false;
        }
        self.kind.is_interactive() || matches!(self.tab_index, Some(index) if index != -1)
    }

    pub fn contains_point(&self, column: u16, row: u16) -> bool {
        let area = self.area;
        column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interactive_kinds_are_focusable() {
        assert!(Node::from_spec(&NodeSpec::button("Save")).is_focusable());
        assert!(Node::from_spec(&NodeSpec::input("Name")).is_focusable());
        assert!(Node::from_spec(&NodeSpec::textarea("Notes")).is_focusable());
        assert!(Node::from_spec(&NodeSpec::link("Docs", "/docs")).is_focusable());
        assert!(!Node::from_spec(&NodeSpec::text("Hello")).is_focusable());
        assert!(!Node::from_spec(&NodeSpec::new(NodeKind::Link { href: None }, "anchor")).is_focusable());
    }

    #[test]
    fn test_tab_index_rules() {
        assert!(Node::from_spec(&NodeSpec::container().with_tab_index(0)).is_focusable());
        assert!(Node::from_spec(&NodeSpec::text("x").with_tab_index(3)).is_focusable());
        assert!(!Node::from_spec(&NodeSpec::container().with_tab_index(-1)).is_focusable());
        // interactive kinds stay focusable even with tabindex -1
        assert!(Node::from_spec(&NodeSpec::button("x").with_tab_index(-1)).is_focusable());
    }

    #[test]
    fn test_disabled_is_not_focusable() {
        assert!(!Node::from_spec(&NodeSpec::button("Save").disabled(true)).is_focusable());
    }

    #[test]
    fn test_contains_point() {
        let mut node = Node::from_spec(&NodeSpec::button("ok"));
        node.area = Rect::new(2, 3, 4, 1);
        assert!(node.contains_point(2, 3));
        assert!(node.contains_point(5, 3));
        assert!(!node.contains_point(6, 3));
        assert!(!node.contains_point(2, 4));
    }
}
