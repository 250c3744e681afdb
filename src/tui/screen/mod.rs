//! Retained screen tree
//!
//! The screen is the host every widget renders into. It owns:
//! - the node tree, where tree order is focus order
//! - the focused ("active") node
//! - the background scroll offset and its lock
//! - screen-level key listeners
//! - callbacks deferred until the next draw has finished
//!
//! Pages and dialogs mount nodes here, lay them out during render (which
//! records each node's area for hit testing) and react to focus changes.

mod frame;
mod listeners;
mod node;
mod scroll;

pub use frame::{FrameCallback, FrameCallbackId, FrameQueue};
pub use listeners::{KeyDispatch, KeyListener, ListenerId, ListenerPhase, ListenerRegistry};
pub use node::{Node, NodeId, NodeKind, NodeSpec};
pub use scroll::{ScrollLockToken, ScrollState};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::Rect;
use tracing::{debug, trace};

/// Rows moved by PageUp/PageDown
const SCROLL_PAGE: i32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("cannot append {child} under {parent}: it would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },
}

pub type ScreenResult<T> = std::result::Result<T, ScreenError>;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug)]
pub struct Screen {
    nodes: Vec<Slot>,
    /// Empty slots ready for reuse
    free: Vec<usize>,
    root: NodeId,
    active: Option<NodeId>,
    title: String,
    scroll: ScrollState,
    listeners: ListenerRegistry,
    frames: FrameQueue,
}

impl Screen {
    pub fn new() -> Self {
        let root = Node::from_spec(&NodeSpec::container().with_role("body"));
        Self {
            nodes: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            active: None,
            title: String::new(),
            scroll: ScrollState::new(),
            listeners: ListenerRegistry::new(),
            frames: FrameQueue::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn require(&self, id: NodeId) -> ScreenResult<&Node> {
        self.node(id).ok_or(ScreenError::UnknownNode(id))
    }

    /// Create a detached node (and its children) from a [`NodeSpec`]
    pub fn create(&mut self, spec: &NodeSpec) -> NodeId {
        let node = Some(Node::from_spec(spec));
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index];
                slot.generation += 1;
                slot.node = node;
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.nodes.push(Slot { generation: 0, node });
                NodeId {
                    index: self.nodes.len() - 1,
                    generation: 0,
                }
            }
        };
        for child_spec in &spec.children {
            let child = self.create(child_spec);
            if let Some(node) = self.node_mut(child) {
                node.parent = Some(id);
            }
            if let Some(node) = self.node_mut(id) {
                node.children.push(child);
            }
        }
        id
    }

    /// Create a node from `spec` as the last child of `parent`
    pub fn insert(&mut self, parent: NodeId, spec: &NodeSpec) -> ScreenResult<NodeId> {
        self.require(parent)?;
        let id = self.create(spec);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Move `child` (and its subtree) to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> ScreenResult<()> {
        self.require(parent)?;
        self.require(child)?;
        if self.contains(child, parent) {
            return Err(ScreenError::WouldCreateCycle { parent, child });
        }
        self.unlink(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Take a node out of the tree, keeping it alive
    pub fn detach(&mut self, id: NodeId) -> ScreenResult<()> {
        self.require(id)?;
        self.unlink(id);
        if self.active.is_some_and(|active| self.contains(id, active)) {
            self.active = None;
        }
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.node_mut(id).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|parent| self.node_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
    }

    /// Drop a node and its subtree. Ids into the subtree go stale.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || self.node(id).is_none() {
            return false;
        }
        self.unlink(id);
        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));
        for node in &doomed {
            if self.active == Some(*node) {
                self.active = None;
            }
            let slot = &mut self.nodes[node.index];
            slot.node = None;
            // a slot whose generation ran out is retired
            if slot.generation < u32::MAX {
                self.free.push(node.index);
            }
        }
        trace!("removed {} nodes under {}", doomed.len(), id);
        true
    }

    /// Whether `id` is `ancestor` or lies beneath it
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.node(node_id).and_then(|node| node.parent);
        }
        false
    }

    /// Whether the node exists and hangs off the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.contains(self.root, id)
    }

    /// Descendants of `id` in tree order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            if let Some(node) = self.node(next) {
                out.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Focusable descendants of `id` in tree order. Always computed fresh.
    pub fn focusable_within(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node_id| self.node(*node_id).is_some_and(Node::is_focusable))
            .collect()
    }

    pub fn is_focusable(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_focusable) && self.is_attached(id)
    }

    pub fn active_node(&self) -> Option<NodeId> {
        self.active
    }

    /// Focus `id` if it is attached and focusable
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_focusable(id) {
            trace!("ignoring focus request for {}", id);
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Default Tab: next focusable node on the whole screen, wrapping
    pub fn focus_next(&mut self) -> bool {
        self.step_focus(true)
    }

    /// Default Shift+Tab
    pub fn focus_previous(&mut self) -> bool {
        self.step_focus(false)
    }

    fn step_focus(&mut self, forward: bool) -> bool {
        let order = self.focusable_within(self.root);
        if order.is_empty() {
            return false;
        }
        let current = self
            .active
            .and_then(|active| order.iter().position(|id| *id == active));
        let next = match (current, forward) {
            (Some(index), true) => (index + 1) % order.len(),
            (Some(index), false) => (index + order.len() - 1) % order.len(),
            (None, true) => 0,
            (None, false) => order.len() - 1,
        };
        self.active = Some(order[next]);
        true
    }

    /// Record the area a node occupied in this layout pass
    pub fn set_area(&mut self, id: NodeId, area: Rect) {
        if let Some(node) = self.node_mut(id) {
            node.area = area;
        }
    }

    /// Deepest node under the point, later siblings first
    pub fn hit_test(&self, column: u16, row: u16) -> Option<NodeId> {
        self.hit_node(self.root, column, row)
    }

    fn hit_node(&self, id: NodeId, column: u16, row: u16) -> Option<NodeId> {
        let node = self.node(id)?;
        if !node.contains_point(column, row) {
            return None;
        }
        node.children
            .iter()
            .rev()
            .find_map(|child| self.hit_node(*child, column, row))
            .or(Some(id))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn lock_scroll(&mut self) -> ScrollLockToken {
        let token = self.scroll.lock();
        debug!("scroll locked ({} holders)", self.scroll.holders());
        token
    }

    pub fn release_scroll(&mut self, token: ScrollLockToken) {
        self.scroll.release(token);
        debug!("scroll lock released ({} holders)", self.scroll.holders());
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll.is_locked()
    }

    pub fn scroll_by(&mut self, delta: i32) -> bool {
        self.scroll.scroll_by(delta)
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll.offset()
    }

    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll.clamp_to(max);
    }

    pub fn add_key_listener(&mut self, phase: ListenerPhase, listener: KeyListener) -> ListenerId {
        self.listeners.add(phase, listener)
    }

    pub fn remove_key_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn key_listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn dispatch_key(&mut self, phase: ListenerPhase, event: &mut KeyDispatch) {
        self.listeners.dispatch(phase, event);
    }

    /// Run `callback` once the next draw has finished laying out
    pub fn request_frame(&mut self, callback: FrameCallback) -> FrameCallbackId {
        self.frames.push(callback)
    }

    pub fn cancel_frame(&mut self, id: FrameCallbackId) -> bool {
        self.frames.cancel(id)
    }

    /// Called by the event loop right after a draw. Callbacks requested
    /// while running wait for the following frame.
    pub fn run_frame_callbacks(&mut self) -> usize {
        let callbacks = self.frames.take();
        let count = callbacks.len();
        for (_, callback) in callbacks {
            callback(self);
        }
        count
    }

    /// What the screen does with a key nobody prevented: focus traversal,
    /// background scrolling and editing of the focused field. Returns whether
    /// anything changed.
    pub fn apply_default_action(&mut self, event: &KeyDispatch) -> bool {
        if event.is_default_prevented() {
            return false;
        }
        if event.is_back_tab() {
            return self.focus_previous();
        }
        if event.is_tab() {
            return self.focus_next();
        }
        match event.code() {
            KeyCode::PageDown => return self.scroll.scroll_by(SCROLL_PAGE),
            KeyCode::PageUp => return self.scroll.scroll_by(-SCROLL_PAGE),
            _ => {}
        }
        if event
            .modifiers()
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }

        let Some(active) = self.active else {
            return false;
        };
        let Some(node) = self.node_mut(active) else {
            return false;
        };
        match (&mut node.kind, event.code()) {
            (NodeKind::Input { value } | NodeKind::TextArea { value }, KeyCode::Char(c)) => {
                value.push(c);
                true
            }
            (NodeKind::Input { value } | NodeKind::TextArea { value }, KeyCode::Backspace) => {
                value.pop().is_some()
            }
            (NodeKind::TextArea { value }, KeyCode::Enter) => {
                value.push('\n');
                true
            }
            (NodeKind::Select { options, selected }, KeyCode::Down) if !options.is_empty() => {
                *selected = (*selected + 1) % options.len();
                true
            }
            (NodeKind::Select { options, selected }, KeyCode::Up) if !options.is_empty() => {
                *selected = (*selected + options.len() - 1) % options.len();
                true
            }
            _ => false,
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyDispatch {
        KeyDispatch::new(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_tree_order_focusables() {
        let mut screen = Screen::new();
        let root = screen.root();
        let form = screen
            .insert(
                root,
                &NodeSpec::container().with_children(vec![
                    NodeSpec::text("Name"),
                    NodeSpec::input("name"),
                    NodeSpec::group(vec![NodeSpec::button("Save"), NodeSpec::button("Cancel")]),
                ]),
            )
            .unwrap();
        let after = screen.insert(root, &NodeSpec::button("After")).unwrap();

        let focusables = screen.focusable_within(form);
        assert_eq!(focusables.len(), 3);
        assert!(!focusables.contains(&after));
        let labels: Vec<_> = focusables
            .iter()
            .map(|id| screen.node(*id).unwrap().label.clone())
            .collect();
        assert_eq!(labels, vec!["name", "Save", "Cancel"]);
    }

    #[test]
    fn test_removed_ids_go_stale() {
        let mut screen = Screen::new();
        let root = screen.root();
        let button = screen.insert(root, &NodeSpec::button("x")).unwrap();
        assert!(screen.focus(button));

        assert!(screen.remove(button));
        assert!(screen.node(button).is_none());
        assert!(!screen.is_attached(button));
        assert_eq!(screen.active_node(), None);
        assert!(!screen.remove(button));
    }

    #[test]
    fn test_reused_slot_keeps_old_id_stale() {
        let mut screen = Screen::new();
        let root = screen.root();
        let first = screen.insert(root, &NodeSpec::button("first")).unwrap();
        let slots = screen.nodes.len();

        assert!(screen.remove(first));
        let second = screen.insert(root, &NodeSpec::button("second")).unwrap();
        assert_eq!(screen.nodes.len(), slots);
        assert_eq!(second.index, first.index);
        assert_ne!(second, first);
        assert_ne!(second.to_string(), first.to_string());

        assert!(screen.node(first).is_none());
        assert!(!screen.focus(first));
        assert!(!screen.remove(first));
        assert_eq!(screen.node(second).unwrap().label, "second");
        assert_eq!(screen.node(root).unwrap().children(), &[second]);
    }

    #[test]
    fn test_rebuilding_rows_does_not_grow_the_arena() {
        let mut screen = Screen::new();
        let root = screen.root();
        let row = |name: &str| NodeSpec::group(vec![NodeSpec::text(name), NodeSpec::button("Delete")]);
        let mut rows: Vec<NodeId> = (0..5)
            .map(|n| screen.insert(root, &row(&format!("row {n}"))).unwrap())
            .collect();
        let slots = screen.nodes.len();

        for _ in 0..100 {
            for id in rows.drain(..) {
                screen.remove(id);
            }
            rows = (0..5)
                .map(|n| screen.insert(root, &row(&format!("row {n}"))).unwrap())
                .collect();
        }
        assert_eq!(screen.nodes.len(), slots);
        assert_eq!(screen.focusable_within(root).len(), 5);
    }

    #[test]
    fn test_detached_nodes_cannot_take_focus() {
        let mut screen = Screen::new();
        let root = screen.root();
        let button = screen.insert(root, &NodeSpec::button("x")).unwrap();
        screen.detach(button).unwrap();
        assert!(screen.node(button).is_some());
        assert!(!screen.is_attached(button));
        assert!(!screen.focus(button));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let mut screen = Screen::new();
        let root = screen.root();
        let outer = screen.insert(root, &NodeSpec::container()).unwrap();
        let inner = screen.insert(outer, &NodeSpec::container()).unwrap();
        assert!(matches!(
            screen.append_child(inner, outer),
            Err(ScreenError::WouldCreateCycle { .. })
        ));
    }

    #[test]
    fn test_default_tab_wraps_across_screen() {
        let mut screen = Screen::new();
        let root = screen.root();
        let a = screen.insert(root, &NodeSpec::button("a")).unwrap();
        let b = screen.insert(root, &NodeSpec::button("b")).unwrap();

        assert!(screen.apply_default_action(&key(KeyCode::Tab)));
        assert_eq!(screen.active_node(), Some(a));
        screen.apply_default_action(&key(KeyCode::Tab));
        assert_eq!(screen.active_node(), Some(b));
        screen.apply_default_action(&key(KeyCode::Tab));
        assert_eq!(screen.active_node(), Some(a));
        screen.apply_default_action(&KeyDispatch::new(KeyEvent::new(
            KeyCode::BackTab,
            KeyModifiers::SHIFT,
        )));
        assert_eq!(screen.active_node(), Some(b));
    }

    #[test]
    fn test_prevented_default_does_nothing() {
        let mut screen = Screen::new();
        let root = screen.root();
        screen.insert(root, &NodeSpec::button("a")).unwrap();
        let mut event = key(KeyCode::Tab);
        event.prevent_default();
        assert!(!screen.apply_default_action(&event));
        assert_eq!(screen.active_node(), None);
    }

    #[test]
    fn test_editing_focused_input() {
        let mut screen = Screen::new();
        let root = screen.root();
        let input = screen.insert(root, &NodeSpec::input("name")).unwrap();
        screen.focus(input);

        for c in "ops".chars() {
            screen.apply_default_action(&key(KeyCode::Char(c)));
        }
        screen.apply_default_action(&key(KeyCode::Backspace));
        assert_eq!(screen.node(input).unwrap().kind.value(), Some("op"));
    }

    #[test]
    fn test_hit_test_prefers_later_siblings() {
        let mut screen = Screen::new();
        let root = screen.root();
        screen.set_area(root, Rect::new(0, 0, 20, 10));
        let below = screen.insert(root, &NodeSpec::container()).unwrap();
        let above = screen.insert(root, &NodeSpec::container()).unwrap();
        let inner = screen.insert(above, &NodeSpec::button("ok")).unwrap();
        screen.set_area(below, Rect::new(0, 0, 20, 10));
        screen.set_area(above, Rect::new(5, 2, 10, 5));
        screen.set_area(inner, Rect::new(6, 3, 4, 1));

        assert_eq!(screen.hit_test(1, 1), Some(below));
        assert_eq!(screen.hit_test(5, 2), Some(above));
        assert_eq!(screen.hit_test(7, 3), Some(inner));
        assert_eq!(screen.hit_test(30, 30), None);
    }

    #[test]
    fn test_frame_callbacks_run_once_and_can_be_cancelled() {
        let mut screen = Screen::new();
        let root = screen.root();
        let button = screen.insert(root, &NodeSpec::button("x")).unwrap();

        screen.request_frame(Box::new(move |screen| {
            screen.focus(button);
        }));
        let cancelled = screen.request_frame(Box::new(|screen| screen.set_title("nope")));
        assert!(screen.cancel_frame(cancelled));
        assert!(!screen.cancel_frame(cancelled));
        assert_eq!(screen.active_node(), None);

        assert_eq!(screen.run_frame_callbacks(), 1);
        assert_eq!(screen.active_node(), Some(button));
        assert_eq!(screen.title(), "");
        assert_eq!(screen.run_frame_callbacks(), 0);
    }

    #[test]
    fn test_scroll_keys_respect_lock() {
        let mut screen = Screen::new();
        assert!(screen.apply_default_action(&key(KeyCode::PageDown)));
        assert_eq!(screen.scroll_offset(), 10);
        let token = screen.lock_scroll();
        assert!(!screen.apply_default_action(&key(KeyCode::PageDown)));
        screen.release_scroll(token);
        assert!(!screen.is_scroll_locked());
    }
}
