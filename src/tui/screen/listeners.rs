//! Screen-level key listeners
//!
//! Listeners see every key event before (capture) or after (bubble) the
//! current page handles it. The dialog controller uses a capture listener
//! for Escape so it wins over page shortcuts.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeMap;

/// A key event travelling through the dispatch phases
#[derive(Debug, Clone)]
pub struct KeyDispatch {
    key: KeyEvent,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyDispatch {
    pub fn new(key: KeyEvent) -> Self {
        Self {
            key,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn code(&self) -> KeyCode {
        self.key.code
    }

    pub fn modifiers(&self) -> KeyModifiers {
        self.key.modifiers
    }

    /// Forward Tab, without Shift
    pub fn is_tab(&self) -> bool {
        self.key.code == KeyCode::Tab && !self.key.modifiers.contains(KeyModifiers::SHIFT)
    }

    /// Shift+Tab; terminals report it either as BackTab or as Tab with Shift
    pub fn is_back_tab(&self) -> bool {
        self.key.code == KeyCode::BackTab
            || (self.key.code == KeyCode::Tab && self.key.modifiers.contains(KeyModifiers::SHIFT))
    }

    /// Suppress the screen's default action for this key
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Keep later listeners and the page from seeing this key
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerPhase {
    Capture,
    Bubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub type KeyListener = Box<dyn FnMut(&mut KeyDispatch) + Send + Sync>;

struct Registered {
    phase: ListenerPhase,
    callback: KeyListener,
}

/// Registry of screen-level key listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: BTreeMap<ListenerId, Registered>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, phase: ListenerPhase, callback: KeyListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Registered { phase, callback });
        id
    }

    /// Returns false when the listener was already removed
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run the listeners of one phase, most recently added first, until one
    /// stops propagation. Newest-first lets the topmost of several stacked
    /// dialogs claim a key.
    pub fn dispatch(&mut self, phase: ListenerPhase, event: &mut KeyDispatch) {
        for registered in self.listeners.values_mut().rev() {
            if event.is_propagation_stopped() {
                break;
            }
            if registered.phase == phase {
                (registered.callback)(event);
            }
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
