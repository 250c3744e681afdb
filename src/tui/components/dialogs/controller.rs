//! Focus and dismissal lifecycle shared by every modal dialog
//!
//! One open/close cycle looks like this:
//! 1. `open` remembers the focused node, installs a capture-phase Escape
//!    listener, takes a scroll lock and schedules the initial focus move for
//!    the next frame (after the dialog content has been laid out).
//! 2. While open, `handle_tab` keeps Tab/Shift+Tab cycling inside the dialog.
//! 3. `close` undoes all of it and hands focus back to the remembered node
//!    if that node is still on screen.

use super::types::DialogCallback;
use crate::tui::screen::{
    FrameCallbackId, KeyDispatch, ListenerId, ListenerPhase, NodeId, Screen, ScrollLockToken,
};
use crossterm::event::KeyCode;
use tracing::{debug, warn};

/// Where focus lands once the dialog has been laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialFocus {
    /// First focusable node inside the dialog, in tree order
    FirstFocusable,
    /// A specific node; falls back to the first focusable one if the node is
    /// gone or cannot take focus by then
    Node(NodeId),
}

#[derive(Debug, Default)]
pub struct DialogController {
    open: bool,
    /// Weak: the id goes stale if the node is removed while the dialog is up
    previous_focus: Option<NodeId>,
    escape_listener: Option<ListenerId>,
    scroll_lock: Option<ScrollLockToken>,
    pending_focus: Option<FrameCallbackId>,
}

impl DialogController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Node that had focus before the dialog opened, while open
    pub fn previous_focus(&self) -> Option<NodeId> {
        self.previous_focus
    }

    /// Open transition for the dialog rooted at `dialog`. Does nothing when
    /// already open.
    pub fn open(
        &mut self,
        screen: &mut Screen,
        dialog: NodeId,
        initial: InitialFocus,
        on_close: DialogCallback,
    ) {
        if self.open {
            return;
        }
        self.open = true;
        self.previous_focus = screen.active_node();

        self.escape_listener = Some(screen.add_key_listener(
            ListenerPhase::Capture,
            Box::new(move |event: &mut KeyDispatch| {
                if event.code() == KeyCode::Esc {
                    event.prevent_default();
                    event.stop_propagation();
                    on_close();
                }
            }),
        ));
        self.scroll_lock = Some(screen.lock_scroll());
        self.pending_focus = Some(screen.request_frame(Box::new(move |screen: &mut Screen| {
            let target = match initial {
                InitialFocus::Node(id) if screen.contains(dialog, id) && screen.is_focusable(id) => {
                    Some(id)
                }
                _ => screen.focusable_within(dialog).first().copied(),
            };
            match target {
                Some(id) => {
                    screen.focus(id);
                }
                None => debug!("dialog {} has nothing focusable", dialog),
            }
        })));

        debug!(
            "dialog {} opened, previous focus {:?}",
            dialog, self.previous_focus
        );
    }

    /// Close transition. Idempotent: a second call is a no-op.
    pub fn close(&mut self, screen: &mut Screen) {
        if !self.open {
            return;
        }
        self.open = false;

        if let Some(pending) = self.pending_focus.take() {
            screen.cancel_frame(pending);
        }
        if let Some(listener) = self.escape_listener.take() {
            screen.remove_key_listener(listener);
        }
        if let Some(token) = self.scroll_lock.take() {
            screen.release_scroll(token);
        }
        if let Some(previous) = self.previous_focus.take() {
            if screen.is_attached(previous) {
                screen.focus(previous);
            } else {
                debug!("previous focus {} is gone, leaving focus alone", previous);
            }
        }
        debug!("dialog closed");
    }

    /// Focus trap for the dialog rooted at `dialog`. Returns true when the
    /// key was handled (and its default suppressed).
    ///
    /// The focusable set is read from the screen on every call so content
    /// added or removed while the dialog is open is honoured.
    pub fn handle_tab(&self, screen: &mut Screen, dialog: NodeId, event: &mut KeyDispatch) -> bool {
        if !self.open {
            return false;
        }
        let backward = event.is_back_tab();
        if !backward && !event.is_tab() {
            return false;
        }

        let focusables = screen.focusable_within(dialog);
        let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
            // nothing to cycle through; keep focus where it is
            event.prevent_default();
            return true;
        };

        // focus outside the set (elsewhere on screen, or on a node inside the
        // dialog that was disabled) re-enters at an edge
        let active = screen.active_node().filter(|id| focusables.contains(id));
        let target = match (active, backward) {
            (None, false) => Some(first),
            (None, true) => Some(last),
            (Some(id), false) if id == last => Some(first),
            (Some(id), true) if id == first => Some(last),
            _ => None,
        };

        match target {
            Some(id) => {
                screen.focus(id);
                event.prevent_default();
                true
            }
            // inside the dialog and not on an edge: the default Tab move
            // stays within the dialog because its subtree is contiguous
            None => false,
        }
    }
}

impl Drop for DialogController {
    fn drop(&mut self) {
        if self.open {
            warn!("dialog controller dropped while open; close it before dropping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::screen::NodeSpec;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixture {
        screen: Screen,
        outside: NodeId,
        dialog: NodeId,
        buttons: Vec<NodeId>,
        closes: Arc<AtomicUsize>,
        controller: DialogController,
    }

    fn fixture(focusable: usize) -> Fixture {
        let mut screen = Screen::new();
        let root = screen.root();
        let outside = screen.insert(root, &NodeSpec::button("Open")).unwrap();
        let dialog = screen
            .insert(root, &NodeSpec::container().with_role("dialog"))
            .unwrap();
        screen.insert(dialog, &NodeSpec::text("Are you sure?")).unwrap();
        let buttons = (0..focusable)
            .map(|i| screen.insert(dialog, &NodeSpec::button(format!("b{i}"))).unwrap())
            .collect();
        screen.focus(outside);
        Fixture {
            screen,
            outside,
            dialog,
            buttons,
            closes: Arc::new(AtomicUsize::new(0)),
            controller: DialogController::new(),
        }
    }

    impl Fixture {
        fn open(&mut self, initial: InitialFocus) {
            let closes = self.closes.clone();
            self.controller.open(
                &mut self.screen,
                self.dialog,
                initial,
                Arc::new(move || {
                    closes.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        /// Capture listeners, then the trap, then the screen default
        fn press(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyDispatch {
            let mut event = KeyDispatch::new(KeyEvent::new(code, modifiers));
            self.screen.dispatch_key(ListenerPhase::Capture, &mut event);
            if !event.is_propagation_stopped() {
                self.controller.handle_tab(&mut self.screen, self.dialog, &mut event);
            }
            self.screen.apply_default_action(&event);
            event
        }
    }

    #[test]
    fn test_initial_focus_waits_for_next_frame() {
        let mut f = fixture(3);
        f.open(InitialFocus::FirstFocusable);
        assert_eq!(f.screen.active_node(), Some(f.outside));

        assert_eq!(f.screen.run_frame_callbacks(), 1);
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
        assert_eq!(f.screen.run_frame_callbacks(), 0);
    }

    #[test]
    fn test_initial_focus_with_nothing_focusable() {
        let mut f = fixture(0);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();
        assert_eq!(f.screen.active_node(), Some(f.outside));
    }

    #[test]
    fn test_explicit_initial_focus() {
        let mut f = fixture(3);
        f.open(InitialFocus::Node(f.buttons[2]));
        f.screen.run_frame_callbacks();
        assert_eq!(f.screen.active_node(), Some(f.buttons[2]));
    }

    #[test]
    fn test_explicit_initial_focus_outside_dialog_falls_back() {
        let mut f = fixture(2);
        f.open(InitialFocus::Node(f.outside));
        f.screen.run_frame_callbacks();
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
    }

    #[test]
    fn test_tab_cycles_through_three() {
        let mut f = fixture(3);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();

        let mut seen = Vec::new();
        for _ in 0..3 {
            f.press(KeyCode::Tab, KeyModifiers::NONE);
            seen.push(f.screen.active_node().unwrap());
        }
        assert_eq!(seen, vec![f.buttons[1], f.buttons[2], f.buttons[0]]);
    }

    #[test]
    fn test_shift_tab_on_first_wraps_to_last() {
        let mut f = fixture(3);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();

        let event = f.press(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(event.is_default_prevented());
        assert_eq!(f.screen.active_node(), Some(f.buttons[2]));

        let event = f.press(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(!event.is_default_prevented());
        assert_eq!(f.screen.active_node(), Some(f.buttons[1]));
    }

    #[test]
    fn test_single_focusable_wraps_to_itself() {
        let mut f = fixture(1);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();

        let event = f.press(KeyCode::Tab, KeyModifiers::NONE);
        assert!(event.is_default_prevented());
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));

        let event = f.press(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(event.is_default_prevented());
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
    }

    #[test]
    fn test_tab_with_empty_set_keeps_focus() {
        let mut f = fixture(0);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();

        f.press(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(f.screen.active_node(), Some(f.outside));
    }

    #[test]
    fn test_trap_sees_content_added_while_open() {
        let mut f = fixture(1);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();

        let added = f.screen.insert(f.dialog, &NodeSpec::input("late")).unwrap();
        f.press(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(f.screen.active_node(), Some(added));
        f.press(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
    }

    #[test]
    fn test_tab_pulls_stray_focus_back_inside() {
        let mut f = fixture(2);
        f.open(InitialFocus::FirstFocusable);
        // initial focus not placed yet: focus is still on the opener
        f.press(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
    }

    #[test]
    fn test_tab_from_disabled_node_stays_inside() {
        let mut f = fixture(3);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();
        f.screen.focus(f.buttons[1]);
        f.screen.node_mut(f.buttons[1]).unwrap().disabled = true;

        let event = f.press(KeyCode::Tab, KeyModifiers::NONE);
        assert!(event.is_default_prevented());
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));

        f.screen.focus(f.buttons[2]);
        f.screen.node_mut(f.buttons[2]).unwrap().disabled = true;
        f.press(KeyCode::BackTab, KeyModifiers::SHIFT);
        // buttons[2] left the set, so the last focusable is buttons[0]
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
    }

    #[test]
    fn test_tab_from_node_that_lost_its_tab_index() {
        let mut f = fixture(2);
        let panel = f
            .screen
            .insert(f.dialog, &NodeSpec::text("details").with_tab_index(0))
            .unwrap();
        f.open(InitialFocus::Node(panel));
        f.screen.run_frame_callbacks();
        assert_eq!(f.screen.active_node(), Some(panel));

        f.screen.node_mut(panel).unwrap().tab_index = None;
        f.press(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(f.screen.active_node(), Some(f.buttons[1]));
        assert!(f.screen.contains(f.dialog, f.screen.active_node().unwrap()));
    }

    #[test]
    fn test_escape_calls_on_close_once_per_press() {
        let mut f = fixture(2);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();
        let focused = f.screen.active_node();

        let event = f.press(KeyCode::Esc, KeyModifiers::NONE);
        assert!(event.is_default_prevented());
        assert_eq!(f.closes.load(Ordering::SeqCst), 1);
        assert_eq!(f.screen.active_node(), focused);

        f.press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(f.closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_close_restores_focus_and_scroll() {
        let mut f = fixture(2);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();
        assert!(f.screen.is_scroll_locked());
        assert_eq!(f.screen.key_listener_count(), 1);

        f.press(KeyCode::Esc, KeyModifiers::NONE);
        f.controller.close(&mut f.screen);

        assert_eq!(f.screen.active_node(), Some(f.outside));
        assert!(!f.screen.is_scroll_locked());
        assert_eq!(f.screen.key_listener_count(), 0);
        assert_eq!(f.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_double_close_is_harmless() {
        let mut f = fixture(2);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();

        f.controller.close(&mut f.screen);
        f.screen.focus(f.buttons[1]);
        f.controller.close(&mut f.screen);
        // second close must not refocus the cleared reference
        assert_eq!(f.screen.active_node(), Some(f.buttons[1]));
        assert!(f.controller.previous_focus().is_none());
    }

    #[test]
    fn test_escape_after_close_is_ignored() {
        let mut f = fixture(1);
        f.open(InitialFocus::FirstFocusable);
        f.controller.close(&mut f.screen);
        f.press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(f.closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_close_before_frame_cancels_initial_focus() {
        let mut f = fixture(2);
        f.open(InitialFocus::FirstFocusable);
        f.controller.close(&mut f.screen);
        assert_eq!(f.screen.run_frame_callbacks(), 0);
        assert_eq!(f.screen.active_node(), Some(f.outside));
    }

    #[test]
    fn test_removed_opener_is_not_refocused() {
        let mut f = fixture(2);
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();

        f.screen.remove(f.outside);
        f.controller.close(&mut f.screen);
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
    }

    #[test]
    fn test_open_with_nothing_focused() {
        let mut f = fixture(1);
        f.screen.blur();
        f.open(InitialFocus::FirstFocusable);
        f.screen.run_frame_callbacks();
        f.controller.close(&mut f.screen);
        assert_eq!(f.screen.active_node(), Some(f.buttons[0]));
    }

    #[test]
    fn test_stacked_dialogs_share_scroll_lock() {
        let mut f = fixture(1);
        f.open(InitialFocus::FirstFocusable);

        let root = f.screen.root();
        let inner_dialog = f.screen.insert(root, &NodeSpec::container()).unwrap();
        f.screen.insert(inner_dialog, &NodeSpec::button("inner")).unwrap();
        let inner_closes = Arc::new(AtomicUsize::new(0));
        let counter = inner_closes.clone();
        let mut inner = DialogController::new();
        inner.open(
            &mut f.screen,
            inner_dialog,
            InitialFocus::FirstFocusable,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        // only the topmost dialog reacts to Escape
        f.press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(inner_closes.load(Ordering::SeqCst), 1);
        assert_eq!(f.closes.load(Ordering::SeqCst), 0);

        inner.close(&mut f.screen);
        assert!(f.screen.is_scroll_locked());
        f.controller.close(&mut f.screen);
        assert!(!f.screen.is_scroll_locked());
    }
}
