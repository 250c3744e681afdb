//! Confirmation dialog
//!
//! A modal asking the user to confirm an action, with Cancel and Confirm
//! buttons. Focus starts on Cancel so an accidental Enter never confirms.
//! Escape, the backdrop and the close control all count as cancelling.

use super::{
    controller::InitialFocus,
    modal::Modal,
    types::{Dialog, DialogCallback, DialogConfig, DialogSize},
};
use crate::tui::{
    screen::{KeyDispatch, NodeId, NodeSpec, Screen, ScreenResult},
    styles::Theme,
    Frame,
};
use crossterm::event::KeyCode;
use ratatui::layout::Rect;

/// How the confirm button is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmVariant {
    /// Destructive actions such as deletes
    #[default]
    Danger,
    Primary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConfirmNodes {
    message: NodeId,
    cancel: NodeId,
    confirm: NodeId,
}

pub struct ConfirmDialog {
    modal: Modal,
    nodes: Option<ConfirmNodes>,
    message: String,
    confirm_label: String,
    cancel_label: String,
    variant: ConfirmVariant,
    busy: bool,
    on_confirm: DialogCallback,
    on_cancel: DialogCallback,
}

impl ConfirmDialog {
    pub fn new(
        config: DialogConfig,
        message: impl Into<String>,
        on_confirm: DialogCallback,
        on_cancel: DialogCallback,
    ) -> Self {
        let config = config.with_size(DialogSize::at_least(44, 7));
        Self {
            modal: Modal::new(config, on_cancel.clone()),
            nodes: None,
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
            variant: ConfirmVariant::default(),
            busy: false,
            on_confirm,
            on_cancel,
        }
    }

    /// Set custom button labels
    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }

    pub fn with_variant(mut self, variant: ConfirmVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Message for the next time the dialog opens
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cancel_button(&self) -> Option<NodeId> {
        self.nodes.map(|nodes| nodes.cancel)
    }

    pub fn confirm_button(&self) -> Option<NodeId> {
        self.nodes.map(|nodes| nodes.confirm)
    }

    pub fn open(&mut self, screen: &mut Screen) -> ScreenResult<()> {
        let message = self.message.clone();
        let cancel = NodeSpec::button(&self.cancel_label);
        let mut confirm = NodeSpec::button(&self.confirm_label);
        if self.variant == ConfirmVariant::Danger {
            confirm = confirm.with_attribute("data-variant", "danger");
        }

        let mounted = self.modal.open_with(screen, move |screen, body| {
            let message = screen.insert(body, &NodeSpec::text(message))?;
            let buttons = screen.insert(body, &NodeSpec::group(Vec::new()))?;
            let cancel = screen.insert(buttons, &cancel)?;
            let confirm = screen.insert(buttons, &confirm)?;
            Ok((
                InitialFocus::Node(cancel),
                ConfirmNodes {
                    message,
                    cancel,
                    confirm,
                },
            ))
        })?;
        if let Some(nodes) = mounted {
            self.nodes = Some(nodes);
            self.busy = false;
        }
        Ok(())
    }

    pub fn close(&mut self, screen: &mut Screen) {
        self.modal.close(screen);
        self.nodes = None;
        self.busy = false;
    }

    /// While busy both buttons are disabled and the confirm button shows
    /// progress. Dismissal still works.
    pub fn set_busy(&mut self, screen: &mut Screen, busy: bool) {
        self.busy = busy;
        let Some(nodes) = self.nodes else {
            return;
        };
        let confirm_label = if busy {
            "Working...".to_string()
        } else {
            self.confirm_label.clone()
        };
        if let Some(node) = screen.node_mut(nodes.cancel) {
            node.disabled = busy;
        }
        if let Some(node) = screen.node_mut(nodes.confirm) {
            node.disabled = busy;
            node.label = confirm_label;
        }
    }

    fn activate(&self, target: NodeId) -> bool {
        let Some(nodes) = self.nodes else {
            return false;
        };
        if self.busy {
            return target == nodes.cancel || target == nodes.confirm;
        }
        if target == nodes.cancel {
            (self.on_cancel)();
            true
        } else if target == nodes.confirm {
            (self.on_confirm)();
            true
        } else {
            false
        }
    }
}

impl Dialog for ConfirmDialog {
    fn config(&self) -> &DialogConfig {
        self.modal.config()
    }

    fn is_open(&self) -> bool {
        self.modal.is_open()
    }

    fn close(&mut self, screen: &mut Screen) {
        ConfirmDialog::close(self, screen);
    }

    fn handle_key(&mut self, screen: &mut Screen, event: &mut KeyDispatch) -> bool {
        if !self.is_open() {
            return false;
        }
        let activates = matches!(event.code(), KeyCode::Enter | KeyCode::Char(' '));
        if activates {
            if let Some(active) = screen.active_node() {
                if self.activate(active) {
                    event.prevent_default();
                    return true;
                }
            }
        }
        // Left/Right move between the two buttons like in a button bar
        if let (Some(nodes), KeyCode::Left | KeyCode::Right) = (self.nodes, event.code()) {
            let active = screen.active_node();
            if active == Some(nodes.cancel) || active == Some(nodes.confirm) {
                let other = if active == Some(nodes.cancel) { nodes.confirm } else { nodes.cancel };
                screen.focus(other);
                event.prevent_default();
                return true;
            }
        }
        self.modal.handle_key(screen, event)
    }

    fn handle_click(&mut self, screen: &mut Screen, target: Option<NodeId>) -> bool {
        if let Some(target) = target {
            if self.activate(target) {
                return true;
            }
        }
        self.modal.handle_click(screen, target)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, screen: &mut Screen, theme: &Theme) {
        self.modal.render(frame, area, screen, theme);
    }
}
