//! Core dialog types and traits
//!
//! This module defines the configuration, layout and trait shared by the
//! modal and confirmation dialogs.

use crate::tui::{
    screen::{KeyDispatch, NodeId, Screen},
    styles::Theme,
    Frame,
};
use ratatui::layout::Rect;
use std::sync::Arc;

/// Unique identifier for dialog instances
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialogId(pub String);

impl From<&str> for DialogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DialogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DialogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum dialog size in cells; dialogs grow to fit their content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogSize {
    pub min_width: u16,
    pub min_height: u16,
}

impl DialogSize {
    pub fn at_least(min_width: u16, min_height: u16) -> Self {
        Self {
            min_width,
            min_height,
        }
    }
}

impl Default for DialogSize {
    fn default() -> Self {
        Self::at_least(40, 7)
    }
}

/// Dialog configuration options
#[derive(Debug, Clone)]
pub struct DialogConfig {
    /// Dialog identifier
    pub id: DialogId,
    /// Title shown in the border and referenced by `aria-labelledby`
    pub title: String,
    /// Size configuration
    pub size: DialogSize,
    /// Label of the explicit close control
    pub close_label: String,
}

impl DialogConfig {
    pub fn new(id: impl Into<DialogId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            size: DialogSize::default(),
            close_label: "Close".to_string(),
        }
    }

    pub fn with_size(mut self, size: DialogSize) -> Self {
        self.size = size;
        self
    }
}

/// Callback invoked with no arguments (`on_close`, `on_confirm`, ...)
pub type DialogCallback = Arc<dyn Fn() + Send + Sync>;

/// Build a callback from a closure
pub fn callback(f: impl Fn() + Send + Sync + 'static) -> DialogCallback {
    Arc::new(f)
}

/// Common surface of the modal dialogs
///
/// The owning page keeps the open/closed state; dialogs report requests to
/// close through their callbacks and the page answers with `close`.
pub trait Dialog: Send + Sync {
    /// Get the dialog's configuration
    fn config(&self) -> &DialogConfig;

    fn is_open(&self) -> bool;

    /// Close transition; safe to call when already closed
    fn close(&mut self, screen: &mut Screen);

    /// Target-phase key handling. Returns true when the key was consumed.
    fn handle_key(&mut self, screen: &mut Screen, event: &mut KeyDispatch) -> bool;

    /// Pointer click on `target`. Returns true when the click was consumed.
    fn handle_click(&mut self, screen: &mut Screen, target: Option<NodeId>) -> bool;

    fn render(&mut self, frame: &mut Frame, area: Rect, screen: &mut Screen, theme: &Theme);
}

/// Where a dialog lands inside the available area
#[derive(Debug, Clone)]
pub struct DialogLayout {
    /// Dialog area (including border)
    pub dialog_area: Rect,
    /// Content area (excluding border)
    pub content_area: Rect,
}

impl DialogLayout {
    /// Center a dialog sized to `content_size` plus its border, never
    /// smaller than the configured minimum nor larger than `available_area`
    pub fn calculate(
        config: &DialogConfig,
        available_area: Rect,
        content_size: Option<(u16, u16)>,
    ) -> Self {
        let DialogSize { min_width, min_height } = config.size;
        let (width, height) = match content_size {
            Some((content_w, content_h)) => (
                content_w.saturating_add(2).max(min_width),
                content_h.saturating_add(2).max(min_height),
            ),
            None => (min_width, min_height),
        };
        let width = width.min(available_area.width);
        let height = height.min(available_area.height);

        let dialog_area = Rect {
            x: available_area.x + (available_area.width - width) / 2,
            y: available_area.y + (available_area.height - height) / 2,
            width,
            height,
        };

        let content_area = Rect {
            x: dialog_area.x + 1,
            y: dialog_area.y + 1,
            width: dialog_area.width.saturating_sub(2),
            height: dialog_area.height.saturating_sub(2),
        };

        Self {
            dialog_area,
            content_area,
        }
    }
}
