//! Generic modal dialog
//!
//! Mounts an overlay and a labelled dialog surface on the screen while open
//! and nothing while closed. Focus, Escape and scroll handling come from
//! [`DialogController`].

use super::{
    controller::{DialogController, InitialFocus},
    types::{Dialog, DialogCallback, DialogConfig, DialogLayout},
};
use crate::tui::{
    components::node_view::{node_height, node_width, render_node, render_stack, text_width},
    screen::{KeyDispatch, NodeId, NodeSpec, Screen, ScreenResult},
    styles::Theme,
    Frame,
};
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Clear},
};
use tracing::debug;

/// Nodes mounted while the modal is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalNodes {
    /// Backdrop covering the page; clicking it dismisses the modal
    pub overlay: NodeId,
    /// The dialog itself (`role="dialog"`)
    pub surface: NodeId,
    pub title: NodeId,
    pub close_button: NodeId,
    /// Container holding the caller's content
    pub body: NodeId,
}

pub struct Modal {
    config: DialogConfig,
    controller: DialogController,
    on_close: DialogCallback,
    content: Vec<NodeSpec>,
    nodes: Option<ModalNodes>,
}

impl Modal {
    pub fn new(config: DialogConfig, on_close: DialogCallback) -> Self {
        Self {
            config,
            controller: DialogController::new(),
            on_close,
            content: Vec::new(),
            nodes: None,
        }
    }

    /// Content mounted into the body by [`Modal::open`]
    pub fn with_content(mut self, content: Vec<NodeSpec>) -> Self {
        self.content = content;
        self
    }

    pub fn nodes(&self) -> Option<ModalNodes> {
        self.nodes
    }

    /// Open with the configured content, focusing its first focusable node
    pub fn open(&mut self, screen: &mut Screen) -> ScreenResult<()> {
        let content = self.content.clone();
        self.open_with(screen, move |screen, body| {
            for spec in &content {
                screen.insert(body, spec)?;
            }
            Ok((InitialFocus::FirstFocusable, ()))
        })?;
        Ok(())
    }

    /// Open, letting `build` mount the body content and pick the initial
    /// focus target. Returns `None` when the modal was already open.
    pub fn open_with<T, F>(&mut self, screen: &mut Screen, build: F) -> ScreenResult<Option<T>>
    where
        F: FnOnce(&mut Screen, NodeId) -> ScreenResult<(InitialFocus, T)>,
    {
        if self.nodes.is_some() {
            return Ok(None);
        }

        let root = screen.root();
        let overlay = screen.insert(
            root,
            &NodeSpec::container()
                .with_role("presentation")
                .with_attribute("data-overlay", "true"),
        )?;
        let (surface, title, close_button, body) = match self.mount_surface(screen) {
            Ok(mounted) => mounted,
            Err(err) => {
                screen.remove(overlay);
                return Err(err);
            }
        };
        let (initial, value) = match build(screen, body) {
            Ok(built) => built,
            Err(err) => {
                screen.remove(surface);
                screen.remove(overlay);
                return Err(err);
            }
        };
        let nodes = ModalNodes {
            overlay,
            surface,
            title,
            close_button,
            body,
        };

        self.nodes = Some(nodes);
        self.controller
            .open(screen, nodes.surface, initial, self.on_close.clone());
        debug!("modal '{}' opened", self.config.id);
        Ok(Some(value))
    }

    fn mount_surface(&self, screen: &mut Screen) -> ScreenResult<(NodeId, NodeId, NodeId, NodeId)> {
        let root = screen.root();
        let surface = screen.insert(
            root,
            &NodeSpec::container()
                .with_role("dialog")
                .with_attribute("aria-modal", "true"),
        )?;
        let title = screen.insert(surface, &NodeSpec::text(&self.config.title).with_role("heading"))?;
        let close_button = screen.insert(
            surface,
            &NodeSpec::button("x").with_attribute("aria-label", &self.config.close_label),
        )?;
        let body = screen.insert(surface, &NodeSpec::container())?;
        if let Some(node) = screen.node_mut(surface) {
            node.attributes
                .insert("aria-labelledby".to_string(), title.to_string());
        }
        Ok((surface, title, close_button, body))
    }

    /// Close transition: restore focus, then unmount. Safe to repeat.
    pub fn close(&mut self, screen: &mut Screen) {
        self.controller.close(screen);
        if let Some(nodes) = self.nodes.take() {
            screen.remove(nodes.surface);
            screen.remove(nodes.overlay);
            debug!("modal '{}' closed", self.config.id);
        }
    }

    /// Same as [`Modal::close`]; called when the owner goes away while open
    pub fn unmount(&mut self, screen: &mut Screen) {
        self.close(screen);
    }

    fn request_close(&self) {
        (self.on_close)();
    }
}

impl Dialog for Modal {
    fn config(&self) -> &DialogConfig {
        &self.config
    }

    fn is_open(&self) -> bool {
        self.nodes.is_some()
    }

    fn close(&mut self, screen: &mut Screen) {
        Modal::close(self, screen);
    }

    fn handle_key(&mut self, screen: &mut Screen, event: &mut KeyDispatch) -> bool {
        let Some(nodes) = self.nodes else {
            return false;
        };
        if self.controller.handle_tab(screen, nodes.surface, event) {
            return true;
        }
        let activates = matches!(event.code(), KeyCode::Enter | KeyCode::Char(' '));
        if activates && screen.active_node() == Some(nodes.close_button) {
            event.prevent_default();
            self.request_close();
            return true;
        }
        false
    }

    fn handle_click(&mut self, screen: &mut Screen, target: Option<NodeId>) -> bool {
        let (Some(nodes), Some(target)) = (self.nodes, target) else {
            return false;
        };
        if target == nodes.overlay || target == nodes.close_button {
            self.request_close();
            return true;
        }
        if screen.contains(nodes.surface, target) {
            // clicks on the surface stay here and never reach the overlay
            screen.focus(target);
            return true;
        }
        false
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, screen: &mut Screen, theme: &Theme) {
        let Some(nodes) = self.nodes else {
            return;
        };

        screen.set_area(nodes.overlay, area);
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(theme.overlay_style()), area);

        let title_width = text_width(&self.config.title);
        let close_width = node_width(screen, nodes.close_button);
        let header_width = title_width.saturating_add(close_width).saturating_add(2);
        let content_width = node_width(screen, nodes.body).max(header_width);
        // header row holding the close control, then the body
        let content_height = node_height(screen, nodes.body).saturating_add(1);
        let layout = DialogLayout::calculate(&self.config, area, Some((content_width, content_height)));

        screen.set_area(nodes.surface, layout.dialog_area);
        frame.render_widget(Clear, layout.dialog_area);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .title(self.config.title.clone())
                .border_style(theme.focused_border_style())
                .style(theme.dialog_style()),
            layout.dialog_area,
        );
        screen.set_area(
            nodes.title,
            Rect::new(
                layout.dialog_area.x + 1,
                layout.dialog_area.y,
                title_width.min(layout.content_area.width),
                1,
            ),
        );

        let content = layout.content_area;
        if content.height == 0 {
            return;
        }
        let close_width = close_width.min(content.width);
        render_node(
            frame,
            screen,
            nodes.close_button,
            Rect::new(content.x + content.width - close_width, content.y, close_width, 1),
            theme,
        );

        let body_area = Rect::new(content.x, content.y + 1, content.width, content.height - 1);
        screen.set_area(nodes.body, body_area);
        render_stack(frame, screen, nodes.body, body_area, theme, 0);
    }
}
