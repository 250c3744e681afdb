//! Drawing screen nodes
//!
//! Lays out a subtree of the screen into a rectangle, one row per leaf and
//! one row per `group` (whose children sit side by side), and records every
//! node's area so mouse clicks can be hit-tested afterwards.

use crate::tui::{
    screen::{Node, NodeId, NodeKind, Screen},
    styles::Theme,
    Frame,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

/// Horizontal gap between members of a group
const GROUP_GAP: u16 = 2;

/// Rows the node needs
pub fn node_height(screen: &Screen, id: NodeId) -> u16 {
    let Some(node) = screen.node(id) else {
        return 0;
    };
    match node.kind {
        NodeKind::Container if !is_group(node) => node
            .children()
            .iter()
            .map(|child| node_height(screen, *child))
            .fold(0, u16::saturating_add),
        _ => 1,
    }
}

/// Display width of `text` in cells, saturating at `u16::MAX`
pub fn text_width(text: &str) -> u16 {
    u16::try_from(UnicodeWidthStr::width(text)).unwrap_or(u16::MAX)
}

/// Columns the node needs on its row
pub fn node_width(screen: &Screen, id: NodeId) -> u16 {
    let Some(node) = screen.node(id) else {
        return 0;
    };
    if is_group(node) {
        let children = node.children();
        let widths = children
            .iter()
            .map(|child| node_width(screen, *child))
            .fold(0, u16::saturating_add);
        let gaps = u16::try_from(children.len().saturating_sub(1)).unwrap_or(u16::MAX);
        return widths.saturating_add(GROUP_GAP.saturating_mul(gaps));
    }
    if matches!(node.kind, NodeKind::Container) {
        return node
            .children()
            .iter()
            .map(|child| node_width(screen, *child))
            .max()
            .unwrap_or(0);
    }
    text_width(&leaf_text(node, false))
}

/// Render the children of `parent` stacked vertically inside `area`,
/// skipping the first `offset` rows. Returns the total content height.
pub fn render_stack(
    frame: &mut Frame,
    screen: &mut Screen,
    parent: NodeId,
    area: Rect,
    theme: &Theme,
    offset: u16,
) -> u16 {
    let children = screen
        .node(parent)
        .map(|node| node.children().to_vec())
        .unwrap_or_default();

    let mut row = 0u16;
    for child in children {
        let height = node_height(screen, child);
        let visible = row >= offset && (row - offset).saturating_add(height) <= area.height;
        if visible {
            let child_area = Rect::new(area.x, area.y + (row - offset), area.width, height);
            render_node(frame, screen, child, child_area, theme);
        } else {
            hide_subtree(screen, child);
        }
        row = row.saturating_add(height);
    }
    row
}

/// Render one node (and its subtree) into `area`
pub fn render_node(frame: &mut Frame, screen: &mut Screen, id: NodeId, area: Rect, theme: &Theme) {
    screen.set_area(id, area);
    let focused = screen.active_node() == Some(id);
    let Some(node) = screen.node(id).cloned() else {
        return;
    };

    if is_group(&node) {
        let mut x = area.x;
        let right = area.x.saturating_add(area.width);
        for child in node.children() {
            let width = node_width(screen, *child).min(right.saturating_sub(x));
            if width == 0 {
                hide_subtree(screen, *child);
                continue;
            }
            render_node(frame, screen, *child, Rect::new(x, area.y, width, 1), theme);
            x = x.saturating_add(width.saturating_add(GROUP_GAP));
        }
        return;
    }

    if matches!(node.kind, NodeKind::Container) {
        render_stack(frame, screen, id, area, theme, 0);
        return;
    }

    let paragraph = Paragraph::new(leaf_text(&node, focused)).style(leaf_style(&node, focused, theme));
    frame.render_widget(paragraph, area);
}

/// Forget the areas of nodes that were not drawn this frame
pub fn hide_subtree(screen: &mut Screen, id: NodeId) {
    screen.set_area(id, Rect::default());
    for child in screen.descendants(id) {
        screen.set_area(child, Rect::default());
    }
}

fn is_group(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Container) && node.role.as_deref() == Some("group")
}

fn leaf_text(node: &Node, focused: bool) -> String {
    let cursor = if focused { "▏" } else { "" };
    match &node.kind {
        NodeKind::Button => format!("[ {} ]", node.label),
        NodeKind::Input { value } => format!("{}: {}{}", node.label, value, cursor),
        NodeKind::TextArea { value } => {
            // only the line being typed fits on one row
            let last_line = value.lines().last().unwrap_or_default();
            format!("{}: {}{}", node.label, last_line, cursor)
        }
        NodeKind::Select { options, selected } => format!(
            "{}: < {} >",
            node.label,
            options.get(*selected).map(String::as_str).unwrap_or("")
        ),
        NodeKind::Link { .. } | NodeKind::Text | NodeKind::Container => node.label.clone(),
    }
}

fn leaf_style(node: &Node, focused: bool, theme: &Theme) -> Style {
    if node.disabled {
        return theme.disabled_style();
    }
    if focused {
        return theme.selection_style();
    }
    match node.kind {
        NodeKind::Button if node.attribute("data-variant") == Some("danger") => theme.danger_style(),
        NodeKind::Button => theme.button_style(),
        NodeKind::Link { .. } => theme.text_style().add_modifier(Modifier::UNDERLINED),
        NodeKind::Text if node.attribute("data-tone") == Some("muted") => theme.dim_text_style(),
        _ => theme.text_style(),
    }
}
