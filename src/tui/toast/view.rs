//! Toast stack rendered in the top-right corner

use super::store::{Toast, ToastVariant};
use crate::tui::styles::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Default number of toasts on screen
pub const MAX_VISIBLE: usize = 3;

const TOAST_WIDTH: u16 = 40;
const TOAST_HEIGHT: u16 = 3;

/// Renders up to `max_visible` toasts, newest on top
pub struct ToastStack<'a> {
    toasts: &'a [Toast],
    theme: &'a Theme,
    max_visible: usize,
}

impl<'a> ToastStack<'a> {
    /// `toasts` is expected newest first, as returned by `ToastStore::visible`
    pub fn new(toasts: &'a [Toast], theme: &'a Theme) -> Self {
        Self {
            toasts,
            theme,
            max_visible: MAX_VISIBLE,
        }
    }

    pub fn max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible;
        self
    }

    fn accent(&self, variant: ToastVariant) -> Style {
        let color = match variant {
            ToastVariant::Success => self.theme.success,
            ToastVariant::Error => self.theme.error,
            ToastVariant::Warning => self.theme.warning,
            ToastVariant::Info => self.theme.info,
        };
        Style::default().fg(color)
    }
}

/// Area of the `index`-th toast from the top, if it fits
pub fn toast_area(area: Rect, index: usize) -> Option<Rect> {
    let width = TOAST_WIDTH.min(area.width);
    let y = area.y + 1 + (index as u16).checked_mul(TOAST_HEIGHT)?;
    if width == 0 || y + TOAST_HEIGHT > area.y + area.height {
        return None;
    }
    let x = area.x + area.width - width;
    Some(Rect::new(x, y, width, TOAST_HEIGHT))
}

impl Widget for ToastStack<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (index, toast) in self.toasts.iter().take(self.max_visible).enumerate() {
            let Some(toast_area) = toast_area(area, index) else {
                break;
            };
            let accent = self.accent(toast.variant);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(accent)
                .title(Span::styled(
                    toast.variant.label(),
                    accent.add_modifier(Modifier::BOLD),
                ))
                .style(self.theme.dialog_style());
            let message = Paragraph::new(Line::from(toast.message.as_str()))
                .style(self.theme.text_style())
                .wrap(Wrap { trim: true })
                .block(block);

            Clear.render(toast_area, buf);
            message.render(toast_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::toast::ToastStore;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.get(x, y).symbol().to_string())
            .collect()
    }

    #[test]
    fn test_renders_newest_three_in_top_right() {
        let store = ToastStore::new();
        for n in 1..=4 {
            store.info(format!("toast {n}"));
        }
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        ToastStack::new(&store.visible(MAX_VISIBLE), &theme).render(area, &mut buf);

        assert!(row(&buf, 2).contains("toast 4"));
        assert!(row(&buf, 5).contains("toast 3"));
        assert!(row(&buf, 8).contains("toast 2"));
        let rest: String = (9..20).map(|y| row(&buf, y)).collect();
        assert!(!rest.contains("toast 1"));
        // right aligned
        assert_eq!(buf.get(20, 1).symbol(), "┌");
    }

    #[test]
    fn test_toast_area_stops_at_bottom() {
        let area = Rect::new(0, 0, 30, 7);
        assert_eq!(toast_area(area, 0), Some(Rect::new(0, 1, 30, 3)));
        assert_eq!(toast_area(area, 1), Some(Rect::new(0, 4, 30, 3)));
        assert_eq!(toast_area(area, 2), None);
    }
}
