use crate::config::Config;
use crate::tui::{
    events::Event,
    keys::KeyMap,
    pages::{records::RecordListPage, PageManager},
    screen::{KeyDispatch, ListenerPhase, Screen},
    styles::Theme,
    toast::{self, SubscriberId, ToastStack, ToastStore},
    utils::centered_rect_percent,
    Frame,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Rows moved per mouse wheel step
const WHEEL_STEP: i32 = 3;

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Current application dimensions
    pub size: Rect,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Page manager for handling different screens
    pub page_manager: PageManager,

    /// Node tree the pages and dialogs render into
    pub screen: Screen,

    /// Current theme for styling
    pub theme: Theme,

    /// Show the help overlay
    pub show_help: bool,

    mouse_enabled: bool,
    max_toasts: usize,
    toasts: ToastStore,
    toast_subscription: SubscriberId,
}

impl App {
    /// Create a new application instance
    pub async fn new(config: &Config, events: mpsc::UnboundedSender<Event>) -> Result<Self> {
        Self::with_toasts(config, events, toast::global().clone()).await
    }

    pub async fn with_toasts(
        config: &Config,
        events: mpsc::UnboundedSender<Event>,
        toasts: ToastStore,
    ) -> Result<Self> {
        toasts.set_timings(config.toast.timings());
        // wake the event loop so toasts appear and expire without input
        let toast_subscription = toasts.subscribe(move |live| {
            let _ = events.send(Event::ToastsChanged(live.len()));
        });

        let mut screen = Screen::new();
        let mut page_manager = PageManager::new();

        // Register default pages
        page_manager.register_page(Box::new(RecordListPage::squads(toasts.clone())));
        page_manager.register_page(Box::new(RecordListPage::people(toasts.clone())));

        // Navigate to the squads page by default
        page_manager.navigate_to("squads".to_string(), &mut screen).await?;

        Ok(Self {
            should_quit: false,
            size: Rect::default(),
            key_map: KeyMap::default(),
            page_manager,
            screen,
            theme: Theme::default(),
            show_help: false,
            mouse_enabled: config.mouse_enabled,
            max_toasts: config.toast.max_visible,
            toasts,
            toast_subscription,
        })
    }

    /// Handle incoming events. Returns true when the app should exit.
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => self.handle_key(key_event).await?,

            Event::Mouse(mouse_event) => {
                if self.mouse_enabled {
                    self.handle_mouse(mouse_event).await?;
                }
            }

            Event::Resize(width, height) => {
                self.size = Rect::new(0, 0, width, height);
            }

            Event::Tick => {
                if let Some(current_page) = self.page_manager.current_page_mut() {
                    current_page.tick(&mut self.screen).await?;
                }
            }

            Event::ToastsChanged(count) => {
                debug!("{} toasts live", count);
            }
        }

        Ok(self.should_quit)
    }

    /// Global keys, then capture listeners, the page (and its dialogs),
    /// bubble listeners and finally the screen's default action
    async fn handle_key(&mut self, key_event: KeyEvent) -> Result<()> {
        if self.key_map.should_quit(&key_event) {
            info!("Quit requested");
            self.should_quit = true;
            return Ok(());
        }

        if self.key_map.should_show_help(&key_event) {
            self.show_help = !self.show_help;
            return Ok(());
        }

        if self.show_help {
            if key_event.code == KeyCode::Esc {
                self.show_help = false;
            }
            return Ok(());
        }

        if let Some(index) = self.key_map.page_index(&key_event) {
            if let Some(page_id) = self.page_manager.page_ids().get(index).cloned() {
                self.page_manager.navigate_to(page_id, &mut self.screen).await?;
            }
            return Ok(());
        }

        let mut dispatch = KeyDispatch::new(key_event);
        self.screen.dispatch_key(ListenerPhase::Capture, &mut dispatch);

        if let Some(current_page) = self.page_manager.current_page_mut() {
            // listeners may have posted requests (e.g. Escape closing a dialog)
            current_page.flush(&mut self.screen)?;
            if !dispatch.is_propagation_stopped() {
                current_page.handle_key(&mut self.screen, &mut dispatch).await?;
            }
        }

        if !dispatch.is_propagation_stopped() {
            self.screen.dispatch_key(ListenerPhase::Bubble, &mut dispatch);
        }
        self.screen.apply_default_action(&dispatch);
        Ok(())
    }

    async fn handle_mouse(&mut self, mouse_event: MouseEvent) -> Result<()> {
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let target = self.screen.hit_test(mouse_event.column, mouse_event.row);
                if let Some(current_page) = self.page_manager.current_page_mut() {
                    current_page.handle_click(&mut self.screen, target).await?;
                }
            }
            // ignored while a dialog holds the scroll lock
            MouseEventKind::ScrollDown => {
                self.screen.scroll_by(WHEEL_STEP);
            }
            MouseEventKind::ScrollUp => {
                self.screen.scroll_by(-WHEEL_STEP);
            }
            _ => {}
        }
        Ok(())
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.size = frame.size();
        let root = self.screen.root();
        self.screen.set_area(root, self.size);

        // Create main layout
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(self.size);

        // Render current page
        if let Some(current_page) = self.page_manager.current_page_mut() {
            current_page.render(frame, chunks[0], &mut self.screen, &self.theme);
        } else {
            // Render empty state
            let empty_block = Block::default()
                .borders(Borders::ALL)
                .title("KAOS")
                .style(self.theme.base_style());

            let empty_text = Paragraph::new("No active page")
                .block(empty_block)
                .style(self.theme.text_style());

            frame.render_widget(empty_text, chunks[0]);
        }

        let visible = self.toasts.visible(self.max_toasts);
        frame.render_widget(
            ToastStack::new(&visible, &self.theme).max_visible(self.max_toasts),
            chunks[0],
        );

        // Render status bar
        self.render_status_bar(frame, chunks[1]);

        // Render help overlay if enabled
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    /// Run the callbacks deferred to after the draw. Returns how many ran.
    pub fn after_draw(&mut self) -> usize {
        self.screen.run_frame_callbacks()
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let page = self
            .page_manager
            .current_page()
            .map_or("None", |page| page.title());
        let status_text = format!("{} | F1 Squads  F2 People | Ctrl+G help | Ctrl+C quit", page);

        let status_paragraph = Paragraph::new(status_text).style(self.theme.status_bar_style());

        frame.render_widget(status_paragraph, area);
    }

    /// Render help overlay
    fn render_help_overlay(&self, frame: &mut Frame) {
        let help_area = centered_rect_percent(60, 50, frame.size());

        let mut lines: Vec<Line> = self
            .key_map
            .help_entries()
            .into_iter()
            .map(|(key, description)| Line::from(format!("{:<16} {}", key, description)))
            .collect();
        if let Some(page) = self.page_manager.current_page() {
            lines.push(Line::from(""));
            for (key, description) in page.help_text() {
                lines.push(Line::from(format!("{:<16} {}", key, description)));
            }
        }

        let help_block = Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .style(self.theme.help_style());

        let help_paragraph = Paragraph::new(lines)
            .block(help_block)
            .style(self.theme.text_style());

        frame.render_widget(Clear, help_area);
        frame.render_widget(help_paragraph, help_area);
    }

    /// Leave the current page (closing its dialogs) and stop listening to
    /// the toast queue
    pub async fn shutdown(&mut self) -> Result<()> {
        self.toasts.unsubscribe(self.toast_subscription);
        if let Some(current_page) = self.page_manager.current_page_mut() {
            current_page.on_exit(&mut self.screen).await?;
        }
        Ok(())
    }
}
