pub mod records;

use crate::tui::{
    screen::{KeyDispatch, NodeId, Screen},
    styles::Theme,
    Frame,
};
use anyhow::Result;
use async_trait::async_trait;
use ratatui::layout::Rect;
use std::collections::HashMap;
use tracing::debug;

/// Page identifier type
pub type PageId = String;

/// Base trait for all pages
///
/// Pages mount their nodes on the screen in `on_enter` and remove them in
/// `on_exit`. Keys reach `handle_key` after the screen's capture listeners
/// and before the screen's default action.
#[async_trait]
pub trait Page: Send + Sync {
    /// Get the page ID
    fn id(&self) -> &PageId;

    /// Get the page title
    fn title(&self) -> &str;

    /// Handle a key. Returns whether the page consumed it.
    async fn handle_key(&mut self, screen: &mut Screen, event: &mut KeyDispatch) -> Result<bool>;

    /// Handle a click on `target` (the hit-tested node, if any)
    async fn handle_click(&mut self, screen: &mut Screen, target: Option<NodeId>) -> Result<bool>;

    /// Handle periodic updates
    async fn tick(&mut self, _screen: &mut Screen) -> Result<()> {
        Ok(())
    }

    /// Render the page
    fn render(&mut self, frame: &mut Frame, area: Rect, screen: &mut Screen, theme: &Theme);

    /// Called when the page becomes active
    async fn on_enter(&mut self, _screen: &mut Screen) -> Result<()> {
        Ok(())
    }

    /// Called when the page becomes inactive
    async fn on_exit(&mut self, _screen: &mut Screen) -> Result<()> {
        Ok(())
    }

    /// Apply state changes requested since the last call, e.g. by dialog
    /// callbacks fired from a screen key listener
    fn flush(&mut self, _screen: &mut Screen) -> Result<()> {
        Ok(())
    }

    /// Whether one of the page's dialogs is open
    fn has_open_dialog(&self) -> bool {
        false
    }

    /// Get page-specific help text
    fn help_text(&self) -> Vec<(&str, &str)> {
        vec![]
    }
}

/// Page manager for handling navigation between pages
pub struct PageManager {
    /// All registered pages
    pages: HashMap<PageId, Box<dyn Page>>,

    /// Registration order, used for the page switcher keys
    order: Vec<PageId>,

    /// Current active page
    current_page: Option<PageId>,

    /// Page history for navigation
    history: Vec<PageId>,

    /// Maximum history size
    max_history: usize,
}

impl PageManager {
    /// Create a new page manager
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            order: Vec::new(),
            current_page: None,
            history: Vec::new(),
            max_history: 10,
        }
    }

    /// Register a page
    pub fn register_page(&mut self, page: Box<dyn Page>) {
        let id = page.id().clone();
        if !self.order.contains(&id) {
            self.order.push(id.clone());
        }
        self.pages.insert(id, page);
    }

    /// Registered page ids in registration order
    pub fn page_ids(&self) -> &[PageId] {
        &self.order
    }

    /// Navigate to a page, running the exit and enter hooks
    pub async fn navigate_to(&mut self, page_id: PageId, screen: &mut Screen) -> Result<()> {
        if !self.pages.contains_key(&page_id) {
            return Err(anyhow::anyhow!("Page '{}' not found", page_id));
        }
        if self.current_page.as_ref() == Some(&page_id) {
            return Ok(());
        }

        if let Some(current_id) = self.current_page.take() {
            if let Some(page) = self.pages.get_mut(&current_id) {
                page.on_exit(screen).await?;
            }
            self.add_to_history(current_id);
        }

        self.enter(page_id, screen).await
    }

    /// Return to the previous page, if any
    pub async fn go_back(&mut self, screen: &mut Screen) -> Result<bool> {
        let Some(previous) = self.history.pop() else {
            return Ok(false);
        };
        if let Some(current_id) = self.current_page.take() {
            if let Some(page) = self.pages.get_mut(&current_id) {
                page.on_exit(screen).await?;
            }
        }
        self.enter(previous, screen).await?;
        Ok(true)
    }

    async fn enter(&mut self, page_id: PageId, screen: &mut Screen) -> Result<()> {
        if let Some(page) = self.pages.get_mut(&page_id) {
            page.on_enter(screen).await?;
        }
        debug!("entered page '{}'", page_id);
        self.current_page = Some(page_id);
        Ok(())
    }

    /// Get the current page
    pub fn current_page(&self) -> Option<&dyn Page> {
        let current_id = self.current_page.as_ref()?;
        self.pages.get(current_id).map(|page| page.as_ref())
    }

    /// Get the current page mutably
    pub fn current_page_mut(&mut self) -> Option<&mut (dyn Page + 'static)> {
        let current_id = self.current_page.as_ref()?;
        self.pages.get_mut(current_id).map(|page| page.as_mut())
    }

    /// Get the current page ID
    pub fn current_page_id(&self) -> Option<&PageId> {
        self.current_page.as_ref()
    }

    pub fn history(&self) -> &[PageId] {
        &self.history
    }

    /// Add page to history
    fn add_to_history(&mut self, page_id: PageId) {
        // Don't add duplicate consecutive entries
        if self.history.last() != Some(&page_id) {
            self.history.push(page_id);

            // Limit history size
            if self.history.len() > self.max_history {
                self.history.remove(0);
            }
        }
    }
}

impl Default for PageManager {
    fn default() -> Self {
        Self::new()
    }
}
