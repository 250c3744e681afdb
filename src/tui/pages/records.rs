//! Record list pages (squads, people)
//!
//! Each page lists its records with a Delete button per row and an Add
//! button opening a form dialog. The page owns the open state of both
//! dialogs: dialog callbacks only post a [`PageAction`], which the page
//! applies in `flush` before syncing the dialogs.

use super::{Page, PageId};
use crate::tui::{
    components::{
        dialogs::{
            callback, ConfirmDialog, ConfirmVariant, Dialog, DialogCallback, DialogConfig, DialogSize,
            InitialFocus, Modal,
        },
        node_view::render_stack,
    },
    screen::{KeyDispatch, NodeId, NodeSpec, Screen},
    styles::Theme,
    title::use_document_title,
    toast::ToastStore,
    Frame,
};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: Uuid,
    pub name: String,
    pub role: Option<String>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Row text, e.g. `Ana Souza (Engineer)`
    pub fn display_name(&self) -> String {
        match &self.role {
            Some(role) => format!("{} ({})", self.name, role),
            None => self.name.clone(),
        }
    }
}

/// Requests posted by dialog callbacks and page controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    OpenAdd,
    CloseAdd,
    Save,
    RequestDelete(Uuid),
    ConfirmDelete,
    CancelDelete,
}

#[derive(Debug, Clone, Copy)]
struct FormNodes {
    input: NodeId,
    /// Only present when the page has roles to pick from
    role: Option<NodeId>,
    save: NodeId,
    cancel: NodeId,
}

#[derive(Debug, Clone)]
struct PageNodes {
    container: NodeId,
    add_button: NodeId,
    summary: NodeId,
    /// Delete button of each row
    rows: Vec<(Uuid, NodeId)>,
}

pub struct RecordListPage {
    id: PageId,
    title: String,
    /// Singular name used in messages, e.g. "squad"
    noun: String,
    records: Vec<Record>,
    /// Choices for the form's role select; empty means no select
    roles: Vec<String>,

    actions: mpsc::UnboundedSender<PageAction>,
    pending: mpsc::UnboundedReceiver<PageAction>,

    add_open: bool,
    add_dialog: Modal,
    form: Option<FormNodes>,

    delete_target: Option<Uuid>,
    delete_dialog: ConfirmDialog,

    nodes: Option<PageNodes>,
    toasts: ToastStore,
}

impl RecordListPage {
    pub fn new(
        id: impl Into<PageId>,
        title: impl Into<String>,
        noun: impl Into<String>,
        records: Vec<Record>,
        toasts: ToastStore,
    ) -> Self {
        let id = id.into();
        let title = title.into();
        let noun = noun.into();
        let (actions, pending) = mpsc::unbounded_channel();

        let add_dialog = Modal::new(
            DialogConfig::new(format!("{}-add", id), format!("New {}", noun))
                .with_size(DialogSize::at_least(44, 7)),
            post(&actions, PageAction::CloseAdd),
        );
        let delete_dialog = ConfirmDialog::new(
            DialogConfig::new(format!("{}-delete", id), format!("Delete {}", noun)),
            "",
            post(&actions, PageAction::ConfirmDelete),
            post(&actions, PageAction::CancelDelete),
        )
        .with_labels("Delete", "Cancel")
        .with_variant(ConfirmVariant::Danger);

        Self {
            id,
            title,
            noun,
            records,
            roles: Vec::new(),
            actions,
            pending,
            add_open: false,
            add_dialog,
            form: None,
            delete_target: None,
            delete_dialog,
            nodes: None,
            toasts,
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn squads(toasts: ToastStore) -> Self {
        let records = ["Platform", "Payments", "Growth", "Mobile", "Data", "Infra"]
            .into_iter()
            .map(Record::new)
            .collect();
        Self::new("squads", "Squads", "squad", records, toasts)
    }

    pub fn people(toasts: ToastStore) -> Self {
        let records = [
            "Ana Souza",
            "Bruno Lima",
            "Carla Mendes",
            "Diego Rocha",
            "Elisa Prado",
            "Felipe Nunes",
            "Gabi Torres",
            "Hugo Alves",
        ]
        .into_iter()
        .map(Record::new)
        .collect();
        let roles = ["Engineer", "Designer", "Product manager"]
            .into_iter()
            .map(String::from)
            .collect();
        Self::new("people", "People", "person", records, toasts).with_roles(roles)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn add_button(&self) -> Option<NodeId> {
        self.nodes.as_ref().map(|nodes| nodes.add_button)
    }

    pub fn delete_button(&self, record: Uuid) -> Option<NodeId> {
        self.nodes
            .as_ref()?
            .rows
            .iter()
            .find(|(id, _)| *id == record)
            .map(|(_, button)| *button)
    }

    pub fn is_add_open(&self) -> bool {
        self.add_dialog.is_open()
    }

    pub fn is_delete_open(&self) -> bool {
        self.delete_dialog.is_open()
    }

    pub fn form_input(&self) -> Option<NodeId> {
        self.form.map(|form| form.input)
    }

    pub fn form_role(&self) -> Option<NodeId> {
        self.form.and_then(|form| form.role)
    }

    pub fn delete_dialog(&self) -> &ConfirmDialog {
        &self.delete_dialog
    }

    fn mount(&mut self, screen: &mut Screen) -> Result<()> {
        let root = screen.root();
        let container = screen.insert(root, &NodeSpec::container().with_role("main"))?;
        let toolbar = screen.insert(container, &NodeSpec::group(Vec::new()))?;
        let add_button = screen.insert(toolbar, &NodeSpec::button(format!("Add {}", self.noun)))?;
        let summary = screen.insert(toolbar, &NodeSpec::text("").with_attribute("data-tone", "muted"))?;

        self.nodes = Some(PageNodes {
            container,
            add_button,
            summary,
            rows: Vec::new(),
        });
        self.rebuild_rows(screen)?;
        Ok(())
    }

    fn unmount(&mut self, screen: &mut Screen) {
        self.add_open = false;
        self.delete_target = None;
        self.add_dialog.unmount(screen);
        self.form = None;
        self.delete_dialog.close(screen);
        if let Some(nodes) = self.nodes.take() {
            screen.remove(nodes.container);
        }
    }

    /// Recreate the rows from `records`. Row nodes are not reused, so ids
    /// held for removed rows go stale.
    fn rebuild_rows(&mut self, screen: &mut Screen) -> Result<()> {
        let Some(nodes) = self.nodes.as_mut() else {
            return Ok(());
        };
        for (_, button) in nodes.rows.drain(..) {
            if let Some(row) = screen.node(button).and_then(|node| node.parent()) {
                screen.remove(row);
            }
        }
        for record in &self.records {
            let row = screen.insert(nodes.container, &NodeSpec::group(Vec::new()))?;
            screen.insert(row, &NodeSpec::text(record.display_name()))?;
            let button = screen.insert(
                row,
                &NodeSpec::button("Delete")
                    .with_attribute("data-variant", "danger")
                    .with_attribute("aria-label", format!("Delete {}", record.name)),
            )?;
            nodes.rows.push((record.id, button));
        }
        let count = self.records.len();
        let noun = if count == 1 { self.noun.clone() } else { plural(&self.noun) };
        if let Some(summary) = screen.node_mut(nodes.summary) {
            summary.label = format!("{} {}", count, noun);
        }
        Ok(())
    }

    fn save(&mut self, screen: &Screen) -> bool {
        let Some(form) = self.form else {
            return false;
        };
        let name = screen
            .node(form.input)
            .and_then(|node| node.kind.value())
            .unwrap_or_default()
            .trim()
            .to_string();
        if name.is_empty() {
            self.toasts.error("Name is required");
            return false;
        }
        let role = form
            .role
            .and_then(|role| screen.node(role))
            .and_then(|node| node.kind.value())
            .map(str::to_string);
        self.toasts
            .success(format!("{} \"{}\" created", capitalize(&self.noun), name));
        let mut record = Record::new(name);
        record.role = role;
        self.records.push(record);
        self.add_open = false;
        true
    }

    fn delete(&mut self) -> bool {
        let Some(target) = self.delete_target.take() else {
            return false;
        };
        let Some(position) = self.records.iter().position(|record| record.id == target) else {
            self.toasts.warning(format!("That {} no longer exists", self.noun));
            return false;
        };
        let record = self.records.remove(position);
        self.toasts
            .success(format!("{} \"{}\" deleted", capitalize(&self.noun), record.name));
        true
    }

    fn sync_dialogs(&mut self, screen: &mut Screen) -> Result<()> {
        if self.add_open && !self.add_dialog.is_open() {
            let roles = &self.roles;
            let form = self.add_dialog.open_with(screen, |screen, body| {
                let input = screen.insert(body, &NodeSpec::input("Name"))?;
                let role = if roles.is_empty() {
                    None
                } else {
                    Some(screen.insert(body, &NodeSpec::select("Role", roles.clone()))?)
                };
                let buttons = screen.insert(body, &NodeSpec::group(Vec::new()))?;
                let save = screen.insert(buttons, &NodeSpec::button("Save"))?;
                let cancel = screen.insert(buttons, &NodeSpec::button("Cancel"))?;
                Ok((
                    InitialFocus::Node(input),
                    FormNodes {
                        input,
                        role,
                        save,
                        cancel,
                    },
                ))
            })?;
            if form.is_some() {
                self.form = form;
            }
        } else if !self.add_open && self.add_dialog.is_open() {
            self.add_dialog.close(screen);
            self.form = None;
        }

        match self.delete_target {
            Some(target) if !self.delete_dialog.is_open() => {
                let name = self
                    .records
                    .iter()
                    .find(|record| record.id == target)
                    .map(|record| record.name.clone())
                    .unwrap_or_default();
                self.delete_dialog.set_message(format!(
                    "Delete {} \"{}\"? This cannot be undone.",
                    self.noun, name
                ));
                self.delete_dialog.open(screen)?;
            }
            None if self.delete_dialog.is_open() => self.delete_dialog.close(screen),
            _ => {}
        }
        Ok(())
    }

    /// Save/Cancel inside the form; Enter in the name field submits
    fn handle_form_key(&mut self, screen: &Screen, event: &mut KeyDispatch) -> bool {
        let (Some(form), Some(active)) = (self.form, screen.active_node()) else {
            return false;
        };
        let action = match event.code() {
            KeyCode::Enter if active == form.input => PageAction::Save,
            KeyCode::Enter | KeyCode::Char(' ') if active == form.save => PageAction::Save,
            KeyCode::Enter | KeyCode::Char(' ') if active == form.cancel => PageAction::CloseAdd,
            _ => return false,
        };
        event.prevent_default();
        let _ = self.actions.send(action);
        true
    }

    fn row_action(&self, target: NodeId) -> Option<PageAction> {
        let nodes = self.nodes.as_ref()?;
        if target == nodes.add_button {
            return Some(PageAction::OpenAdd);
        }
        nodes
            .rows
            .iter()
            .find(|(_, button)| *button == target)
            .map(|(id, _)| PageAction::RequestDelete(*id))
    }
}

fn post(actions: &mpsc::UnboundedSender<PageAction>, action: PageAction) -> DialogCallback {
    let actions = actions.clone();
    callback(move || {
        let _ = actions.send(action.clone());
    })
}

fn plural(noun: &str) -> String {
    match noun {
        "person" => "people".to_string(),
        _ => format!("{}s", noun),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl Page for RecordListPage {
    fn id(&self) -> &PageId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    async fn handle_key(&mut self, screen: &mut Screen, event: &mut KeyDispatch) -> Result<bool> {
        let consumed = if self.delete_dialog.is_open() {
            self.delete_dialog.handle_key(screen, event)
        } else if self.add_dialog.is_open() {
            self.handle_form_key(screen, event) || self.add_dialog.handle_key(screen, event)
        } else {
            let activates = matches!(event.code(), KeyCode::Enter | KeyCode::Char(' '));
            match screen.active_node().filter(|_| activates).and_then(|active| self.row_action(active)) {
                Some(action) => {
                    event.prevent_default();
                    let _ = self.actions.send(action);
                    true
                }
                None => false,
            }
        };
        self.flush(screen)?;
        Ok(consumed)
    }

    async fn handle_click(&mut self, screen: &mut Screen, target: Option<NodeId>) -> Result<bool> {
        let consumed = if self.delete_dialog.is_open() {
            self.delete_dialog.handle_click(screen, target)
        } else if self.add_dialog.is_open() {
            let form_action = self.form.zip(target).and_then(|(form, target)| {
                if target == form.save {
                    Some(PageAction::Save)
                } else if target == form.cancel {
                    Some(PageAction::CloseAdd)
                } else {
                    None
                }
            });
            match form_action {
                Some(action) => {
                    let _ = self.actions.send(action);
                    true
                }
                None => self.add_dialog.handle_click(screen, target),
            }
        } else {
            match target {
                Some(target) => match self.row_action(target) {
                    Some(action) => {
                        screen.focus(target);
                        let _ = self.actions.send(action);
                        true
                    }
                    None => screen.focus(target),
                },
                None => false,
            }
        };
        self.flush(screen)?;
        Ok(consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, screen: &mut Screen, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.clone())
            .border_style(theme.border_style())
            .style(theme.base_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(nodes) = &self.nodes {
            let container = nodes.container;
            screen.set_area(container, inner);
            let offset = screen.scroll_offset();
            let total = render_stack(frame, screen, container, inner, theme, offset);
            screen.clamp_scroll(total.saturating_sub(inner.height));
        }

        self.add_dialog.render(frame, area, screen, theme);
        self.delete_dialog.render(frame, area, screen, theme);
    }

    async fn on_enter(&mut self, screen: &mut Screen) -> Result<()> {
        use_document_title(screen, &self.title);
        if self.nodes.is_none() {
            self.mount(screen)?;
        }
        if let Some(add_button) = self.add_button() {
            screen.focus(add_button);
        }
        Ok(())
    }

    async fn on_exit(&mut self, screen: &mut Screen) -> Result<()> {
        self.unmount(screen);
        Ok(())
    }

    fn has_open_dialog(&self) -> bool {
        self.add_dialog.is_open() || self.delete_dialog.is_open()
    }

    /// Apply queued actions, then bring the dialogs in line with the open
    /// state
    fn flush(&mut self, screen: &mut Screen) -> Result<()> {
        let mut changed = false;
        while let Ok(action) = self.pending.try_recv() {
            debug!("page '{}' action {:?}", self.id, action);
            match action {
                PageAction::OpenAdd => self.add_open = true,
                PageAction::CloseAdd => self.add_open = false,
                PageAction::Save => changed |= self.save(screen),
                PageAction::RequestDelete(id) => {
                    if self.records.iter().any(|record| record.id == id) {
                        self.delete_target = Some(id);
                    }
                }
                PageAction::ConfirmDelete => changed |= self.delete(),
                PageAction::CancelDelete => self.delete_target = None,
            }
        }

        self.sync_dialogs(screen)?;
        if changed {
            self.rebuild_rows(screen)?;
        }
        if screen.active_node().is_none() && !self.has_open_dialog() {
            // the opener went away with its row
            if let Some(add_button) = self.add_button() {
                screen.focus(add_button);
            }
        }
        Ok(())
    }

    fn help_text(&self) -> Vec<(&str, &str)> {
        vec![
            ("Tab / Shift+Tab", "Move focus"),
            ("Enter / Space", "Activate"),
            ("Esc", "Close dialog"),
            ("PgUp / PgDn", "Scroll list"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::screen::ListenerPhase;
    use crate::tui::toast::ToastVariant;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    async fn entered(page: &mut RecordListPage, screen: &mut Screen) {
        page.on_enter(screen).await.unwrap();
        draw(page, screen);
    }

    fn draw(page: &mut RecordListPage, screen: &mut Screen) {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 24);
        let root = screen.root();
        screen.set_area(root, area);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| page.render(frame, area, screen, &theme))
            .unwrap();
        screen.run_frame_callbacks();
    }

    /// Same order as the app: capture listeners, page, default action
    async fn press(page: &mut RecordListPage, screen: &mut Screen, code: KeyCode) {
        let mut event = KeyDispatch::new(KeyEvent::new(code, KeyModifiers::NONE));
        screen.dispatch_key(ListenerPhase::Capture, &mut event);
        page.flush(screen).unwrap();
        if !event.is_propagation_stopped() {
            page.handle_key(screen, &mut event).await.unwrap();
        }
        screen.apply_default_action(&event);
        draw(page, screen);
    }

    async fn type_text(page: &mut RecordListPage, screen: &mut Screen, text: &str) {
        for c in text.chars() {
            press(page, screen, KeyCode::Char(c)).await;
        }
    }

    #[tokio::test]
    async fn test_enter_mounts_rows_and_focuses_add() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::squads(toasts);
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;

        assert_eq!(screen.title(), "Squads | KAOS");
        assert_eq!(screen.active_node(), page.add_button());
        for record in page.records() {
            assert!(page.delete_button(record.id).is_some());
        }
    }

    #[tokio::test]
    async fn test_add_flow_creates_record_and_toast() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::squads(toasts.clone());
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;
        let add_button = page.add_button();
        let before = page.records().len();

        press(&mut page, &mut screen, KeyCode::Enter).await;
        assert!(page.is_add_open());
        assert_eq!(screen.active_node(), page.form_input());

        type_text(&mut page, &mut screen, "Search").await;
        press(&mut page, &mut screen, KeyCode::Enter).await;

        assert!(!page.is_add_open());
        assert_eq!(page.records().len(), before + 1);
        assert_eq!(page.records().last().unwrap().name, "Search");
        assert_eq!(screen.active_node(), add_button);
        assert!(!screen.is_scroll_locked());

        let raised = toasts.toasts();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].variant, ToastVariant::Success);
        assert_eq!(raised[0].message, "Squad \"Search\" created");
    }

    #[tokio::test]
    async fn test_people_form_picks_a_role() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::people(toasts.clone());
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;

        press(&mut page, &mut screen, KeyCode::Enter).await;
        type_text(&mut page, &mut screen, "Iris").await;
        press(&mut page, &mut screen, KeyCode::Tab).await;
        assert_eq!(screen.active_node(), page.form_role());

        // Down twice, Up once: second option
        press(&mut page, &mut screen, KeyCode::Down).await;
        press(&mut page, &mut screen, KeyCode::Down).await;
        press(&mut page, &mut screen, KeyCode::Up).await;
        let role = page.form_role().and_then(|id| screen.node(id)).unwrap();
        assert_eq!(role.kind.value(), Some("Designer"));

        screen.focus(page.form_input().unwrap());
        press(&mut page, &mut screen, KeyCode::Enter).await;
        let added = page.records().last().unwrap();
        assert_eq!(added.role.as_deref(), Some("Designer"));
        assert_eq!(added.display_name(), "Iris (Designer)");
        assert_eq!(toasts.toasts()[0].message, "Person \"Iris\" created");
    }

    #[tokio::test]
    async fn test_squad_form_has_no_role_select() {
        let mut page = RecordListPage::squads(ToastStore::new());
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;

        press(&mut page, &mut screen, KeyCode::Enter).await;
        assert!(page.is_add_open());
        assert!(page.form_input().is_some());
        assert!(page.form_role().is_none());
    }

    #[tokio::test]
    async fn test_empty_name_keeps_form_open() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::squads(toasts.clone());
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;

        press(&mut page, &mut screen, KeyCode::Enter).await;
        press(&mut page, &mut screen, KeyCode::Enter).await;

        assert!(page.is_add_open());
        assert_eq!(toasts.toasts()[0].variant, ToastVariant::Error);
    }

    #[tokio::test]
    async fn test_escape_closes_form_and_restores_focus() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::people(toasts.clone());
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;
        let add_button = page.add_button();

        press(&mut page, &mut screen, KeyCode::Enter).await;
        assert!(page.is_add_open());
        press(&mut page, &mut screen, KeyCode::Esc).await;

        assert!(!page.is_add_open());
        assert_eq!(screen.active_node(), add_button);
        assert_eq!(screen.key_listener_count(), 0);
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_delete_starts_on_cancel_and_confirms() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::squads(toasts.clone());
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;
        let target = page.records()[0].clone();
        let delete_button = page.delete_button(target.id).unwrap();

        screen.focus(delete_button);
        press(&mut page, &mut screen, KeyCode::Enter).await;
        assert!(page.is_delete_open());
        assert_eq!(screen.active_node(), page.delete_dialog().cancel_button());
        assert!(page.delete_dialog().message().contains("Platform"));

        press(&mut page, &mut screen, KeyCode::Right).await;
        press(&mut page, &mut screen, KeyCode::Enter).await;

        assert!(!page.is_delete_open());
        assert!(page.records().iter().all(|record| record.id != target.id));
        assert!(screen.node(delete_button).is_none());
        // the opener was removed with its row
        assert_eq!(screen.active_node(), page.add_button());
        assert_eq!(toasts.toasts()[0].message, "Squad \"Platform\" deleted");
    }

    #[tokio::test]
    async fn test_cancel_delete_restores_row_focus() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::people(toasts.clone());
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;
        let target = page.records()[1].id;
        let delete_button = page.delete_button(target).unwrap();

        page.handle_click(&mut screen, Some(delete_button)).await.unwrap();
        draw(&mut page, &mut screen);
        assert!(page.is_delete_open());

        // backdrop
        let backdrop = screen.hit_test(0, 0);
        page.handle_click(&mut screen, backdrop).await.unwrap();

        assert!(!page.is_delete_open());
        assert_eq!(page.records().len(), 8);
        assert_eq!(screen.active_node(), Some(delete_button));
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_scroll_locked_while_dialog_open() {
        let toasts = ToastStore::new();
        let records = (0..60).map(|n| Record::new(format!("Person {n}"))).collect();
        let mut page = RecordListPage::new("people", "People", "person", records, toasts);
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;

        press(&mut page, &mut screen, KeyCode::PageDown).await;
        assert_eq!(screen.scroll_offset(), 10);

        press(&mut page, &mut screen, KeyCode::Enter).await;
        assert!(page.is_add_open());
        press(&mut page, &mut screen, KeyCode::PageDown).await;
        assert_eq!(screen.scroll_offset(), 10);

        press(&mut page, &mut screen, KeyCode::Esc).await;
        press(&mut page, &mut screen, KeyCode::PageDown).await;
        assert_eq!(screen.scroll_offset(), 20);
    }

    #[tokio::test]
    async fn test_exit_unmounts_everything() {
        let toasts = ToastStore::new();
        let mut page = RecordListPage::squads(toasts);
        let mut screen = Screen::new();
        entered(&mut page, &mut screen).await;
        press(&mut page, &mut screen, KeyCode::Enter).await;
        assert!(page.has_open_dialog());

        page.on_exit(&mut screen).await.unwrap();
        assert!(!page.has_open_dialog());
        assert!(!screen.is_scroll_locked());
        assert_eq!(screen.key_listener_count(), 0);
        assert!(screen.node(screen.root()).unwrap().children().is_empty());
    }
}
