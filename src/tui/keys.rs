use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub description: String,
}

impl KeyBinding {
    pub fn new(key: KeyCode, modifiers: KeyModifiers, description: &str) -> Self {
        Self {
            key,
            modifiers,
            description: description.to_string(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && self.modifiers == event.modifiers
    }

    /// Short label such as `Ctrl+C` or `F1`
    pub fn label(&self) -> String {
        let key = match self.key {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Esc => "Esc".to_string(),
            other => format!("{:?}", other),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", key)
        } else {
            key
        }
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Quit application
    pub quit: KeyBinding,

    /// Show help
    pub help: KeyBinding,

    /// Switch to the n-th registered page
    pub pages: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL, "Quit application"),
            help: KeyBinding::new(KeyCode::Char('g'), KeyModifiers::CONTROL, "Show/hide help"),
            pages: vec![
                KeyBinding::new(KeyCode::F(1), KeyModifiers::NONE, "Squads"),
                KeyBinding::new(KeyCode::F(2), KeyModifiers::NONE, "People"),
            ],
        }
    }
}

impl KeyMap {
    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event)
    }

    /// Check if the event should show help
    pub fn should_show_help(&self, event: &KeyEvent) -> bool {
        self.help.matches(event)
    }

    /// Index of the page the event switches to
    pub fn page_index(&self, event: &KeyEvent) -> Option<usize> {
        self.pages.iter().position(|binding| binding.matches(event))
    }

    /// (key, description) pairs for all global bindings
    pub fn help_entries(&self) -> Vec<(String, String)> {
        std::iter::once(&self.quit)
            .chain(std::iter::once(&self.help))
            .chain(self.pages.iter())
            .map(|binding| (binding.label(), binding.description.clone()))
            .collect()
    }
}
