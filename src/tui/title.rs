//! Terminal window title
//!
//! Pages call [`use_document_title`] when they become active; the event loop
//! pushes the screen title to the terminal through [`TitleSync`] after each
//! draw.

use super::screen::Screen;
use crossterm::{queue, terminal::SetTitle};
use std::io::Write;
use tracing::warn;

pub const APP_NAME: &str = "KAOS";

/// `"Squads | KAOS"`, or just `"KAOS"` for an empty page title
pub fn format_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        APP_NAME.to_string()
    } else {
        format!("{} | {}", title, APP_NAME)
    }
}

pub fn use_document_title(screen: &mut Screen, title: &str) {
    screen.set_title(format_title(title));
}

/// Writes the title to the terminal only when it changed
#[derive(Debug, Default)]
pub struct TitleSync {
    last: Option<String>,
}

impl TitleSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a new title was written. Failures are logged and
    /// retried on the next call.
    pub fn sync<W: Write>(&mut self, screen: &Screen, out: &mut W) -> bool {
        let title = screen.title();
        if title.is_empty() || self.last.as_deref() == Some(title) {
            return false;
        }
        let written = queue!(out, SetTitle(title)).and_then(|_| out.flush());
        match written {
            Ok(()) => {
                self.last = Some(title.to_string());
                true
            }
            Err(err) => {
                warn!("failed to set terminal title: {}", err);
                false
            }
        }
    }
}
