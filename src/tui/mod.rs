//! Terminal User Interface module using ratatui
//!
//! Pages mount nodes into a [`screen::Screen`]; dialogs and the toast queue
//! layer over them. Each loop turn draws, runs the callbacks deferred to
//! after the draw, mirrors the screen title onto the terminal and then
//! waits for the next event.

mod app;
mod components;
mod events;
mod keys;
mod pages;
mod screen;
mod styles;
mod title;
pub mod toast;
mod utils;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::config::Config;
use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use title::TitleSync;
use tracing::{debug, warn};

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal(mouse: bool) -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Best-effort restore without a terminal handle, for the panic hook
pub fn reset_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        crossterm::cursor::Show
    );
}

/// Main TUI entry point
pub async fn run(config: &Config) -> Result<()> {
    let mut terminal = init_terminal(config.mouse_enabled)?;
    let mut event_handler = EventHandler::new(config.tick_rate());

    let result = match App::new(config, event_handler.sender()).await {
        Ok(mut app) => {
            let result = run_app(&mut terminal, &mut app, &mut event_handler).await;
            if let Err(e) = app.shutdown().await {
                warn!("Failed to shut down cleanly: {}", e);
            }
            result
        }
        Err(e) => Err(e),
    };

    restore_terminal(&mut terminal)?;
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    let mut title = TitleSync::default();

    loop {
        terminal.draw(|frame| app.render(frame))?;

        // deferred callbacks may move focus or change what is on screen
        if app.after_draw() > 0 {
            terminal.draw(|frame| app.render(frame))?;
        }

        title.sync(&app.screen, terminal.backend_mut());

        match event_handler.next().await {
            Some(event) => {
                if app.handle_event(event).await? {
                    break; // Exit requested
                }
            }
            None => {
                debug!("Event source closed");
                break;
            }
        }
    }
    Ok(())
}
