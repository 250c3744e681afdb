use clap::Parser;
use tracing::error;

mod cli;
mod config;
mod logging;
mod tui;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Leave the terminal usable if anything panics mid-draw
    std::panic::set_hook(Box::new(|panic_info| {
        tui::reset_terminal();
        error!("Application panicked: {}", panic_info);
        eprintln!("KAOS panicked: {}", panic_info);
        std::process::exit(1);
    }));

    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Don't error if .env file doesn't exist
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    let cli = Cli::parse();
    if let Err(e) = cli.execute().await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
