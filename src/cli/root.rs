use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::logs::LogsCommand;
use crate::{config::Config, logging, tui};

/// KAOS - team and sprint management in your terminal
#[derive(Parser)]
#[command(
    name = "kaos",
    version,
    about = "Team and sprint management in your terminal",
    long_about = r#"KAOS manages squads, people, schedules and sprints from the terminal.

Examples:
  kaos                            # Start interactive mode
  kaos logs --tail 50             # Show the last 50 log lines
  kaos --cwd /path/to/project     # Set working directory"#
)]
pub struct Cli {
    /// Current working directory
    #[arg(short = 'c', long = "cwd", global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View the application log
    Logs(LogsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        // Change working directory if specified
        if let Some(cwd) = &self.cwd {
            std::env::set_current_dir(cwd)
                .with_context(|| format!("Failed to change directory to {}", cwd.display()))?;
        }

        // Initialize configuration
        let config = Config::init(self.config.as_deref()).await?;

        match self.command {
            Some(Commands::Logs(logs_cmd)) => {
                logging::init_stderr(self.debug)?;
                logs_cmd.execute(&config).await
            }
            None => {
                logging::init_file(&config.log_file(), self.debug)?;
                debug!("Configuration initialized: {:?}", config);
                self.start_interactive_mode(&config).await
            }
        }
    }

    async fn start_interactive_mode(&self, config: &Config) -> Result<()> {
        info!("Starting interactive mode");
        tui::run(config).await?;
        info!("Application finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logs_command() {
        let cli = Cli::try_parse_from(["kaos", "--debug", "logs", "--tail", "20", "--level", "warn"]).unwrap();
        assert!(cli.debug);
        match cli.command {
            Some(Commands::Logs(logs)) => {
                assert_eq!(logs.tail, 20);
                assert_eq!(logs.level, Some(crate::cli::logs::LogLevel::Warn));
            }
            None => panic!("expected logs command"),
        }
    }

    #[test]
    fn test_no_command_is_interactive() {
        let cli = Cli::try_parse_from(["kaos", "--config", "team.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("team.json")));
    }
}
