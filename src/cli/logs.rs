//! Logs command implementation for viewing KAOS logs

use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use notify::{recommended_watcher, RecursiveMode, Watcher};
use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom},
    path::Path,
    time::Duration,
};
use tokio::{fs, time::interval};

/// View and manage KAOS logs
#[derive(Debug, Args)]
pub struct LogsCommand {
    /// Follow log output in real-time
    #[arg(short, long)]
    pub follow: bool,

    /// Number of lines to show from the end of the log
    #[arg(short, long, default_value = "100")]
    pub tail: usize,

    /// Only show lines at this level
    #[arg(short, long, value_enum)]
    pub level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<LogsSubcommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum LogsSubcommand {
    /// Clear the log file
    Clear,
}

impl LogsCommand {
    /// Execute the logs command
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let log_file = config.log_file();

        if let Some(LogsSubcommand::Clear) = self.command {
            if log_file.exists() {
                fs::write(&log_file, "")
                    .await
                    .with_context(|| format!("Failed to clear log file: {}", log_file.display()))?;
                println!("Log file cleared: {}", log_file.display());
            } else {
                println!("No log file found to clear.");
            }
            return Ok(());
        }

        if !log_file.exists() {
            eprintln!("No log file found at: {}", log_file.display());
            eprintln!("Make sure KAOS has been run at least once to generate logs.");
            return Ok(());
        }

        let file = File::open(&log_file)
            .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;
        let lines = self.filter_lines(self.read_tail_lines(file)?);
        for line in &lines {
            println!("{}", line);
        }

        if self.follow {
            self.follow_logs(&log_file).await
        } else {
            Ok(())
        }
    }

    /// Print appended lines as the file changes until interrupted. The
    /// watcher wakes the loop; the interval catches events it misses.
    async fn follow_logs(&self, log_file: &Path) -> Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::channel(100);

        let watched = log_file.to_path_buf();
        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                if event.paths.iter().any(|path| path == &watched) {
                    let _ = tx.try_send(());
                }
            }
        })
        .context("Failed to create log file watcher")?;

        // rotation replaces the file, so watch its directory
        let log_dir = log_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher
            .watch(log_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", log_dir.display()))?;

        let mut position = fs::metadata(log_file).await.map(|meta| meta.len()).unwrap_or(0);
        let mut ticker = interval(Duration::from_millis(500));

        loop {
            tokio::select! {
                Some(()) = rx.recv() => self.print_new_lines(log_file, &mut position),
                _ = ticker.tick() => self.print_new_lines(log_file, &mut position),
                _ = tokio::signal::ctrl_c() => {
                    println!("\nStopping log follow...");
                    return Ok(());
                }
            }
        }
    }

    fn print_new_lines(&self, log_file: &Path, position: &mut u64) {
        match read_new_lines(log_file, position) {
            Ok(lines) => {
                for line in self.filter_lines(lines) {
                    println!("{}", line);
                }
            }
            Err(e) => eprintln!("Failed to read {}: {:#}", log_file.display(), e),
        }
    }

    /// Read the last N lines from a file
    fn read_tail_lines(&self, file: File) -> Result<Vec<String>> {
        let all_lines: Vec<String> = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("Failed to read lines from log file")?;

        let skip = all_lines.len().saturating_sub(self.tail);
        Ok(all_lines.into_iter().skip(skip).collect())
    }

    fn filter_lines(&self, lines: Vec<String>) -> Vec<String> {
        match self.level {
            Some(level) => lines
                .into_iter()
                .filter(|line| line_matches_level(line, level))
                .collect(),
            None => lines,
        }
    }
}

/// Complete lines appended since `position`. A truncated file is read from
/// the start, a missing one has no new lines yet, and a trailing partial line
/// waits for its newline.
fn read_new_lines(log_file: &Path, position: &mut u64) -> Result<Vec<String>> {
    let mut file = match File::open(log_file) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            // a recreated file starts over
            *position = 0;
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to open {}", log_file.display())),
    };
    let size = file.metadata()?.len();
    if size < *position {
        *position = 0;
    }
    if size == *position {
        return Ok(Vec::new());
    }

    file.seek(SeekFrom::Start(*position))?;
    let mut appended = Vec::new();
    file.read_to_end(&mut appended)?;
    let Some(end) = appended.iter().rposition(|byte| *byte == b'\n') else {
        return Ok(Vec::new());
    };
    *position += end as u64 + 1;
    Ok(String::from_utf8_lossy(&appended[..end])
        .lines()
        .map(str::to_string)
        .collect())
}

/// The fmt layer writes `<timestamp> <LEVEL> <target>: <message>`
fn line_matches_level(line: &str, level: LogLevel) -> bool {
    line.split_whitespace()
        .take(2)
        .any(|token| token.eq_ignore_ascii_case(level.as_str()))
}
