use crate::tui::toast::ToastTimings;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("{0} must be greater than 0")]
    Zero(&'static str),

    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Toast queue settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// How many toasts are shown at once
    pub max_visible: usize,

    /// Auto-dismiss delay for success and info toasts
    pub short_ms: u64,

    /// Auto-dismiss delay for error and warning toasts
    pub long_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            max_visible: 3,
            short_ms: 5000,
            long_ms: 8000,
        }
    }
}

impl ToastConfig {
    pub fn timings(&self) -> ToastTimings {
        ToastTimings {
            short: Duration::from_millis(self.short_ms),
            long: Duration::from_millis(self.long_ms),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for logs and local state
    pub data_dir: PathBuf,

    /// Base URL of the KAOS REST API
    pub api_base_url: Option<String>,

    /// Enable mouse support
    pub mouse_enabled: bool,

    /// Interval between tick events
    pub tick_rate_ms: u64,

    pub toast: ToastConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .map(|dir| dir.join("kaos"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            api_base_url: None,
            mouse_enabled: true,
            tick_rate_ms: 100,
            toast: ToastConfig::default(),
        }
    }
}

impl Config {
    /// Initialize configuration from various sources
    ///
    /// Defaults, then the first config file found (or `explicit_file`), then
    /// `KAOS_*` environment variables.
    pub async fn init(explicit_file: Option<&Path>) -> Result<Self, ConfigError> {
        debug!("Initializing configuration");

        let mut config = match explicit_file {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::load_from_file().await?.unwrap_or_default(),
        };

        config.load_from_env()?;
        config.validate()?;

        // Ensure data directory exists
        let log_dir = config.log_dir();
        if !log_dir.exists() {
            std::fs::create_dir_all(&log_dir).map_err(|source| ConfigError::DataDir {
                path: log_dir.clone(),
                source,
            })?;
        }

        Ok(config)
    }

    /// Configuration file candidates, highest priority first
    pub fn config_paths() -> Vec<PathBuf> {
        // 1. ./.kaos.json
        // 2. ./kaos.json
        // 3. $CONFIG_DIR/kaos/kaos.json
        let mut config_paths = vec![PathBuf::from("./.kaos.json"), PathBuf::from("./kaos.json")];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("kaos").join("kaos.json"));
        }
        config_paths
    }

    /// Load the first configuration file that exists
    pub async fn load_from_file() -> Result<Option<Self>, ConfigError> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from_path(&path).await.map(Some);
            }
        }
        Ok(None)
    }

    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|var| std::env::var(var).ok())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(data_dir) = lookup("KAOS_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }

        if let Some(url) = lookup("KAOS_API_BASE_URL") {
            self.api_base_url = Some(url);
        }

        if let Some(mouse) = lookup("KAOS_MOUSE") {
            self.mouse_enabled = parse_env("KAOS_MOUSE", &mouse, |value| {
                match value.to_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Some(true),
                    "0" | "false" | "no" | "off" => Some(false),
                    _ => None,
                }
            })?;
        }

        if let Some(tick) = lookup("KAOS_TICK_RATE_MS") {
            self.tick_rate_ms = parse_env("KAOS_TICK_RATE_MS", &tick, |value| value.parse().ok())?;
        }

        if let Some(max) = lookup("KAOS_TOAST_MAX_VISIBLE") {
            self.toast.max_visible = parse_env("KAOS_TOAST_MAX_VISIBLE", &max, |value| value.parse().ok())?;
        }

        if let Some(short) = lookup("KAOS_TOAST_SHORT_MS") {
            self.toast.short_ms = parse_env("KAOS_TOAST_SHORT_MS", &short, |value| value.parse().ok())?;
        }

        if let Some(long) = lookup("KAOS_TOAST_LONG_MS") {
            self.toast.long_ms = parse_env("KAOS_TOAST_LONG_MS", &long, |value| value.parse().ok())?;
        }

        Ok(())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join("kaos.log")
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Zero("tick_rate_ms"));
        }
        if self.toast.max_visible == 0 {
            return Err(ConfigError::Zero("toast.max_visible"));
        }
        if self.toast.short_ms == 0 {
            return Err(ConfigError::Zero("toast.short_ms"));
        }
        if self.toast.long_ms == 0 {
            return Err(ConfigError::Zero("toast.long_ms"));
        }
        Ok(())
    }
}

fn parse_env<T>(var: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, ConfigError> {
    parse(value.trim()).ok_or_else(|| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}
