//! Configuration file support

use homelens_chat::{EngineConfig, ReportConfig, RevealConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend used when neither the flag nor the config names one
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8001";

/// Configuration for homelens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analysis backend
    pub api_url: Option<String>,
    /// User name sent with every request
    pub user_name: Option<String>,
    /// Bearer token (prefer `--login` or HOMELENS_AUTH_TOKEN)
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// "light" or "dark"
    pub theme: Option<String>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Refuse a new message while a reply is still being handled
    pub exclusive_sends: Option<bool>,
    #[serde(default)]
    pub reveal: RevealSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    pub interval_ms: Option<u64>,
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub completion_signal: Option<String>,
    pub read_delay_ms: Option<u64>,
    pub loading_delay_ms: Option<u64>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("homelens")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("HOMELENS_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a file, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Write the example config to `path` unless a file is already there
    pub fn init_at(path: &Path) -> std::io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, example_config())
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(homelens_api::client::DEFAULT_TIMEOUT)
    }

    /// Engine settings, with defaults for anything left out
    pub fn engine_config(&self) -> EngineConfig {
        let mut reveal = RevealConfig::default();
        if let Some(ms) = self.reveal.interval_ms {
            reveal.interval = Duration::from_millis(ms);
        }
        if let Some(ref delimiter) = self.reveal.delimiter {
            reveal.delimiter = delimiter.clone();
        }

        let mut report = ReportConfig::default();
        if let Some(ref signal) = self.report.completion_signal {
            report.completion_signal = signal.clone();
        }
        if let Some(ms) = self.report.read_delay_ms {
            report.read_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.report.loading_delay_ms {
            report.loading_delay = Duration::from_millis(ms);
        }

        EngineConfig {
            reveal,
            report,
            exclusive_sends: self.exclusive_sends.unwrap_or(false),
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# homelens configuration file
# Place at ~/.config/homelens/config.toml (Linux) or set HOMELENS_CONFIG_PATH

# Analysis backend
api_url = "http://127.0.0.1:8001"

# Name sent as user_name with every message
# user_name = "guest"

# Bearer token (optional - `homelens --login NAME --token T` or
# HOMELENS_AUTH_TOKEN are preferred)
# auth_token = "..."

# Per-request timeout in seconds
request_timeout_secs = 30

# Color theme (light, dark)
theme = "light"

# Whether to use TUI mode by default
tui = true

# Refuse a new message while the previous reply is still being handled
exclusive_sends = false

[reveal]
# Delay between the parts of a multi-part reply
interval_ms = 1000
# Phrase that splits a reply the backend did not segment itself
delimiter = "예를 들어"

[report]
# A reply containing this text, with report data attached, opens the report
completion_signal = "분석 중"
# Time to read the last reply before the loading screen
read_delay_ms = 5000
# Time on the loading screen before the report opens
loading_delay_ms = 5000
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelens_chat::reveal::DEFAULT_DELIMITER;

    #[test]
    fn test_example_config_parses_to_defaults() {
        let cfg: Config = toml::from_str(example_config()).unwrap();
        let engine = cfg.engine_config();
        assert_eq!(cfg.api_url(), DEFAULT_API_URL);
        assert_eq!(engine.reveal.interval, Duration::from_millis(1000));
        assert_eq!(engine.reveal.delimiter, DEFAULT_DELIMITER);
        assert_eq!(engine.report.completion_signal, "분석 중");
        assert_eq!(engine.report.read_delay, Duration::from_secs(5));
        assert!(!engine.exclusive_sends);
        assert!(engine.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
            user_name = "minji"
            [reveal]
            interval_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(cfg.user_name.as_deref(), Some("minji"));
        let engine = cfg.engine_config();
        assert_eq!(engine.reveal.interval, Duration::from_millis(250));
        assert_eq!(engine.reveal.delimiter, DEFAULT_DELIMITER);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_fails_validation() {
        let cfg: Config = toml::from_str("[reveal]\ninterval_ms = 0\n").unwrap();
        assert!(cfg.engine_config().validate().is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml"));
        assert!(cfg.api_url.is_none());
    }

    #[test]
    fn test_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::init_at(&path).unwrap();
        let cfg = Config::load_from(&path);
        assert_eq!(cfg.theme.as_deref(), Some("light"));

        fs::write(&path, "theme = \"dark\"\n").unwrap();
        Config::init_at(&path).unwrap();
        assert_eq!(Config::load_from(&path).theme.as_deref(), Some("dark"));
    }
}
