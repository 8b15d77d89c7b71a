//! Settings for the session logger
//!
//! Replaces a process-wide settings lookup: hosts load a `Config` once and
//! hand it to `LogSession::open`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::{ReportingLevel, Severity, DEFAULT_MAX_LOGS};

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Minimum severity written to the log ("Debug", "Info", "Error", "Critical" or "Off")
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    /// Which errors are escalated to the error reporter ("All errors", "Crashes" or "Never")
    #[serde(default = "default_sentry_level")]
    pub sentry_level: ReportingLevel,

    /// Maximum number of log files kept by cleanup (default: 10)
    #[serde(default = "default_max_logs")]
    pub max_logs: usize,

    /// Echo every log line to stderr
    #[serde(default)]
    pub log_to_stderr: bool,

    /// Directory that holds `logs/`, `resources/` and the hashed source files
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Files fingerprinted into the log file name, in order
    #[serde(default = "default_hashed_files")]
    pub hashed_files: Vec<String>,
}

fn default_log_level() -> Severity {
    Severity::Debug
}

fn default_sentry_level() -> ReportingLevel {
    ReportingLevel::AllErrors
}

fn default_max_logs() -> usize {
    DEFAULT_MAX_LOGS
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_hashed_files() -> Vec<String> {
    [
        "main.py",
        "console_log.py",
        "configs.py",
        "custom_maps.py",
        "logger.py",
        "updater.py",
        "launcher.py",
        "settings.py",
        "detect_system_language.py",
        "maps.json",
        "localization.json",
        "APIs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sentry_level: default_sentry_level(),
            max_logs: default_max_logs(),
            log_to_stderr: false,
            working_dir: default_working_dir(),
            hashed_files: default_hashed_files(),
        }
    }
}

impl Config {
    /// Load configuration from the default settings file, or defaults if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_file_path())
    }

    /// Load configuration from `path`, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read settings file")?;
            toml::from_str(&content).context("Failed to parse settings file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content).context("Failed to write settings file")?;
        Ok(())
    }

    /// Whether the logger writes anything at all
    pub fn logging_enabled(&self) -> bool {
        self.log_level != Severity::Off
    }

    /// Path of the `logs` directory
    pub fn logs_dir(&self) -> PathBuf {
        self.working_dir.join(crate::logging::LOGS_DIR_NAME)
    }
}

/// Get the base settings directory (<config dir>/tf2-rich-presence)
/// Falls back to ./.tf2-rich-presence if the platform config dir is unknown
pub fn settings_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("tf2-rich-presence"))
        .unwrap_or_else(|| PathBuf::from(".tf2-rich-presence"))
}

/// Get the path to the settings file
pub fn settings_file_path() -> PathBuf {
    settings_dir().join("settings.toml")
}
