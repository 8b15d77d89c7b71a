//! Severity levels and error-reporting verbosity
//!
//! Severities are totally ordered. A configured threshold admits its own level
//! and every stricter one; `Off` admits nothing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Error,
    Critical,
    Off,
}

impl Severity {
    /// Label used inside a log line
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Off => "OFF",
        }
    }

    /// Name used in the settings file
    pub fn setting_name(&self) -> &'static str {
        match self {
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
            Severity::Off => "Off",
        }
    }

    /// Whether a threshold of `self` lets `level` through
    pub fn allows(&self, level: Severity) -> bool {
        *self != Severity::Off && level != Severity::Off && level >= *self
    }

    /// Breadcrumb level in the error reporter's vocabulary
    pub fn breadcrumb_level(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Error => "error",
            Severity::Critical => "fatal",
            Severity::Off => "off",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.setting_name())
    }
}

/// How much gets escalated to the error reporter (the `sentry_level` setting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Every `error` call is also captured as a message
    #[serde(rename = "All errors")]
    AllErrors,
    /// Only crashes are reported (by the host)
    Crashes,
    Never,
}

impl ReportingLevel {
    /// Whether non-critical errors should be captured
    pub fn captures_errors(&self) -> bool {
        matches!(self, ReportingLevel::AllErrors)
    }
}

impl fmt::Display for ReportingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportingLevel::AllErrors => f.write_str("All errors"),
            ReportingLevel::Crashes => f.write_str("Crashes"),
            ReportingLevel::Never => f.write_str("Never"),
        }
    }
}
