//! tf2rp-logger - Per-run session log for TF2 Rich Presence
//!
//! This library provides the log session, its settings, and log archive cleanup.

pub mod config;
pub mod error;
pub mod logging;
