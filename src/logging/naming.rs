//! Log file naming
//!
//! Session log files are named after the machine, the user, the release
//! version, the content hash and the local day number, so each build gets
//! one file per machine per day.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};

use super::hash::VERSION_PLACEHOLDER;

/// Name of the log directory, relative to the working directory
pub const LOGS_DIR_NAME: &str = "logs";

/// Suffix added to archived (compressed) log files
pub const COMPRESSED_SUFFIX: &str = ".gz";

const SECONDS_PER_DAY: i64 = 86_400;

/// Current user's account name
pub fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// This machine's host name
#[cfg(unix)]
pub fn machine_name() -> String {
    let mut buf = [0u8; 256];
    // SAFETY: buf is valid for buf.len() bytes and gethostname writes at most that many
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc == 0 {
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        if let Ok(name) = std::str::from_utf8(&buf[..len]) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

/// This machine's host name
#[cfg(not(unix))]
pub fn machine_name() -> String {
    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// `<machine>_<user>`, the identity reported to the error reporter
pub fn user_identity() -> String {
    format!("{}_{}", machine_name(), user_name())
}

/// Days since the Unix epoch, shifted into the local timezone
pub fn local_day_number(now: DateTime<Local>) -> i64 {
    let offset = i64::from(now.offset().local_minus_utc());
    (now.with_timezone(&Utc).timestamp() + offset).div_euclid(SECONDS_PER_DAY)
}

/// File name for a session log
pub fn log_file_name(identity: &str, hash: &str, day: i64) -> String {
    format!("{}_{}_{}_{}.log", identity, VERSION_PLACEHOLDER, hash, day)
}

/// Full path of a session log under `working_dir`
pub fn log_file_path(working_dir: &Path, identity: &str, hash: &str) -> PathBuf {
    working_dir
        .join(LOGS_DIR_NAME)
        .join(log_file_name(identity, hash, local_day_number(Local::now())))
}

/// Whether a path names an already compressed archive
pub fn is_compressed(path: &Path) -> bool {
    path.to_string_lossy().ends_with(COMPRESSED_SUFFIX)
}

/// Archive path for an uncompressed log (`name.log` -> `name.log.gz`)
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}
