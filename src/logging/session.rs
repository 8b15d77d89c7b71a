//! Per-run log session
//!
//! A `LogSession` owns the log file for the lifetime of the process. Every
//! line is flushed as soon as it is written, and the handle is released when
//! the session is closed or dropped.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;

use super::hash::generate_hash;
use super::level::{ReportingLevel, Severity};
use super::naming::{log_file_path, user_identity};
use super::retention::{cleanup_logs, CleanupReport};
use super::telemetry::ErrorReporter;
use crate::config::Config;
use crate::error::{LogError, Result};

/// Data file the host must be able to write, checked at startup
const DB_FILE: &str = "DB.json";

/// Hash shown in the name of a disabled session whose hash inputs are missing
const UNKNOWN_HASH: &str = "00000000";

/// Base name of a source path, used as the caller tag on error lines
pub fn caller_file_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(path)
}

/// Write an ERROR line tagged with the calling file's name
///
/// ```ignore
/// session_error!(log, "Couldn't read {}: {}", path.display(), err);
/// ```
#[macro_export]
macro_rules! session_error {
    ($session:expr, $($arg:tt)+) => {
        $session.error(
            $crate::logging::caller_file_name(file!()),
            format!($($arg)+),
        )
    };
}

/// Format elapsed seconds the way log lines show them
pub fn format_elapsed(seconds: f64) -> String {
    format!("{:.4}", seconds)
}

/// Compose one log line, including the trailing newline
pub fn format_line(timestamp: i64, elapsed: &str, level: Severity, message: &str) -> String {
    format!("[{} +{}] {}: {}\n", timestamp, elapsed, level.as_str(), message)
}

#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    match CString::new(path.as_os_str().as_bytes()) {
        // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
        Ok(c_path) => unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 },
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// The log for one process run
pub struct LogSession {
    /// File this session appends to
    path: PathBuf,
    /// Directory pruned by `cleanup`
    logs_dir: PathBuf,
    /// Open handle, `None` when disabled or closed
    file: Option<File>,
    /// Minimum severity written
    threshold: Severity,
    enabled: bool,
    reporting: ReportingLevel,
    /// Echo lines to `echo` as well
    to_stderr: bool,
    /// Where echoed lines go, stderr outside of tests
    echo: Box<dyn Write + Send>,
    /// Monotonic time of the previous line
    last_write: Option<Instant>,
    reporter: Box<dyn ErrorReporter>,
}

impl LogSession {
    /// Open the session log
    ///
    /// Without `path`, the file name is derived from the machine, the user,
    /// the release version, the content hash and the local day number.
    /// Fails only if logging is enabled and the hash inputs, the log
    /// directory or the file cannot be read or created.
    pub fn open(
        config: &Config,
        path: Option<PathBuf>,
        mut reporter: Box<dyn ErrorReporter>,
    ) -> Result<Self> {
        let identity = user_identity();
        let enabled = config.logging_enabled();
        let path = match path {
            Some(path) => path,
            None => {
                let hash = match generate_hash(&config.working_dir, config.hashed_files.as_slice()) {
                    Ok(hash) => hash,
                    // Disabled sessions never write to this path
                    Err(_) if !enabled => UNKNOWN_HASH.to_string(),
                    Err(e) => return Err(e),
                };
                log_file_path(&config.working_dir, &identity, &hash)
            }
        };

        reporter.set_user(&identity);

        let logs_dir = config.logs_dir();

        let file = if enabled {
            fs::create_dir_all(&logs_dir).map_err(|source| LogError::CreateDir {
                path: logs_dir.clone(),
                source,
            })?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| LogError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| LogError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            Some(file)
        } else {
            None
        };

        let mut session = Self {
            path,
            logs_dir,
            file,
            threshold: config.log_level,
            enabled,
            reporting: config.sentry_level,
            to_stderr: config.log_to_stderr,
            echo: Box::new(io::stderr()),
            last_write: None,
            reporter,
        };

        let db_paths = [
            config.working_dir.join(DB_FILE),
            config.working_dir.join("resources").join(DB_FILE),
        ];
        if !db_paths.iter().any(|p| is_writable(p)) {
            session.error(
                caller_file_name(file!()),
                "DB.json can't be written to. This could cause crashes",
            );
        }

        Ok(session)
    }

    /// Path of this session's log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this session writes at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the file handle is still held
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append one line to the log
    ///
    /// Lines are recorded as breadcrumbs and flushed immediately. A failed
    /// write is reported with a single ERROR line rather than returned.
    pub fn write_log(&mut self, level: Severity, message: &str) {
        self.write_line(level, message, false);
    }

    fn write_line(&mut self, level: Severity, message: &str, recovering: bool) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let elapsed = match self.last_write {
            Some(previous) => format_elapsed(now.duration_since(previous).as_secs_f64()),
            None => format_elapsed(0.0),
        };
        let line = format_line(Utc::now().timestamp(), &elapsed, level, message);

        self.reporter.add_breadcrumb(&line, level.breadcrumb_level());

        let written = match self.file.as_mut() {
            Some(file) => file.write_all(line.as_bytes()).and_then(|_| file.flush()),
            None => Ok(()),
        };

        if let Err(e) = written {
            if recovering {
                tracing::warn!(path = %self.path.display(), "Dropped log line after failed recovery: {}", e);
            } else {
                self.error_line(
                    caller_file_name(file!()),
                    &format!("Couldn't write log line: {}", e),
                    true,
                );
            }
        }

        if self.to_stderr {
            let _ = writeln!(self.echo, "{}", line.trim_end_matches('\n'));
        }

        self.last_write = Some(now);
    }

    /// A log with a level of DEBUG (most things)
    pub fn debug(&mut self, message: impl AsRef<str>) {
        if self.threshold.allows(Severity::Debug) {
            self.write_log(Severity::Debug, message.as_ref());
        }
    }

    /// A log with a level of INFO
    pub fn info(&mut self, message: impl AsRef<str>) {
        if self.threshold.allows(Severity::Info) {
            self.write_log(Severity::Info, message.as_ref());
        }
    }

    /// A log with a level of ERROR (caught, non-fatal errors)
    ///
    /// `caller` names the file the error came from; `session_error!` fills it in.
    pub fn error(&mut self, caller: &str, message: impl AsRef<str>) {
        self.error_line(caller, message.as_ref(), false);
    }

    fn error_line(&mut self, caller: &str, message: &str, recovering: bool) {
        if self.threshold.allows(Severity::Error) {
            self.write_line(Severity::Error, &format!("[{}] {}", caller, message), recovering);
        }

        if self.reporting.captures_errors() {
            self.reporter
                .capture_message(&format!("Reporting non-critical ERROR: {}", message));
        }
    }

    /// A log with a level of CRITICAL (uncaught, fatal errors)
    pub fn critical(&mut self, message: impl AsRef<str>) {
        if self.threshold.allows(Severity::Critical) {
            self.write_log(Severity::Critical, message.as_ref());
        }
    }

    /// Delete the oldest logs beyond `max_logs` and compress the rest
    ///
    /// The active log is never touched. Failures are written to the log.
    pub fn cleanup(&mut self, max_logs: usize) -> CleanupReport {
        let report = match cleanup_logs(&self.logs_dir, Some(&self.path), max_logs) {
            Ok(report) => report,
            Err(e) => {
                self.error(
                    caller_file_name(file!()),
                    format!("Couldn't list log directory {}: {}", self.logs_dir.display(), e),
                );
                return CleanupReport::default();
            }
        };

        for failure in &report.failures {
            self.error(caller_file_name(file!()), failure);
        }

        let deleted: Vec<String> = report
            .deleted
            .iter()
            .map(|p| format!("'{}'", p.display()))
            .collect();
        self.debug(format!(
            "Deleted {} log(s): [{}]",
            deleted.len(),
            deleted.join(", ")
        ));

        let compressed: Vec<String> = report
            .compressed
            .iter()
            .map(|(p, ratio)| match ratio {
                Some(ratio) => format!("('{}', {})", p.display(), ratio),
                None => format!("('{}', None)", p.display()),
            })
            .collect();
        self.debug(format!(
            "Compressed {} log(s): [{}]",
            compressed.len(),
            compressed.join(", ")
        ));

        report
    }

    /// Flush and release the log file
    pub fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        if self.file.is_some() {
            self.debug("Closing log file via destructor");
            self.file = None;
        }
    }
}

impl fmt::Display for LogSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogSession at {} (enabled={} level={}, stderr={})",
            self.path.display(),
            self.enabled,
            self.threshold,
            self.to_stderr
        )
    }
}

impl fmt::Debug for LogSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSession")
            .field("path", &self.path)
            .field("enabled", &self.enabled)
            .field("threshold", &self.threshold)
            .field("reporting", &self.reporting)
            .field("to_stderr", &self.to_stderr)
            .field("open", &self.file.is_some())
            .finish()
    }
}
