//! Session logging for TF2 Rich Presence
//!
//! Provides the per-run log file with leveled, timestamped lines, pruning and
//! gzip archiving of older logs, and the hooks used to report errors.

mod hash;
mod level;
mod naming;
mod retention;
mod session;
mod telemetry;

pub use hash::{adler32, format_hash, generate_hash, BUILD_FOLDER_PREFIX, VERSION_PLACEHOLDER};
pub use level::{ReportingLevel, Severity};
pub use naming::{
    compressed_path, is_compressed, local_day_number, log_file_name, log_file_path, machine_name,
    user_identity, user_name, COMPRESSED_SUFFIX, LOGS_DIR_NAME,
};
pub use retention::{
    cleanup_logs, compress_log, compression_ratio, logs_by_age, CleanupReport, DEFAULT_MAX_LOGS,
};
pub use session::{caller_file_name, format_elapsed, format_line, LogSession};
pub use telemetry::{ErrorReporter, NoopReporter, TracingReporter};
