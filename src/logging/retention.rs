//! Log file retention management
//!
//! Keeps the log directory bounded: the oldest files beyond `max_logs` are
//! deleted and every remaining inactive log is gzip-compressed in place.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::naming::{compressed_path, is_compressed};

/// Default number of log files kept across runs
pub const DEFAULT_MAX_LOGS: usize = 10;

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupReport {
    /// Files removed because the directory held more than `max_logs`
    pub deleted: Vec<PathBuf>,
    /// Files compressed, with `compressed / original` size (None for empty files)
    pub compressed: Vec<(PathBuf, Option<f64>)>,
    /// Per-file failures, already formatted for the log
    pub failures: Vec<String>,
}

/// Compression ratio rounded to 3 decimals, `None` when the original was empty
pub fn compression_ratio(original_len: usize, compressed_len: usize) -> Option<f64> {
    if original_len == 0 {
        return None;
    }
    let ratio = compressed_len as f64 / original_len as f64;
    Some((ratio * 1000.0).round() / 1000.0)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// List regular files in `logs_dir`, oldest first
///
/// Ties on modification time are broken by file name.
pub fn logs_by_age(logs_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let metadata = match entry.metadata() {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        logs.push((modified, entry.path()));
    }

    logs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.file_name().cmp(&b.1.file_name())));
    Ok(logs.into_iter().map(|(_, path)| path).collect())
}

/// Gzip `path` into `path.gz` and remove the original
///
/// Returns the archive path and the compression ratio. On failure the
/// original is left untouched and no partial archive remains.
pub fn compress_log(path: &Path) -> io::Result<(PathBuf, Option<f64>)> {
    let data = fs::read(path)?;
    let archive = compressed_path(path);

    let write_archive = || -> io::Result<usize> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data)?;
        let compressed = encoder.finish()?;

        let mut file = File::create(&archive)?;
        file.write_all(&compressed)?;
        file.sync_all()?;
        Ok(compressed.len())
    };

    let compressed_len = match write_archive() {
        Ok(len) => len,
        Err(e) => {
            let _ = fs::remove_file(&archive);
            return Err(e);
        }
    };

    if let Err(e) = fs::remove_file(path) {
        // Keep the uncompressed copy rather than holding both forms
        let _ = fs::remove_file(&archive);
        return Err(e);
    }

    Ok((archive, compression_ratio(data.len(), compressed_len)))
}

/// Delete the oldest logs beyond `max_logs`, then compress the rest
///
/// `active` is never deleted or compressed; when it is among the oldest the
/// next oldest file is removed in its place. Per-file failures are collected
/// in the report and do not stop the pass.
pub fn cleanup_logs(
    logs_dir: &Path,
    active: Option<&Path>,
    max_logs: usize,
) -> io::Result<CleanupReport> {
    cleanup_logs_with(logs_dir, active, max_logs, |path| fs::remove_file(path))
}

/// `cleanup_logs` with the deletion step supplied by the caller
///
/// A file whose deletion fails stays on disk, so it is still compressed.
fn cleanup_logs_with<F>(
    logs_dir: &Path,
    active: Option<&Path>,
    max_logs: usize,
    mut remove: F,
) -> io::Result<CleanupReport>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut report = CleanupReport::default();

    if !logs_dir.exists() {
        return Ok(report);
    }

    let is_active = |path: &Path| active.map_or(false, |active| same_file(path, active));
    let logs = logs_by_age(logs_dir)?;
    let mut overshoot = logs.len().saturating_sub(max_logs);

    for path in logs.iter().filter(|path| !is_active(path.as_path())) {
        if overshoot == 0 {
            break;
        }
        overshoot -= 1;

        match remove(path.as_path()) {
            Ok(()) => report.deleted.push(path.clone()),
            Err(e) => report
                .failures
                .push(format!("Couldn't delete log file {}: {}", path.display(), e)),
        }
    }

    for path in logs {
        if is_compressed(&path) || is_active(path.as_path()) || !path.exists() {
            continue;
        }

        match compress_log(&path) {
            Ok((_, ratio)) => report.compressed.push((path, ratio)),
            Err(e) => report
                .failures
                .push(format!("Couldn't compress log file {}: {}", path.display(), e)),
        }
    }

    Ok(report)
}
