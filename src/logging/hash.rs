//! Content hash used to tell log files from different builds apart

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

/// Placeholder the release script replaces with the real version number
pub const VERSION_PLACEHOLDER: &str = "{tf2rpvnum}";

/// Prefix of the versioned build folder a packaged release unpacks into
pub const BUILD_FOLDER_PREFIX: &str = "TF2 Rich Presence v";

const ADLER_MOD: u32 = 65521;

/// Adler-32 checksum of `data`
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;

    // 5552 is the largest run that cannot overflow `b` before reducing
    for chunk in data.chunks(5552) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }

    (b << 16) | a
}

/// Render a checksum as the 8 character lowercase hex fingerprint
pub fn format_hash(checksum: u32) -> String {
    let hex: String = format!("{:x}", checksum).chars().take(8).collect();
    format!("{:0<8}", hex)
}

/// Find a versioned build folder inside `working_dir`, if any
fn find_build_folder(working_dir: &Path) -> Option<String> {
    let mut folders: Vec<String> = fs::read_dir(working_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(BUILD_FOLDER_PREFIX))
        .collect();
    folders.sort();
    folders.into_iter().next()
}

/// Read one hash input, preferring the `resources` subdirectory
fn read_hash_input(working_dir: &Path, relative: &Path) -> io::Result<Vec<u8>> {
    match fs::read(working_dir.join("resources").join(relative)) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::read(working_dir.join(relative)),
        Err(e) => Err(e),
    }
}

fn strip_dev_suffix(data: Vec<u8>) -> Vec<u8> {
    let needle = format!("{}-dev", VERSION_PLACEHOLDER).into_bytes();
    let replacement = VERSION_PLACEHOLDER.as_bytes();

    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(&needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

/// Generate the short content hash for the files named in `files`
///
/// Files are concatenated in order with a newline between each one and
/// checksummed with Adler-32. Launcher sources are normalised so dev and
/// release builds hash the same.
pub fn generate_hash<S: AsRef<str>>(working_dir: &Path, files: &[S]) -> Result<String> {
    let build_folder = find_build_folder(working_dir);
    let mut joined = Vec::new();

    for (i, name) in files.iter().enumerate() {
        let name = name.as_ref();
        let relative = match &build_folder {
            Some(build) => PathBuf::from(build).join("resources").join(name),
            None => PathBuf::from(name),
        };

        let mut data =
            read_hash_input(working_dir, &relative).map_err(|source| LogError::HashInput {
                name: relative.display().to_string(),
                source,
            })?;

        if name.contains("launcher") {
            data = strip_dev_suffix(data);
        }

        if i > 0 {
            joined.push(b'\n');
        }
        joined.extend_from_slice(&data);
    }

    Ok(format_hash(adler32(&joined)))
}
