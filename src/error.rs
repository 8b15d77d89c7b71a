//! Error types for the session logger

use std::io;
use std::path::PathBuf;

/// Fatal setup failures. Everything that happens after construction is
/// recovered inside the session and written to the log instead.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to create log directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read hash input {name}")]
    HashInput {
        name: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LogError>;
