//! Station directory error types.

use std::path::PathBuf;

/// Errors that can occur when loading the station directory.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The table file could not be read
    #[error("failed to read station table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table contained no usable rows
    #[error("station table contains no valid stations")]
    Empty,
}
