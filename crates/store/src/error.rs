//! Storage error types.

use std::path::PathBuf;

use fleetrent_shared::AppError;
use thiserror::Error;

/// Errors raised while reading or writing a collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file holds something other than the expected JSON.
    #[error("Malformed data in {path}: {source}")]
    Serialization {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
