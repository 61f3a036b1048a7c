//! Error types for the only fallible surface of the engine: model persistence.
//!
//! Planning, recommendation and scoring never fail; degenerate input resolves
//! to documented defaults instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelStoreError {
    #[error("model artifact I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model artifact version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

impl ModelStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
