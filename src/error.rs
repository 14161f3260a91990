//! Per-file load errors
//!
//! These never abort a run. The loader logs them and moves on to the next
//! result file.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one result file into a metric record
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file held text but not a single decodable JSON object
    #[error("no JSON document could be recovered from {}: {source}", .path.display())]
    NoDocuments {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Path of the offending result file
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Io { path, .. } | LoadError::NoDocuments { path, .. } => path,
        }
    }
}
