//! Error taxonomy for a run.
//!
//! Configuration errors are raised before any file is read and make `main`
//! print usage. Everything else is fatal without usage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Config(String),
    #[error("data directory does not exist: {}", .0.display())]
    MissingDataDir(PathBuf),
    #[error("failed to walk data directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    pub fn config(msg: impl Into<String>) -> Self {
        RunError::Config(msg.into())
    }

    /// True for errors that should be answered with usage text.
    pub fn is_config(&self) -> bool {
        matches!(self, RunError::Config(_) | RunError::MissingDataDir(_))
    }
}

/// True if `err` (or anything it wraps) is a configuration error.
pub fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<RunError>())
        .any(RunError::is_config)
}
