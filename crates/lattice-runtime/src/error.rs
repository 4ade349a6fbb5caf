//! Runtime error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON.
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// The document holds no recognizable event list.
    #[error("Unrecognized document: expected an event array, {{\"events\": [...]}} or a sync response")]
    UnrecognizedDocument,
}

impl RuntimeError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
