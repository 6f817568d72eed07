//! Error types for rule loading and persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Unified rule store error type.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed rule file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to persist rule '{name}': {source}")]
    Persist {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to encode rule '{name}': {source}")]
    Encode {
        name: String,
        source: serde_json::Error,
    },
}
