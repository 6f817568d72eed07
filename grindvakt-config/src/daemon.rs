//! Worker pool and logging configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Daemon runtime parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct DaemonConfig {
    /// Number of concurrent packet workers.
    #[validate(range(min = 1, max = 512))]
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Log file path; standard output when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logs.
    #[serde(default)]
    pub debug: bool,
}

fn default_workers() -> usize {
    16
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            log_file: None,
            debug: false,
        }
    }
}
