//! The engine's umbrella error type.

use thiserror::Error;

use grindvakt_config::ConfigError;
use grindvakt_intercept::InterceptError;
use grindvakt_rules::RuleError;
use grindvakt_ui::UiError;

/// Errors that abort the daemon. Everything else is handled in place by
/// the packet pipeline.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("rule store error: {0}")]
    Rules(#[from] RuleError),

    #[error("interception error: {0}")]
    Intercept(#[from] InterceptError),

    #[error("front-end client error: {0}")]
    Ui(#[from] UiError),

    #[error("worker pool error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
