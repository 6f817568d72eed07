//! Error types for the front-end client.

use thiserror::Error;

/// Unified front-end client error type.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("invalid socket locator '{0}': expected unix:///path or tcp://host:port")]
    BadLocator(String),

    #[error("front-end connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("front-end I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("front-end frame too large: {0} bytes")]
    OversizedFrame(u32),

    #[error("front-end sent a malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
}
