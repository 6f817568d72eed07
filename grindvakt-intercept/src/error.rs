//! Error types for the kernel interception boundary.

use std::process::ExitStatus;

use thiserror::Error;

/// Unified interception error type.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error("failed to open netfilter queue: {0}")]
    QueueOpen(#[source] std::io::Error),

    #[error("failed to bind netfilter queue #{num}: {source}")]
    QueueBind {
        num: u16,
        source: std::io::Error,
    },

    #[error("failed to read from netfilter queue: {0}")]
    Recv(#[source] std::io::Error),

    #[error("failed to deliver verdict: {0}")]
    Verdict(#[source] std::io::Error),

    #[error("failed to run {command}: {source}")]
    HookSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    HookFailed {
        command: String,
        status: ExitStatus,
    },
}
