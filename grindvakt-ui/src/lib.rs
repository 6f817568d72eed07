//! # Grindvakt UI Client
//!
//! Client side of the interactive decision front-end: when no static rule
//! matches a connection, the daemon sends the connection record to the
//! front-end and receives the rule a human (or the front-end's own policy)
//! decided on. An unreachable front-end is a defined condition, answered
//! with a configured fallback rule, never an error that stalls a worker.

mod client;
mod error;
mod wire;

pub use client::{SocketLocator, UiClient};
pub use error::UiError;
