//! Decision front-end client configuration.
//!
//! The daemon escalates connections that match no static rule to an
//! interactive front-end over a local or network socket.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Front-end client configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct UiConfig {
    /// Socket the front-end listens on (`unix:///path` or `tcp://host:port`).
    #[validate(custom(function = validation::validate_socket_locator))]
    #[serde(default = "default_socket")]
    pub socket: String,

    /// Action applied when the front-end cannot be reached (`allow` or `deny`).
    #[validate(custom(function = validation::validate_action))]
    #[serde(default = "default_fallback_action")]
    pub fallback_action: String,
}

fn default_socket() -> String {
    "unix:///tmp/grindvakt.sock".into()
}

fn default_fallback_action() -> String {
    "allow".into()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            socket: default_socket(),
            fallback_action: default_fallback_action(),
        }
    }
}
