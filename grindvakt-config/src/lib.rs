//! # Grindvakt Configuration System
//!
//! Hierarchical configuration for the grindvakt daemon.
//!
//! ## Features
//! - **Unified Configuration**: single source of truth across all components
//! - **Validation**: runtime validation of critical parameters
//! - **Layering**: defaults, then `grindvakt.yaml`, then `GRINDVAKT_*`
//!   environment variables; command-line flags override all of these

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod daemon;
mod error;
mod ui;
mod queue;
mod rules;
mod validation;

pub use daemon::DaemonConfig;
pub use error::ConfigError;
pub use ui::UiConfig;
pub use queue::QueueConfig;
pub use rules::RulesConfig;

/// Top-level configuration container for all grindvakt components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct GrindvaktConfig {
    /// Decision front-end (interactive prompt) client settings.
    #[validate(nested)]
    pub ui: UiConfig,

    /// Rule storage settings.
    #[validate(nested)]
    pub rules: RulesConfig,

    /// Netfilter queue parameters.
    #[validate(nested)]
    pub queue: QueueConfig,

    /// Worker pool and logging settings.
    #[validate(nested)]
    pub daemon: DaemonConfig,
}

impl GrindvaktConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `grindvakt.yaml` in the working directory, if present
    /// 3. `GRINDVAKT_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(GrindvaktConfig::default()));

        if Path::new("grindvakt.yaml").exists() {
            figment = figment.merge(Yaml::file("grindvakt.yaml"));
        }

        figment
            .merge(Env::prefixed("GRINDVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path, for testing and validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(GrindvaktConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("GRINDVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
