//! Rule storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Rule storage configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RulesConfig {
    /// Directory rule definitions are loaded from and persisted to.
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("rules")
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl RulesConfig {
    /// Rule directory with a leading `~` expanded to the user's home.
    pub fn expanded_path(&self) -> PathBuf {
        let Some(rest) = self
            .path
            .to_str()
            .and_then(|s| s.strip_prefix("~/"))
        else {
            return self.path.clone();
        };
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_prefix() {
        std::env::set_var("HOME", "/home/vakt");
        let config = RulesConfig {
            path: PathBuf::from("~/rules"),
        };
        assert_eq!(config.expanded_path(), PathBuf::from("/home/vakt/rules"));
    }

    #[test]
    fn absolute_path_is_untouched() {
        let config = RulesConfig {
            path: PathBuf::from("/etc/grindvakt/rules"),
        };
        assert_eq!(config.expanded_path(), config.path);
    }
}
