//! Netfilter queue configuration.
//!
//! The kernel-side queue is the daemon's sole packet intake; its depth bounds
//! how much traffic can pile up while all workers are busy.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Netfilter queue parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct QueueConfig {
    /// Queue number the interception hooks route packets to.
    #[serde(default)]
    pub num: u16,

    /// Maximum packets the kernel holds while no worker is free.
    #[validate(range(min = 128, max = 65536))]
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Bytes of each packet copied to userspace.
    #[validate(range(min = 576, max = 65535))]
    #[serde(default = "default_copy_size")]
    pub copy_size: u16,
}

fn default_depth() -> u32 {
    4096
}

fn default_copy_size() -> u16 {
    4096
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            num: 0,
            depth: default_depth(),
            copy_size: default_copy_size(),
        }
    }
}
