//! # Grindvakt Engine
//!
//! The daemon core: a fixed pool of packet workers draining the kernel
//! queue through a zero-buffer hand-off, the layered policy resolution
//! that turns each packet into a verdict, and the lifecycle sequencing
//! that keeps interception hooks from outliving their consumer.

pub mod daemon;
pub mod dispatch;
pub mod lifecycle;
pub mod pipeline;

mod error;

pub use daemon::Daemon;
pub use dispatch::Dispatcher;
pub use error::DaemonError;
pub use pipeline::{Pipeline, Prompter, Resolver, SystemResolver};
