//! # Grindvakt Interception
//!
//! The kernel boundary: packets delivered through a netfilter queue, the
//! verdicts rendered back to it, and the firewall hooks that route traffic
//! into the queue in the first place.

pub mod hooks;
pub mod packet;
pub mod queue;

mod error;

pub use error::InterceptError;
pub use packet::Packet;
pub use queue::PacketQueue;
