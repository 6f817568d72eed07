//! # Grindvakt Core
//!
//! Shared domain types for the grindvakt daemon crates.

pub mod conn;
pub mod verdict;

pub use conn::{Connection, Process, Protocol};
pub use verdict::Verdict;
