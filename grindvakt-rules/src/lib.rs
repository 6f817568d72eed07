//! # Grindvakt Rules
//!
//! The policy table consulted for every resolved connection: an ordered
//! sequence of rules with first-match-wins semantics, loadable from and
//! persistable to a directory of JSON definitions.

pub mod operator;
pub mod rule;
pub mod store;

mod error;

pub use error::RuleError;
pub use operator::{Operand, Operator};
pub use rule::{Action, Duration, Rule};
pub use store::RuleStore;
