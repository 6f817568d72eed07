//! # Grindvakt DNS Tracking
//!
//! The DNS fast path: recognizes intercepted packets that are purely
//! observed DNS answers and records the address-to-hostname associations
//! they carry, so later connections can be annotated with the domain name
//! that produced them.

pub mod parser;
pub mod tracker;

pub use parser::{parse_response, Answer, AnswerData, DnsParseError, DnsResponse};
pub use tracker::DnsTracker;
