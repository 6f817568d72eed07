//! # Grindvakt Telemetry
//!
//! Crate for logging and connection statistics.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
