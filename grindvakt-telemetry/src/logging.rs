//! ## grindvakt-telemetry::logging
//! **Structured logging with tracing**
//!
//! All daemon crates log through `tracing`; this module owns subscriber
//! setup (level filtering, optional log-file output) and the structured
//! event helper used for notable firewall events.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;

use opentelemetry::KeyValue;
use tracing::info_span;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Install the global subscriber.
    ///
    /// `RUST_LOG` wins when set; otherwise `debug` selects debug-level
    /// output and the default is `info`. When `log_file` is given, output
    /// is appended there instead of standard output.
    pub fn init(debug: bool, log_file: Option<&Path>) -> io::Result<()> {
        let default_level = if debug { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        match log_file {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                fmt()
                    .with_env_filter(filter)
                    .with_thread_names(true)
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .init();
            }
            None => {
                fmt()
                    .with_env_filter(filter)
                    .with_thread_names(true)
                    .init();
            }
        }
        Ok(())
    }

    /// Emit a structured event for notable firewall activity.
    pub fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "firewall_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );
        let _guard = span.enter();
        tracing::info!(metadata = ?metadata, "Firewall event occurred");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logging() {
        EventLogger::log_event("test", vec![KeyValue::new("key", "value")]);
        assert!(logs_contain("Firewall event occurred"));
    }
}
