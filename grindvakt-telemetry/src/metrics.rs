//! ## grindvakt-telemetry::metrics
//! **Prometheus counters for connection outcomes**
//!
//! One counter per event category, incremented concurrently by the packet
//! workers and exposable as text for telemetry consumers.

use prometheus::{Counter, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub connections_total: Counter,
    pub allowed: Counter,
    pub denied: Counter,
    pub ignored: Counter,
    pub dns_responses: Counter,
    pub rule_misses: Counter,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let connections_total = Counter::new(
            "grindvakt_connections_total",
            "Total resolved connection events",
        )
        .unwrap();
        let allowed =
            Counter::new("grindvakt_allowed_total", "Connections verdicted accept").unwrap();
        let denied = Counter::new("grindvakt_denied_total", "Connections verdicted drop").unwrap();
        let ignored = Counter::new(
            "grindvakt_ignored_total",
            "Packets accepted without connection resolution",
        )
        .unwrap();
        let dns_responses = Counter::new(
            "grindvakt_dns_responses_total",
            "DNS responses observed on the fast path",
        )
        .unwrap();
        let rule_misses = Counter::new(
            "grindvakt_rule_misses_total",
            "Connections no static rule matched",
        )
        .unwrap();

        for counter in [
            &connections_total,
            &allowed,
            &denied,
            &ignored,
            &dns_responses,
            &rule_misses,
        ] {
            registry.register(Box::new(counter.clone())).unwrap();
        }

        Self {
            registry,
            connections_total,
            allowed,
            denied,
            ignored,
            dns_responses,
            rule_misses,
        }
    }

    /// Record a fully resolved connection decision.
    pub fn on_connection(&self, allowed: bool, missed: bool) {
        self.connections_total.inc();
        if allowed {
            self.allowed.inc();
        } else {
            self.denied.inc();
        }
        if missed {
            self.rule_misses.inc();
        }
    }

    /// Record a packet accepted because it could not be resolved.
    pub fn on_ignored(&self) {
        self.ignored.inc();
    }

    /// Record a DNS response handled on the fast path.
    pub fn on_dns_response(&self) {
        self.dns_responses.inc();
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}
