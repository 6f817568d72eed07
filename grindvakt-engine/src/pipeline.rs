//! Per-packet policy resolution.
//!
//! Every packet runs the same sequence: DNS fast path, connection
//! resolution, static rule matching, interactive escalation when nothing
//! matched, and finally the verdict. All failure modes short of a broken
//! kernel queue resolve to a safe verdict here; nothing on this path can
//! halt the pipeline.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tracing::{debug, error, warn};

use grindvakt_core::{Connection, Verdict};
use grindvakt_dns::DnsTracker;
use grindvakt_intercept::Packet;
use grindvakt_rules::{Action, Duration, Rule, RuleStore};
use grindvakt_telemetry::{EventLogger, MetricsRecorder};
use grindvakt_ui::UiClient;

/// Resolution seam: maps a raw packet to a connection record, or nothing
/// when the packet is unparseable or not locally owned.
pub trait Resolver: Send + Sync {
    fn resolve(&self, packet: &[u8]) -> Option<Connection>;
}

/// Escalation seam: asks the interactive front-end to decide a connection
/// no static rule matched. The second element reports whether the
/// front-end was actually reached.
pub trait Prompter: Send + Sync {
    fn ask(&self, con: &Connection) -> (Rule, bool);
}

impl Prompter for UiClient {
    fn ask(&self, con: &Connection) -> (Rule, bool) {
        UiClient::ask(self, con)
    }
}

/// Production resolver backed by the socket tables and `/proc`, with DNS
/// hostname annotation.
pub struct SystemResolver {
    dns: Arc<DnsTracker>,
}

impl SystemResolver {
    pub fn new(dns: Arc<DnsTracker>) -> Self {
        Self { dns }
    }
}

impl Resolver for SystemResolver {
    fn resolve(&self, packet: &[u8]) -> Option<Connection> {
        grindvakt_resolver::resolve(packet, &self.dns)
    }
}

/// Everything a worker needs to turn one packet into one verdict.
///
/// Constructed once at startup and shared by reference across the worker
/// pool; there is no other daemon-wide state.
pub struct Pipeline {
    rules: Arc<RuleStore>,
    stats: Arc<MetricsRecorder>,
    dns: Arc<DnsTracker>,
    resolver: Arc<dyn Resolver>,
    prompter: Arc<dyn Prompter>,
}

impl Pipeline {
    pub fn new(
        rules: Arc<RuleStore>,
        stats: Arc<MetricsRecorder>,
        dns: Arc<DnsTracker>,
        resolver: Arc<dyn Resolver>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            rules,
            stats,
            dns,
            resolver,
            prompter,
        }
    }

    /// Decide one packet. The packet is consumed: exactly one verdict is
    /// rendered on every path out of this function.
    pub fn handle(&self, packet: Packet) {
        // DNS responses are observed, never gated.
        if self.dns.track_answers(packet.data()) {
            self.stats.on_dns_response();
            finish(packet, Verdict::Accept);
            return;
        }

        // Unresolvable packets are not ours to police.
        let Some(con) = self.resolver.resolve(packet.data()) else {
            self.stats.on_ignored();
            finish(packet, Verdict::Accept);
            return;
        };

        let (rule, missed) = match self.rules.find_first_match(&con) {
            Some(rule) => (rule, false),
            None => (self.escalate(&con), true),
        };

        self.stats.on_connection(rule.action == Action::Allow, missed);
        self.execute(packet, &con, &rule);
    }

    /// Ask the front-end and apply the persistence tier of its answer.
    ///
    /// A fallback rule from an unreachable front-end is authoritative for
    /// this one decision but never enters the store, whatever its
    /// duration says.
    fn escalate(&self, con: &Connection) -> Rule {
        let (rule, reachable) = self.prompter.ask(con);
        if reachable {
            match rule.duration {
                Duration::Once => {}
                Duration::UntilRestart => self.remember(&rule, false),
                Duration::Always => self.remember(&rule, true),
            }
        }
        rule
    }

    fn remember(&self, rule: &Rule, persist: bool) {
        match self.rules.add(rule.clone(), persist) {
            Ok(()) => {
                let verb = if persist { "saved" } else { "added" };
                EventLogger::log_event(
                    "rule_decided",
                    vec![
                        KeyValue::new("verb", verb),
                        KeyValue::new("rule", rule.name.clone()),
                        KeyValue::new("action", rule.action.as_str()),
                        KeyValue::new("operator", rule.operator.to_string()),
                    ],
                );
            }
            Err(e) => {
                // The decision still stands on the returned rule's action.
                error!(
                    rule = %rule.name,
                    action = %rule.action,
                    error = %e,
                    "failed to store decided rule"
                );
            }
        }
    }

    /// Verdict execution: render the decision and account for it.
    fn execute(&self, packet: Packet, con: &Connection, rule: &Rule) {
        let verdict = match rule.action {
            Action::Allow => Verdict::Accept,
            Action::Deny => Verdict::Drop,
        };

        match verdict {
            Verdict::Accept => debug!(
                process = con.process_path(),
                dest = %con.to(),
                port = con.dst_port,
                rule = %rule.name,
                "connection allowed"
            ),
            Verdict::Drop => warn!(
                process = con.process_path(),
                dest = %con.to(),
                port = con.dst_port,
                rule = %rule.name,
                "connection denied"
            ),
        }

        finish(packet, verdict);
    }
}

fn finish(packet: Packet, verdict: Verdict) {
    if let Err(e) = packet.verdict(verdict) {
        error!(error = %e, "failed to deliver verdict");
    }
}
