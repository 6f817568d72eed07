//! The daemon context and its run loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use grindvakt_config::GrindvaktConfig;
use grindvakt_dns::DnsTracker;
use grindvakt_intercept::PacketQueue;
use grindvakt_rules::{Action, RuleStore};
use grindvakt_telemetry::MetricsRecorder;
use grindvakt_ui::UiClient;

use crate::{lifecycle, DaemonError, Dispatcher, Pipeline, SystemResolver};

// Producer backoff while the kernel queue is empty.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The daemon: configuration plus every shared component, constructed once
/// at startup and handed by reference to the dispatcher and lifecycle
/// tasks.
pub struct Daemon {
    config: GrindvaktConfig,
    pipeline: Arc<Pipeline>,
    stats: Arc<MetricsRecorder>,
}

impl Daemon {
    /// Build the daemon context: load the rule store and wire up the DNS
    /// tracker, resolver, and front-end client. Any failure here is fatal;
    /// no kernel state has been touched yet.
    pub fn new(config: GrindvaktConfig) -> Result<Self, DaemonError> {
        let rules_path = config.rules.expanded_path();
        info!(path = %rules_path.display(), "loading rules");
        let rules = Arc::new(RuleStore::open(rules_path)?);
        info!(count = rules.len(), "rule store ready");

        let fallback = if config.ui.fallback_action == "deny" {
            Action::Deny
        } else {
            Action::Allow
        };
        let ui = UiClient::new(&config.ui.socket, fallback)?;

        let stats = Arc::new(MetricsRecorder::new());
        let dns = Arc::new(DnsTracker::new());
        let pipeline = Arc::new(Pipeline::new(
            rules,
            Arc::clone(&stats),
            Arc::clone(&dns),
            Arc::new(SystemResolver::new(dns)),
            Arc::new(ui),
        ));

        Ok(Self {
            config,
            pipeline,
            stats,
        })
    }

    pub fn stats(&self) -> &MetricsRecorder {
        &self.stats
    }

    /// Run until a termination signal ends the process.
    ///
    /// Startup order matters: queue first, then hooks, then workers, then
    /// the producer loop. Hooks only go live once the queue exists, and
    /// any hook failure retracts the ones before it.
    pub async fn run(self) -> Result<(), DaemonError> {
        let queue = Arc::new(PacketQueue::open(
            self.config.queue.num,
            self.config.queue.depth,
            self.config.queue.copy_size,
        )?);
        lifecycle::install_hooks(self.config.queue.num)?;

        let dispatcher = Dispatcher::start(self.config.daemon.workers, Arc::clone(&self.pipeline));
        let intake = dispatcher.intake();

        // Dedicated signal listener: teardown happens here, not in main.
        let signal_queue = Arc::clone(&queue);
        tokio::spawn(async move {
            match lifecycle::wait_for_signal().await {
                Ok(sig) => {
                    info!(signal = sig, "termination signal received");
                    lifecycle::teardown(&signal_queue);
                    std::process::exit(0);
                }
                Err(e) => error!(error = %e, "signal listener failed"),
            }
        });

        info!(
            queue = self.config.queue.num,
            workers = self.config.daemon.workers,
            "intercepting connections"
        );

        // Producer: the only reader of the kernel queue. The rendezvous
        // send stalls while every worker is busy, pushing backpressure
        // into the kernel's own bounded queue.
        let producer_queue = Arc::clone(&queue);
        let producer = tokio::task::spawn_blocking(move || -> Result<(), DaemonError> {
            loop {
                match producer_queue.poll() {
                    Ok(Some(packet)) => {
                        if intake.send(packet).is_err() {
                            return Ok(());
                        }
                    }
                    Ok(None) => std::thread::sleep(POLL_INTERVAL),
                    Err(e) => return Err(e.into()),
                }
            }
        });

        let result = producer.await?;
        dispatcher.shutdown().await;

        if result.is_err() {
            // The queue reader died; do not leave traffic routed into a
            // queue nobody consumes.
            lifecycle::teardown(&queue);
        }
        result
    }
}
