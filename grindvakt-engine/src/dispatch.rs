//! The worker pool.
//!
//! A fixed number of workers block on a rendezvous channel: the producer's
//! send completes only when a worker is ready to take the packet, so no
//! packet is ever buffered in-process. When every worker is occupied the
//! producer stalls and traffic backs up in the kernel's own bounded queue.

use std::sync::Arc;

use crossbeam_channel::{bounded, Sender};
use tokio::task::JoinHandle;
use tracing::debug;

use grindvakt_intercept::Packet;

use crate::Pipeline;

pub struct Dispatcher {
    intake: Sender<Packet>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Start `count` workers over a shared zero-capacity intake.
    ///
    /// Workers run on blocking threads: a worker may sit inside a
    /// front-end prompt for minutes, and must not tie up the async
    /// runtime while it does.
    pub fn start(count: usize, pipeline: Arc<Pipeline>) -> Self {
        debug!(count, "starting workers");
        let (intake, outlet) = bounded::<Packet>(0);

        let workers = (0..count)
            .map(|id| {
                let outlet = outlet.clone();
                let pipeline = Arc::clone(&pipeline);
                tokio::task::spawn_blocking(move || {
                    debug!(worker = id, "worker started");
                    while let Ok(packet) = outlet.recv() {
                        pipeline.handle(packet);
                    }
                    debug!(worker = id, "worker stopped");
                })
            })
            .collect();

        Self { intake, workers }
    }

    /// Producer-side handle onto the intake. A send blocks until a worker
    /// is free.
    pub fn intake(&self) -> Sender<Packet> {
        self.intake.clone()
    }

    /// Close the intake and wait for in-flight packets to finish.
    pub async fn shutdown(self) {
        drop(self.intake);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use crossbeam_channel::TrySendError;
    use std::net::IpAddr;
    use std::sync::Arc;

    use grindvakt_core::{Connection, Protocol, Verdict};
    use grindvakt_dns::DnsTracker;
    use grindvakt_rules::{Action, Duration, Operator, Rule, RuleStore};
    use grindvakt_telemetry::MetricsRecorder;

    struct FixedResolver(Connection);

    impl crate::Resolver for FixedResolver {
        fn resolve(&self, _packet: &[u8]) -> Option<Connection> {
            Some(self.0.clone())
        }
    }

    /// Prompter that parks the worker until the test releases it.
    struct GatedPrompter {
        gate: crossbeam_channel::Receiver<()>,
    }

    impl crate::Prompter for GatedPrompter {
        fn ask(&self, _con: &Connection) -> (Rule, bool) {
            self.gate.recv().unwrap();
            (
                Rule::new("gated", Action::Allow, Duration::Once, Operator::any()),
                true,
            )
        }
    }

    fn connection() -> Connection {
        Connection {
            protocol: Protocol::Tcp,
            src_ip: "10.0.0.5".parse::<IpAddr>().unwrap(),
            src_port: 45000,
            dst_ip: "93.184.216.34".parse::<IpAddr>().unwrap(),
            dst_port: 443,
            dst_host: None,
            process: None,
        }
    }

    fn verdict_packet(
        tx: crossbeam_channel::Sender<Verdict>,
    ) -> grindvakt_intercept::Packet {
        grindvakt_intercept::Packet::new(
            Bytes::from_static(b"frame"),
            Box::new(move |v| {
                tx.send(v).unwrap();
                Ok(())
            }),
        )
    }

    #[tokio::test]
    async fn occupied_workers_exert_backpressure() {
        let dir = tempfile::tempdir().unwrap();
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let pipeline = Arc::new(Pipeline::new(
            Arc::new(RuleStore::open(dir.path()).unwrap()),
            Arc::new(MetricsRecorder::new()),
            Arc::new(DnsTracker::new()),
            Arc::new(FixedResolver(connection())),
            Arc::new(GatedPrompter { gate: gate_rx }),
        ));

        let dispatcher = Dispatcher::start(1, pipeline);
        let intake = dispatcher.intake();
        let (verdict_tx, verdict_rx) = crossbeam_channel::unbounded();

        // The rendezvous send completes only once the worker takes the
        // packet; the worker then parks inside the prompt.
        intake.send(verdict_packet(verdict_tx.clone())).unwrap();

        // With the only worker occupied there is nobody to hand off to.
        match intake.try_send(verdict_packet(verdict_tx)) {
            Err(TrySendError::Full(_)) => {}
            other => panic!("expected a full intake, got {other:?}"),
        }

        gate_tx.send(()).unwrap();
        assert_eq!(
            verdict_rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap(),
            Verdict::Accept
        );
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn workers_drain_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Arc::new(Pipeline::new(
            Arc::new(RuleStore::open(dir.path()).unwrap()),
            Arc::new(MetricsRecorder::new()),
            Arc::new(DnsTracker::new()),
            Arc::new(FixedResolver(connection())),
            Arc::new(GatedPrompter {
                gate: crossbeam_channel::unbounded().1,
            }),
        ));

        let dispatcher = Dispatcher::start(4, pipeline);
        dispatcher.shutdown().await;
    }
}
