//! Hook installation, signal handling, and teardown sequencing.
//!
//! The hooks are the dangerous part of the daemon: once traffic is routed
//! into the queue, the host depends on this process consuming it. Startup
//! therefore never leaves hooks partially installed, and shutdown retracts
//! every hook before the process exits.

use opentelemetry::KeyValue;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use grindvakt_intercept::{hooks, PacketQueue};
use grindvakt_telemetry::EventLogger;

use crate::DaemonError;

/// Install the interception hooks in startup order.
///
/// A failure retracts whatever was already installed before the error
/// propagates, so a partially hooked kernel never survives a failed start.
pub fn install_hooks(queue_num: u16) -> Result<(), DaemonError> {
    hooks::queue_dns_responses(true, queue_num)?;

    if let Err(e) = hooks::queue_connections(true, queue_num) {
        let _ = hooks::queue_dns_responses(false, queue_num);
        return Err(e.into());
    }

    if let Err(e) = hooks::reject_marked(true) {
        let _ = hooks::queue_connections(false, queue_num);
        let _ = hooks::queue_dns_responses(false, queue_num);
        return Err(e.into());
    }

    info!(queue = queue_num, "interception hooks installed");
    Ok(())
}

/// One-shot, best-effort teardown.
///
/// Retracts connection queueing, DNS-response queueing, and marked
/// rejection, in that order, then unbinds the queue. Does not wait for
/// in-flight workers; packets already dequeued may go unverdicted at
/// exit.
pub fn teardown(queue: &PacketQueue) {
    let num = queue.num();
    info!(queue = num, "retracting interception hooks");

    let _ = hooks::queue_connections(false, num);
    let _ = hooks::queue_dns_responses(false, num);
    let _ = hooks::reject_marked(false);
    queue.close();

    EventLogger::log_event(
        "teardown_complete",
        vec![KeyValue::new("queue", num as i64)],
    );
}

/// Block until one of the termination signals arrives.
///
/// Hang-up, interrupt, terminate, and quit all mean the same thing here:
/// tear down and exit.
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    let mut hangup = signal(SignalKind::hangup())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = hangup.recv() => Ok("SIGHUP"),
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
        _ = quit.recv() => Ok("SIGQUIT"),
    }
}
