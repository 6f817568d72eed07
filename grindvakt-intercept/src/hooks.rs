//! Interception hook toggles.
//!
//! Each hook is one iptables rule routing a slice of traffic into the
//! netfilter queue (or rejecting marked packets). Toggles are idempotent:
//! enabling checks for the rule before inserting it, and disabling an
//! absent rule is not an error.

use std::process::Command;

use tracing::{debug, warn};

use crate::InterceptError;

/// Firewall mark carried by packets that must be rejected instead of
/// silently dropped.
pub const REJECT_MARK: u32 = 101285;

const IPTABLES: &str = "iptables";

/// Route DNS responses through the queue so answers can be observed.
pub fn queue_dns_responses(enable: bool, queue_num: u16) -> Result<(), InterceptError> {
    toggle(enable, &dns_rule(queue_num))
}

/// Route new outbound connections through the queue for a verdict.
pub fn queue_connections(enable: bool, queue_num: u16) -> Result<(), InterceptError> {
    toggle(enable, &connections_rule(queue_num))
}

/// Reject outbound packets carrying [`REJECT_MARK`].
pub fn reject_marked(enable: bool) -> Result<(), InterceptError> {
    toggle(enable, &reject_rule())
}

/// One iptables rule: its table, chain, and match specification.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HookRule {
    table: &'static str,
    chain: &'static str,
    spec: Vec<String>,
}

impl HookRule {
    fn command_args(&self, action: &str) -> Vec<String> {
        let mut args = vec![
            "-t".to_string(),
            self.table.to_string(),
            action.to_string(),
            self.chain.to_string(),
        ];
        args.extend(self.spec.iter().cloned());
        args
    }
}

fn dns_rule(queue_num: u16) -> HookRule {
    HookRule {
        table: "mangle",
        chain: "INPUT",
        spec: vec![
            "-p".into(),
            "udp".into(),
            "--sport".into(),
            "53".into(),
            "-j".into(),
            "NFQUEUE".into(),
            "--queue-num".into(),
            queue_num.to_string(),
            "--queue-bypass".into(),
        ],
    }
}

fn connections_rule(queue_num: u16) -> HookRule {
    HookRule {
        table: "mangle",
        chain: "OUTPUT",
        spec: vec![
            "-m".into(),
            "conntrack".into(),
            "--ctstate".into(),
            "NEW".into(),
            "-j".into(),
            "NFQUEUE".into(),
            "--queue-num".into(),
            queue_num.to_string(),
            "--queue-bypass".into(),
        ],
    }
}

fn reject_rule() -> HookRule {
    HookRule {
        table: "filter",
        chain: "OUTPUT",
        spec: vec![
            "-m".into(),
            "mark".into(),
            "--mark".into(),
            REJECT_MARK.to_string(),
            "-j".into(),
            "REJECT".into(),
        ],
    }
}

fn toggle(enable: bool, rule: &HookRule) -> Result<(), InterceptError> {
    if enable {
        // -C probes for the rule so re-enabling never stacks duplicates.
        if run(&rule.command_args("-C")).is_ok() {
            debug!(chain = rule.chain, "hook already installed");
            return Ok(());
        }
        run(&rule.command_args("-I"))
    } else {
        if let Err(e) = run(&rule.command_args("-D")) {
            warn!(chain = rule.chain, error = %e, "hook removal failed");
        }
        Ok(())
    }
}

fn run(args: &[String]) -> Result<(), InterceptError> {
    let command = format!("{} {}", IPTABLES, args.join(" "));
    let status = Command::new(IPTABLES)
        .args(args)
        .status()
        .map_err(|source| InterceptError::HookSpawn {
            command: command.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(InterceptError::HookFailed { command, status })
    }
}
