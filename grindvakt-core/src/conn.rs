//! Connection records resolved from intercepted packets.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Transport protocol of a resolved connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Udp => f.write_str("udp"),
        }
    }
}

/// Identity of the process that owns a connection's socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub pid: u32,
    pub uid: u32,
    /// Absolute path of the executable.
    pub path: String,
    /// Full command line, arguments joined with spaces.
    pub cmdline: String,
}

/// Immutable record of one intercepted connection attempt.
///
/// Built once by the resolver and never mutated afterwards; it lives for the
/// duration of a single verdict decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub protocol: Protocol,
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    /// Hostname previously observed resolving to `dst_ip`, when known.
    pub dst_host: Option<String>,
    /// Owning process, when the socket could be mapped back to one.
    pub process: Option<Process>,
}

impl Connection {
    /// Destination as shown to humans: the hostname when one was observed,
    /// the address otherwise.
    pub fn to(&self) -> String {
        match &self.dst_host {
            Some(host) => host.clone(),
            None => self.dst_ip.to_string(),
        }
    }

    pub fn process_path(&self) -> &str {
        self.process.as_ref().map_or("unknown", |p| p.path.as_str())
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}:{}",
            self.protocol,
            self.process_path(),
            self.to(),
            self.dst_port
        )
    }
}
