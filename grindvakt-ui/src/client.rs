//! The front-end client itself.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use grindvakt_core::Connection;
use grindvakt_rules::{Action, Duration, Operator, Rule};

use crate::wire::{read_frame, write_frame};
use crate::UiError;

/// Name of the rule applied when the front-end cannot be reached.
const FALLBACK_RULE_NAME: &str = "frontend-offline";

/// Where the front-end listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketLocator {
    Unix(PathBuf),
    Tcp(String),
}

impl FromStr for SocketLocator {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.starts_with('/') {
                return Ok(SocketLocator::Unix(PathBuf::from(path)));
            }
        }
        if let Some(addr) = s.strip_prefix("tcp://") {
            if addr.contains(':') {
                return Ok(SocketLocator::Tcp(addr.to_string()));
            }
        }
        Err(UiError::BadLocator(s.to_string()))
    }
}

enum Stream {
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Stream::Unix(s) => s.read(buf),
            Stream::Tcp(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Stream::Unix(s) => s.write(buf),
            Stream::Tcp(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Stream::Unix(s) => s.flush(),
            Stream::Tcp(s) => s.flush(),
        }
    }
}

/// Blocking client for the decision front-end.
///
/// One connection per query keeps the client stateless across front-end
/// restarts: reachability is probed implicitly by every escalation.
pub struct UiClient {
    locator: SocketLocator,
    fallback: Rule,
}

impl UiClient {
    /// Build a client for `socket`, answering with `fallback_action` when
    /// the front-end is unreachable.
    pub fn new(socket: &str, fallback_action: Action) -> Result<Self, UiError> {
        let locator = socket.parse()?;
        let fallback = Rule::new(
            FALLBACK_RULE_NAME,
            fallback_action,
            Duration::Once,
            Operator::any(),
        );
        Ok(Self { locator, fallback })
    }

    /// Ask the front-end to decide `con`.
    ///
    /// Returns the decided rule and whether the front-end was actually
    /// reached. There is no timeout on a connected round-trip: a prompt
    /// waits for its human. An unreachable front-end answers immediately
    /// with the fallback rule.
    pub fn ask(&self, con: &Connection) -> (Rule, bool) {
        match self.query(con) {
            Ok(rule) => (rule, true),
            Err(e) => {
                debug!(error = %e, "front-end unreachable, using fallback");
                (self.fallback.clone(), false)
            }
        }
    }

    fn query(&self, con: &Connection) -> Result<Rule, UiError> {
        let mut stream = self.connect()?;
        let request = serde_json::to_vec(con)?;
        write_frame(&mut stream, &request)?;

        let reply = read_frame(&mut stream)?;
        Ok(serde_json::from_slice(&reply)?)
    }

    fn connect(&self) -> Result<Stream, UiError> {
        match &self.locator {
            SocketLocator::Unix(path) => UnixStream::connect(path)
                .map(Stream::Unix)
                .map_err(UiError::Connect),
            SocketLocator::Tcp(addr) => TcpStream::connect(addr.as_str())
                .map(Stream::Tcp)
                .map_err(UiError::Connect),
        }
    }
}
