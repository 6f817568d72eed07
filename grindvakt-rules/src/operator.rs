//! Rule predicates.
//!
//! An operator names the connection attribute it inspects and the value it
//! compares against. The same description is used for matching and for the
//! human-readable form shown when a new rule is confirmed.

use std::fmt;

use serde::{Deserialize, Serialize};

use grindvakt_core::Connection;

/// Connection attribute an operator inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// Matches every connection.
    #[serde(rename = "true")]
    Any,
    #[serde(rename = "process.path")]
    ProcessPath,
    #[serde(rename = "process.command")]
    ProcessCommand,
    #[serde(rename = "user.id")]
    UserId,
    #[serde(rename = "dest.ip")]
    DestIp,
    #[serde(rename = "dest.host")]
    DestHost,
    #[serde(rename = "dest.port")]
    DestPort,
}

impl Operand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operand::Any => "true",
            Operand::ProcessPath => "process.path",
            Operand::ProcessCommand => "process.command",
            Operand::UserId => "user.id",
            Operand::DestIp => "dest.ip",
            Operand::DestHost => "dest.host",
            Operand::DestPort => "dest.port",
        }
    }
}

/// A named predicate over a connection's attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub operand: Operand,
    #[serde(default)]
    pub data: String,
}

impl Operator {
    pub fn new(operand: Operand, data: impl Into<String>) -> Self {
        Self {
            operand,
            data: data.into(),
        }
    }

    /// Operator matching every connection.
    pub fn any() -> Self {
        Self::new(Operand::Any, "")
    }

    /// Whether the predicate is satisfied by the connection.
    ///
    /// Process and user predicates only match connections whose owning
    /// process was resolved.
    pub fn matches(&self, con: &Connection) -> bool {
        match self.operand {
            Operand::Any => true,
            Operand::ProcessPath => con
                .process
                .as_ref()
                .is_some_and(|p| p.path == self.data),
            Operand::ProcessCommand => con
                .process
                .as_ref()
                .is_some_and(|p| p.cmdline == self.data),
            Operand::UserId => con
                .process
                .as_ref()
                .is_some_and(|p| p.uid.to_string() == self.data),
            Operand::DestIp => con.dst_ip.to_string() == self.data,
            Operand::DestHost => con.dst_host.as_deref() == Some(self.data.as_str()),
            Operand::DestPort => con.dst_port.to_string() == self.data,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::Any => f.write_str("any connection"),
            _ => write!(f, "{} == {}", self.operand.as_str(), self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grindvakt_core::{Process, Protocol};

    fn curl_connection() -> Connection {
        Connection {
            protocol: Protocol::Tcp,
            src_ip: "10.0.0.5".parse().unwrap(),
            src_port: 45000,
            dst_ip: "93.184.216.34".parse().unwrap(),
            dst_port: 443,
            dst_host: Some("example.com".into()),
            process: Some(Process {
                pid: 4321,
                uid: 1000,
                path: "/usr/bin/curl".into(),
                cmdline: "/usr/bin/curl https://example.com".into(),
            }),
        }
    }

    #[test]
    fn any_matches_everything() {
        assert!(Operator::any().matches(&curl_connection()));
    }

    #[test]
    fn process_path_requires_exact_path() {
        let con = curl_connection();
        assert!(Operator::new(Operand::ProcessPath, "/usr/bin/curl").matches(&con));
        assert!(!Operator::new(Operand::ProcessPath, "/usr/bin/wget").matches(&con));
    }

    #[test]
    fn process_predicates_need_a_resolved_process() {
        let mut con = curl_connection();
        con.process = None;
        assert!(!Operator::new(Operand::ProcessPath, "/usr/bin/curl").matches(&con));
        assert!(!Operator::new(Operand::UserId, "1000").matches(&con));
        // Destination predicates still apply.
        assert!(Operator::new(Operand::DestPort, "443").matches(&con));
    }

    #[test]
    fn destination_predicates() {
        let con = curl_connection();
        assert!(Operator::new(Operand::DestIp, "93.184.216.34").matches(&con));
        assert!(Operator::new(Operand::DestHost, "example.com").matches(&con));
        assert!(!Operator::new(Operand::DestHost, "example.org").matches(&con));
        assert!(!Operator::new(Operand::DestPort, "80").matches(&con));
    }

    #[test]
    fn renders_a_stable_description() {
        assert_eq!(
            Operator::new(Operand::ProcessPath, "/usr/bin/curl").to_string(),
            "process.path == /usr/bin/curl"
        );
        assert_eq!(Operator::any().to_string(), "any connection");
    }

    #[test]
    fn operand_names_round_trip_through_serde() {
        for operand in [
            Operand::Any,
            Operand::ProcessPath,
            Operand::ProcessCommand,
            Operand::UserId,
            Operand::DestIp,
            Operand::DestHost,
            Operand::DestPort,
        ] {
            let json = serde_json::to_string(&operand).unwrap();
            assert_eq!(json, format!("\"{}\"", operand.as_str()));
            let back: Operand = serde_json::from_str(&json).unwrap();
            assert_eq!(back, operand);
        }
    }
}
