//! Observed DNS answer tracking.

use std::collections::HashMap;
use std::net::IpAddr;

use etherparse::{Ipv4HeaderSlice, UdpHeaderSlice};
use parking_lot::RwLock;
use tracing::trace;

use crate::parser::{self, AnswerData, DnsResponse};

const DNS_PORT: u16 = 53;
const IP_PROTO_UDP: u8 = 17;

/// Table of addresses observed in DNS answers and the hostname that
/// produced them.
///
/// Shared by the packet workers: the fast path records answers, the
/// resolver annotates outbound connections with the recorded hostname.
#[derive(Debug, Default)]
pub struct DnsTracker {
    hosts: RwLock<HashMap<IpAddr, String>>,
}

impl DnsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The DNS fast path: returns `true` when `packet` (an IPv4 frame as
    /// delivered by the kernel queue) is purely an observed DNS answer,
    /// after recording the associations it carries. Anything else returns
    /// `false` and is left for full connection resolution.
    pub fn track_answers(&self, packet: &[u8]) -> bool {
        let Some(payload) = udp_dns_payload(packet) else {
            return false;
        };
        match parser::parse_response(payload) {
            Ok(response) => {
                self.record(&response);
                true
            }
            Err(_) => false,
        }
    }

    /// Hostname previously observed resolving to `ip`.
    pub fn lookup(&self, ip: &IpAddr) -> Option<String> {
        self.hosts.read().get(ip).cloned()
    }

    pub fn len(&self) -> usize {
        self.hosts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.read().is_empty()
    }

    fn record(&self, response: &DnsResponse) {
        let mut hosts = self.hosts.write();
        for answer in &response.answers {
            // Addresses reached through a CNAME chain are attributed to the
            // queried name; that is the name the user's application asked for.
            let host = response
                .query
                .clone()
                .unwrap_or_else(|| answer.name.clone());
            match &answer.data {
                AnswerData::A(ip) => {
                    trace!(host = %host, ip = %ip, "tracked DNS answer");
                    hosts.insert(IpAddr::V4(*ip), host);
                }
                AnswerData::Aaaa(ip) => {
                    trace!(host = %host, ip = %ip, "tracked DNS answer");
                    hosts.insert(IpAddr::V6(*ip), host);
                }
                AnswerData::Cname(_) | AnswerData::Other => {}
            }
        }
    }
}

/// Payload of an IPv4/UDP packet sent from the DNS port, when that is what
/// the frame is.
fn udp_dns_payload(packet: &[u8]) -> Option<&[u8]> {
    let ip = Ipv4HeaderSlice::from_slice(packet).ok()?;
    if ip.protocol() != IP_PROTO_UDP {
        return None;
    }
    let transport = packet.get(ip.slice().len()..)?;
    let udp = UdpHeaderSlice::from_slice(transport).ok()?;
    if udp.source_port() != DNS_PORT {
        return None;
    }
    transport.get(8..)
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherparse::PacketBuilder;
    use std::net::Ipv4Addr;

    fn encode_name(buf: &mut Vec<u8>, name: &str) {
        for label in name.split('.') {
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
        buf.push(0);
    }

    fn dns_answer_payload(query: &str, ip: Ipv4Addr) -> Vec<u8> {
        let mut buf = vec![
            0x12, 0x34, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
        ];
        encode_name(&mut buf, query);
        buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        encode_name(&mut buf, query);
        buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x3c]);
        buf.extend_from_slice(&[0x00, 0x04]);
        buf.extend_from_slice(&ip.octets());
        buf
    }

    fn udp_frame(sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
        let builder =
            PacketBuilder::ipv4([8, 8, 8, 8], [10, 0, 0, 5], 64).udp(sport, dport);
        let mut frame = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, payload).unwrap();
        frame
    }

    #[test]
    fn records_answers_and_serves_lookups() {
        let tracker = DnsTracker::new();
        let ip: Ipv4Addr = "93.184.216.34".parse().unwrap();
        let frame = udp_frame(53, 40000, &dns_answer_payload("example.com", ip));

        assert!(tracker.track_answers(&frame));
        assert_eq!(
            tracker.lookup(&IpAddr::V4(ip)).as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn ignores_udp_from_other_ports() {
        let tracker = DnsTracker::new();
        let ip: Ipv4Addr = "93.184.216.34".parse().unwrap();
        let frame = udp_frame(5353, 40000, &dns_answer_payload("example.com", ip));

        assert!(!tracker.track_answers(&frame));
        assert!(tracker.is_empty());
    }

    #[test]
    fn ignores_dns_queries() {
        let tracker = DnsTracker::new();
        let mut payload =
            dns_answer_payload("example.com", "93.184.216.34".parse().unwrap());
        payload[2] = 0x01; // QR bit cleared: a query
        let frame = udp_frame(53, 40000, &payload);

        assert!(!tracker.track_answers(&frame));
    }

    #[test]
    fn ignores_non_udp_traffic() {
        let tracker = DnsTracker::new();
        let builder =
            PacketBuilder::ipv4([10, 0, 0, 5], [93, 184, 216, 34], 64).tcp(45000, 443, 0, 65535);
        let mut frame = Vec::with_capacity(builder.size(0));
        builder.write(&mut frame, &[]).unwrap();

        assert!(!tracker.track_answers(&frame));
    }
}
