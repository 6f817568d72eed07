//! Transport header extraction from intercepted frames.

use std::net::IpAddr;

use etherparse::{Ipv4HeaderSlice, TcpHeaderSlice, UdpHeaderSlice};

use grindvakt_core::Protocol;

const IP_PROTO_TCP: u8 = 6;
const IP_PROTO_UDP: u8 = 17;

/// The 5-tuple a packet carries, before any socket or process lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PacketMeta {
    pub protocol: Protocol,
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

/// Slice the IPv4 and transport headers out of a queued frame.
pub(crate) fn parse_headers(packet: &[u8]) -> Option<PacketMeta> {
    let ip = Ipv4HeaderSlice::from_slice(packet).ok()?;
    let transport = packet.get(ip.slice().len()..)?;

    let (protocol, src_port, dst_port) = match ip.protocol() {
        IP_PROTO_TCP => {
            let tcp = TcpHeaderSlice::from_slice(transport).ok()?;
            (Protocol::Tcp, tcp.source_port(), tcp.destination_port())
        }
        IP_PROTO_UDP => {
            let udp = UdpHeaderSlice::from_slice(transport).ok()?;
            (Protocol::Udp, udp.source_port(), udp.destination_port())
        }
        _ => return None,
    };

    Some(PacketMeta {
        protocol,
        src_ip: IpAddr::V4(ip.source_addr()),
        src_port,
        dst_ip: IpAddr::V4(ip.destination_addr()),
        dst_port,
    })
}
