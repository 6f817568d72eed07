//! Kernel socket table (`/proc/net`) scanning.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use grindvakt_core::Protocol;

/// The columns we need from one socket table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SocketEntry {
    pub uid: u32,
    pub inode: u64,
}

/// Find the socket bound to the packet's local endpoint.
pub(crate) fn find_socket(
    protocol: Protocol,
    src_ip: IpAddr,
    src_port: u16,
) -> Option<SocketEntry> {
    let tables: &[&str] = match protocol {
        Protocol::Tcp => &["/proc/net/tcp", "/proc/net/tcp6"],
        Protocol::Udp => &["/proc/net/udp", "/proc/net/udp6"],
    };

    tables
        .iter()
        .filter_map(|table| fs::read_to_string(table).ok())
        .find_map(|content| scan(&content, src_ip, src_port))
}

/// Scan one socket table for a local-endpoint match.
///
/// Layout per row: `sl local rem st tx:rx tr:tm retrnsmt uid timeout inode`.
fn scan(content: &str, src_ip: IpAddr, src_port: u16) -> Option<SocketEntry> {
    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let Some((ip, port)) = parse_endpoint(fields[1]) else {
            continue;
        };
        if port != src_port || !local_matches(&ip, &src_ip) {
            continue;
        }
        let (Ok(uid), Ok(inode)) = (fields[7].parse(), fields[9].parse()) else {
            continue;
        };
        return Some(SocketEntry { uid, inode });
    }
    None
}

/// Decode a kernel `ADDR:PORT` hex endpoint. IPv4 addresses are one
/// little-endian dword; IPv6 addresses are four of them.
fn parse_endpoint(field: &str) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = field.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;

    match addr_hex.len() {
        8 => {
            let raw = u32::from_str_radix(addr_hex, 16).ok()?;
            Some((IpAddr::V4(Ipv4Addr::from(raw.swap_bytes())), port))
        }
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in addr_hex.as_bytes().chunks(8).enumerate() {
                let group = std::str::from_utf8(chunk).ok()?;
                let dword = u32::from_str_radix(group, 16).ok()?.swap_bytes();
                octets[i * 4..(i + 1) * 4].copy_from_slice(&dword.to_be_bytes());
            }
            Some((IpAddr::V6(Ipv6Addr::from(octets)), port))
        }
        _ => None,
    }
}

/// Whether a table entry's local address covers the packet's source:
/// exact match, wildcard bind, or a v4-mapped v6 socket carrying v4
/// traffic.
fn local_matches(entry: &IpAddr, src: &IpAddr) -> bool {
    if entry == src || entry.is_unspecified() {
        return true;
    }
    match (entry, src) {
        (IpAddr::V6(v6), IpAddr::V4(v4)) => {
            let octets = v6.octets();
            octets[..10] == [0; 10]
                && octets[10..12] == [0xff, 0xff]
                && octets[12..] == v4.octets()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCP_TABLE: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 34567 1 ffff0000 100 0 0 10 0
   1: 0500000A:AFC8 22D8B85D:01BB 01 00000000:00000000 00:00000000 00000000  1000        0 12345 1 ffff0000 20 4 30 10 -1
";

    const TCP6_TABLE: &str = "\
  sl  local_address                         rem_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0000000000000000FFFF00000500000A:AFC9 00000000000000000000000000000000:0000 0A 00000000:00000000 00:00000000 00000000  1001        0 77777 1 ffff0000 100 0 0 10 0
";

    #[test]
    fn finds_a_connected_v4_socket() {
        let entry = scan(TCP_TABLE, "10.0.0.5".parse().unwrap(), 45000).unwrap();
        assert_eq!(entry, SocketEntry { uid: 1000, inode: 12345 });
    }

    #[test]
    fn wildcard_binds_match_any_source() {
        let entry = scan(TCP_TABLE, "192.168.1.20".parse().unwrap(), 8080).unwrap();
        assert_eq!(entry.inode, 34567);
    }

    #[test]
    fn unknown_ports_find_nothing() {
        assert!(scan(TCP_TABLE, "10.0.0.5".parse().unwrap(), 9999).is_none());
    }

    #[test]
    fn v4_mapped_v6_sockets_carry_v4_traffic() {
        let entry = scan(TCP6_TABLE, "10.0.0.5".parse().unwrap(), 45001).unwrap();
        assert_eq!(entry, SocketEntry { uid: 1001, inode: 77777 });
    }

    #[test]
    fn endpoint_decoding() {
        let (ip, port) = parse_endpoint("0100007F:0035").unwrap();
        assert_eq!(ip, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(port, 53);
        assert!(parse_endpoint("xyz").is_none());
    }
}
