//! # Grindvakt Connection Resolution
//!
//! Maps a raw intercepted packet to a structured [`Connection`] record:
//! transport headers give the 5-tuple, the kernel socket tables give the
//! owning socket, and `/proc` gives the process identity behind it.
//!
//! Resolution is deliberately infallible from the pipeline's point of
//! view: anything that cannot be resolved returns `None` and the caller
//! treats the packet as not relevant for policy.

mod packet;
mod process;
mod socket_table;

use grindvakt_core::Connection;
use grindvakt_dns::DnsTracker;
use tracing::trace;

/// Resolve an intercepted IPv4 packet to a connection record.
///
/// Returns `None` for packets that are unparseable or carry no TCP/UDP
/// payload, and for endpoints the socket tables do not know (traffic that
/// is not locally originated). A connection whose socket is found but
/// whose process has vanished is still returned, with `process` unset.
pub fn resolve(packet: &[u8], dns: &DnsTracker) -> Option<Connection> {
    let meta = packet::parse_headers(packet)?;
    let entry = socket_table::find_socket(meta.protocol, meta.src_ip, meta.src_port)?;
    let process = process::by_inode(entry.inode, entry.uid);
    if process.is_none() {
        trace!(
            inode = entry.inode,
            port = meta.src_port,
            "socket found but no owning process"
        );
    }

    Some(Connection {
        protocol: meta.protocol,
        src_ip: meta.src_ip,
        src_port: meta.src_port,
        dst_ip: meta.dst_ip,
        dst_port: meta.dst_port,
        dst_host: dns.lookup(&meta.dst_ip),
        process,
    })
}
