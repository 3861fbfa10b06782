//! Network and transport decoding: IPv4, ARP, TCP, UDP and ICMP.
//!
//! IPv4 bounds its payload by the declared total length and dispatches on
//! the protocol number. ICMP destination-unreachable messages quote the
//! offending datagram's IPv4 header; that quote is decoded by a lenient IPv4
//! variant which only follows UDP and never trusts the quoted total length.
//! TCP, UDP and ARP hand their payload to opaque data unconditionally.

mod arp;
mod icmp;
mod ipv4;
pub mod layout;
mod transport;

pub use arp::ArpHeader;
pub use icmp::IcmpHeader;
pub use ipv4::Ipv4Header;
pub use transport::{TcpHeader, UdpHeader};

pub(crate) use arp::decode_arp;
pub(crate) use icmp::decode_icmp;
pub(crate) use ipv4::{decode_ipv4, decode_quoted_ipv4};
pub(crate) use transport::{decode_tcp, decode_udp};
