//! Link-layer decoding: Ethernet II and Linux cooked capture (SLL).
//!
//! Both headers are fixed-size and end with an ethertype, which alone selects
//! the next decoder (IPv4, ARP, or opaque data). Ethernet parsing is
//! delegated to `etherparse`; the SLL header is read through `layout`.

pub mod layout;
mod parser;

pub use parser::{EthernetHeader, LinuxSllHeader};
pub(crate) use parser::{decode_ethernet, decode_linux_sll};
