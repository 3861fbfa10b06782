//! IEEE 802.2 LLC and SNAP, the encapsulation carried by 802.11 data frames.
//!
//! Only the SNAP path is followed: an LLC header with both SAPs set to 0xAA
//! and UI control leads to SNAP, and a SNAP header with the zero OUI hands
//! its ethertype to the same dispatch Ethernet uses.

pub mod layout;
mod parser;

pub use parser::{LlcHeader, SnapHeader};
pub(crate) use parser::{decode_llc, decode_snap};
