//! Confidentiality envelopes of protected 802.11 data frames.
//!
//! A protected body is offered to WEP, WPA (TKIP) and WPA2 (CCMP) in that
//! order. Each scheme recognises its own IV header by signature and either
//! claims the body or passes. WEP is decrypted in-crate (RC4 plus CRC-32 ICV)
//! when a key is configured; TKIP and CCMP plaintext comes from a
//! caller-supplied [`TemporalKeyDecryptor`](crate::TemporalKeyDecryptor).
//! Decrypted payloads live in their own buffer, owned by the `*Data` node.

mod chain;
mod icv;
pub mod layout;
mod rc4;
mod wep;
mod wpa;

pub use chain::Scheme;
pub use icv::crc32;
pub use rc4::Rc4;
pub use wep::WepHeader;
pub use wpa::{Wpa2Header, WpaHeader};

pub(crate) use chain::decode_protected;
