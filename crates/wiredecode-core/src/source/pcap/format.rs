//! On-disk format constants and timestamp arithmetic for pcap and pcapng.

use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use crate::decoder::LinkType;

pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];
pub const READER_BUFFER_SIZE: usize = 64 * 1024;

// LINKTYPE_* values from the tcpdump registry.
pub const LINKTYPE_ETHERNET: i32 = 1;
pub const LINKTYPE_RAW: i32 = 101;
pub const LINKTYPE_IEEE802_11: i32 = 105;
pub const LINKTYPE_LINUX_SLL: i32 = 113;
pub const LINKTYPE_IEEE802_11_RADIOTAP: i32 = 127;
pub const LINKTYPE_IPV4: i32 = 228;

/// pcapng `if_tsresol` when the option is absent: microseconds.
pub const DEFAULT_TSRESOL: u8 = 6;
const TSRESOL_BASE2: u8 = 0x80;

/// Whether the file starts with a pcapng section header; the reader is
/// rewound either way.
pub fn sniff_pcapng<R: Read + Seek>(reader: &mut R) -> std::io::Result<bool> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic == PCAPNG_MAGIC)
}

/// Map a pcap link type onto the decoder for its outermost layer.
///
/// Raw IP captures are decoded as IPv4.
pub fn link_type_for(linktype: Linktype) -> Option<LinkType> {
    match linktype.0 {
        LINKTYPE_ETHERNET => Some(LinkType::Ethernet),
        LINKTYPE_LINUX_SLL => Some(LinkType::LinuxSll),
        LINKTYPE_IEEE802_11 => Some(LinkType::Ieee80211),
        LINKTYPE_IEEE802_11_RADIOTAP => Some(LinkType::RadioTap),
        LINKTYPE_RAW | LINKTYPE_IPV4 => Some(LinkType::RawIpv4),
        _ => None,
    }
}

/// Timestamp ticks per second for an `if_tsresol` value: `10^-n` seconds,
/// or `2^-n` when the high bit is set. `None` when it does not fit a `u64`.
pub fn ticks_per_second(tsresol: u8) -> Option<u64> {
    let exponent = u32::from(tsresol & !TSRESOL_BASE2);
    if tsresol & TSRESOL_BASE2 != 0 {
        1u64.checked_shl(exponent)
    } else {
        10u64.checked_pow(exponent)
    }
}

/// pcapng enhanced packet timestamp in seconds.
pub fn pcapng_seconds(ts_high: u32, ts_low: u32, ticks_per_second: u64, offset: i64) -> f64 {
    let ticks = (u64::from(ts_high) << 32) | u64::from(ts_low);
    let whole = ticks / ticks_per_second;
    let frac = ticks % ticks_per_second;
    whole as f64 + frac as f64 / ticks_per_second as f64 + offset as f64
}

/// Legacy record timestamp; the fraction is micro- or nanoseconds depending
/// on the file magic.
pub fn legacy_seconds(ts_sec: u32, ts_frac: u32, nanosecond: bool) -> f64 {
    let scale = if nanosecond { 1e-9 } else { 1e-6 };
    ts_sec as f64 + ts_frac as f64 * scale
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use pcap_parser::Linktype;

    use super::*;

    #[test]
    fn sniff_rewinds() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d, 0x0a, 0x01]);
        assert!(sniff_pcapng(&mut cursor).unwrap());
        let mut first = [0u8; 1];
        cursor.read_exact(&mut first).unwrap();
        assert_eq!(first[0], 0x0a);

        let mut legacy = Cursor::new(0xa1b2_c3d4u32.to_le_bytes());
        assert!(!sniff_pcapng(&mut legacy).unwrap());
    }

    #[test]
    fn sniff_needs_four_bytes() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d]);
        assert!(sniff_pcapng(&mut cursor).is_err());
    }

    #[test]
    fn wireless_link_types() {
        assert_eq!(link_type_for(Linktype(127)), Some(LinkType::RadioTap));
        assert_eq!(link_type_for(Linktype(105)), Some(LinkType::Ieee80211));
        assert_eq!(link_type_for(Linktype(0)), None);
    }

    #[test]
    fn tsresol_decimal_and_binary() {
        assert_eq!(ticks_per_second(DEFAULT_TSRESOL), Some(1_000_000));
        assert_eq!(ticks_per_second(9), Some(1_000_000_000));
        assert_eq!(ticks_per_second(0x80 | 10), Some(1024));
        assert_eq!(ticks_per_second(20), None);
    }

    #[test]
    fn pcapng_timestamps_honour_resolution() {
        assert_eq!(pcapng_seconds(0, 1_500_000, 1_000_000, 0), 1.5);
        assert_eq!(pcapng_seconds(0, 2_500_000_000, 1_000_000_000, 10), 12.5);
        let high = pcapng_seconds(1, 0, 1_000_000, 0);
        assert!((high - 4294.967296).abs() < 1e-9);
    }

    #[test]
    fn legacy_fraction_scale() {
        assert_eq!(legacy_seconds(10, 500_000, false), 10.5);
        assert_eq!(legacy_seconds(10, 500_000_000, true), 10.5);
    }
}
