// RadioTap (little-endian, alignment relative to the header start)
pub const RADIOTAP_VERSION_OFFSET: usize = 0;
pub const RADIOTAP_LENGTH_RANGE: std::ops::Range<usize> = 2..4;
pub const RADIOTAP_PRESENT_OFFSET: usize = 4;
pub const RADIOTAP_MIN_LEN: usize = 8;
pub const RADIOTAP_VERSION: u8 = 0;

pub const PRESENT_TSFT: u32 = 1 << 0;
pub const PRESENT_FLAGS: u32 = 1 << 1;
pub const PRESENT_RATE: u32 = 1 << 2;
pub const PRESENT_CHANNEL: u32 = 1 << 3;
pub const PRESENT_FHSS: u32 = 1 << 4;
pub const PRESENT_DBM_ANTSIGNAL: u32 = 1 << 5;
pub const PRESENT_DBM_ANTNOISE: u32 = 1 << 6;
pub const PRESENT_EXT: u32 = 1 << 31;

/// (present bit, alignment, size) for the leading fields we know how to walk.
pub const RADIOTAP_FIELDS: [(u32, usize, usize); 7] = [
    (PRESENT_TSFT, 8, 8),
    (PRESENT_FLAGS, 1, 1),
    (PRESENT_RATE, 1, 1),
    (PRESENT_CHANNEL, 2, 4),
    (PRESENT_FHSS, 1, 2),
    (PRESENT_DBM_ANTSIGNAL, 1, 1),
    (PRESENT_DBM_ANTNOISE, 1, 1),
];

pub const RADIOTAP_FLAG_FCS_AT_END: u8 = 0x10;

// Frame control
pub const FRAME_CONTROL_LEN: usize = 2;
pub const FCS_LEN: usize = 4;

pub const FRAME_TYPE_MANAGEMENT: u8 = 0;
pub const FRAME_TYPE_CONTROL: u8 = 1;
pub const FRAME_TYPE_DATA: u8 = 2;

pub const FLAG_TO_DS: u8 = 0x01;
pub const FLAG_FROM_DS: u8 = 0x02;
pub const FLAG_MORE_FRAGMENTS: u8 = 0x04;
pub const FLAG_RETRY: u8 = 0x08;
pub const FLAG_POWER_MANAGEMENT: u8 = 0x10;
pub const FLAG_MORE_DATA: u8 = 0x20;
pub const FLAG_PROTECTED: u8 = 0x40;
pub const FLAG_ORDER: u8 = 0x80;

pub const SUBTYPE_QOS_BIT: u8 = 0x08;

pub const SUBTYPE_PS_POLL: u8 = 10;
pub const SUBTYPE_RTS: u8 = 11;
pub const SUBTYPE_CTS: u8 = 12;
pub const SUBTYPE_ACK: u8 = 13;
pub const SUBTYPE_CF_END: u8 = 14;
pub const SUBTYPE_CF_END_CF_ACK: u8 = 15;

pub const SUBTYPE_PROBE_REQUEST: u8 = 4;
pub const SUBTYPE_PROBE_RESPONSE: u8 = 5;
pub const SUBTYPE_BEACON: u8 = 8;

// Offsets below are relative to the end of the frame control field.
pub const DURATION_RANGE: std::ops::Range<usize> = 0..2;
pub const ADDRESS1_RANGE: std::ops::Range<usize> = 2..8;
pub const ADDRESS2_RANGE: std::ops::Range<usize> = 8..14;
pub const ADDRESS3_RANGE: std::ops::Range<usize> = 14..20;
pub const SEQUENCE_CONTROL_RANGE: std::ops::Range<usize> = 20..22;
pub const ADDRESS_LEN: usize = 6;
pub const QOS_CONTROL_LEN: usize = 2;

pub const DATA_HEADER_LEN: usize = 22;
pub const MANAGEMENT_HEADER_LEN: usize = 22;

pub const CONTROL_SHORT_LEN: usize = 8;
pub const CONTROL_LONG_LEN: usize = 14;

pub const BEACON_TIMESTAMP_RANGE: std::ops::Range<usize> = 0..8;
pub const BEACON_INTERVAL_RANGE: std::ops::Range<usize> = 8..10;
pub const BEACON_CAPABILITY_RANGE: std::ops::Range<usize> = 10..12;
pub const BEACON_FIXED_LEN: usize = 12;

pub const ELEMENT_HEADER_LEN: usize = 2;
pub const ELEMENT_SSID: u8 = 0;
