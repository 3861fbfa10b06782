// Leading bytes of a protected data frame body.
pub const IV_RANGE: std::ops::Range<usize> = 0..3;
pub const KEY_ID_OFFSET: usize = 3;
pub const KEY_ID_SHIFT: u8 = 6;
pub const EXT_IV_FLAG: u8 = 0x20;

pub const WEP_HEADER_LEN: usize = 4;
pub const EXT_IV_HEADER_LEN: usize = 8;

// TKIP seed check: byte 1 is (byte 0 | 0x20) & 0x7f.
pub const TKIP_SEED_OR: u8 = 0x20;
pub const TKIP_SEED_MASK: u8 = 0x7f;
// CCMP keeps byte 2 reserved (zero).
pub const CCMP_RESERVED_OFFSET: usize = 2;

pub const ICV_LEN: usize = 4;
/// Smallest WEP body worth decrypting: at least four bytes ahead of the ICV.
pub const WEP_MIN_DECRYPT_LEN: usize = 8;
/// TKIP Michael MIC (8) followed by the WEP ICV (4).
pub const WPA_TRAILER_LEN: usize = 12;
/// CCMP MIC.
pub const WPA2_TRAILER_LEN: usize = 8;
