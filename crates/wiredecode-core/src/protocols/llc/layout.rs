pub const LLC_HEADER_LEN: usize = 3;
pub const LLC_DSAP_OFFSET: usize = 0;
pub const LLC_SSAP_OFFSET: usize = 1;
pub const LLC_CONTROL_OFFSET: usize = 2;

/// SAP announcing a SNAP header.
pub const SAP_SNAP: u8 = 0xaa;
/// Unnumbered information.
pub const CONTROL_UI: u8 = 0x03;

pub const SNAP_HEADER_LEN: usize = 5;
pub const SNAP_OUI_RANGE: std::ops::Range<usize> = 0..3;
pub const SNAP_ETHER_TYPE_RANGE: std::ops::Range<usize> = 3..5;
/// Encapsulated Ethernet (RFC 1042).
pub const OUI_ENCAPSULATED_ETHERNET: u32 = 0x00_0000;
