pub const ETHERNET_HEADER_LEN: usize = 14;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

pub const SLL_PACKET_TYPE_RANGE: std::ops::Range<usize> = 0..2;
pub const SLL_ARPHRD_TYPE_RANGE: std::ops::Range<usize> = 2..4;
pub const SLL_ADDRESS_LEN_RANGE: std::ops::Range<usize> = 4..6;
pub const SLL_ADDRESS_RANGE: std::ops::Range<usize> = 6..14;
pub const SLL_PROTOCOL_RANGE: std::ops::Range<usize> = 14..16;
pub const SLL_HEADER_LEN: usize = 16;
