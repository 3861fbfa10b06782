pub const IPV4_MIN_HEADER_LEN: usize = 20;
pub const IPV4_VERSION: u8 = 4;

pub const IP_PROTO_ICMP: u8 = 1;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;

pub const TCP_MIN_HEADER_LEN: usize = 20;
pub const UDP_HEADER_LEN: usize = 8;
pub const ICMP_MIN_HEADER_LEN: usize = 8;

pub const ICMP_TYPE_OFFSET: usize = 0;
pub const ICMP_CODE_OFFSET: usize = 1;
pub const ICMP_DEST_UNREACHABLE: u8 = 3;

pub const ARP_HARDWARE_TYPE_RANGE: std::ops::Range<usize> = 0..2;
pub const ARP_PROTOCOL_TYPE_RANGE: std::ops::Range<usize> = 2..4;
pub const ARP_HARDWARE_LEN_OFFSET: usize = 4;
pub const ARP_PROTOCOL_LEN_OFFSET: usize = 5;
pub const ARP_OPERATION_RANGE: std::ops::Range<usize> = 6..8;
pub const ARP_FIXED_LEN: usize = 8;
