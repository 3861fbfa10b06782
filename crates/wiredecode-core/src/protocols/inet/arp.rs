use bytes::Bytes;
use serde::Serialize;

use crate::error::DecodeError;
use crate::layer::{Layer, NetworkHeader, Protocol, ProtocolKind};
use crate::protocols::common::ByteReader;
use crate::protocols::data;

use super::layout;

/// ARP header with addresses sized by the hardware/protocol length fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArpHeader {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub operation: u16,
    pub sender_hardware_address: Vec<u8>,
    pub sender_protocol_address: Vec<u8>,
    pub target_hardware_address: Vec<u8>,
    pub target_protocol_address: Vec<u8>,
}

pub(crate) fn decode_arp(data: Bytes) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Arp, &data);
    reader.require_len(layout::ARP_FIXED_LEN)?;

    let hardware_type = reader.read_u16_be(layout::ARP_HARDWARE_TYPE_RANGE)?;
    let protocol_type = reader.read_u16_be(layout::ARP_PROTOCOL_TYPE_RANGE)?;
    let hlen = usize::from(reader.read_u8(layout::ARP_HARDWARE_LEN_OFFSET)?);
    let plen = usize::from(reader.read_u8(layout::ARP_PROTOCOL_LEN_OFFSET)?);
    let operation = reader.read_u16_be(layout::ARP_OPERATION_RANGE)?;

    let sha = layout::ARP_FIXED_LEN;
    let spa = sha + hlen;
    let tha = spa + plen;
    let tpa = tha + hlen;
    let header_len = tpa + plen;
    reader.require_len(header_len)?;

    let arp = ArpHeader {
        hardware_type,
        protocol_type,
        operation,
        sender_hardware_address: reader.read_slice(sha..spa)?.to_vec(),
        sender_protocol_address: reader.read_slice(spa..tha)?.to_vec(),
        target_hardware_address: reader.read_slice(tha..tpa)?.to_vec(),
        target_protocol_address: reader.read_slice(tpa..header_len)?.to_vec(),
    };
    let body = data.slice(header_len..);
    let child = data::decode(body.clone());
    let protocol = Protocol::Network(NetworkHeader::Arp(arp));
    Ok(Layer::new(protocol, data.slice(..header_len), body).with_child(child))
}
