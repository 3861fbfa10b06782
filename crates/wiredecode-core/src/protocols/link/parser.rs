use bytes::Bytes;
use serde::Serialize;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, LinkHeader, Protocol, ProtocolKind};
use crate::protocols::common::{ByteReader, MacAddr};

use super::layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EthernetHeader {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub ether_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinuxSllHeader {
    pub packet_type: u16,
    pub arphrd_type: u16,
    /// Link-layer address of the sender, truncated to the 8 bytes SLL keeps.
    pub address: Vec<u8>,
    pub ether_type: u16,
}

/// Ethernet II header, then the ethertype's decoder over the rest.
///
/// # Errors
/// `TooShort` when fewer than 14 bytes are present, plus whatever the next
/// decoder reports once its own fixed header fits.
///
/// # Examples
/// Internal helper, reached through [`crate::Decoder::Ethernet`].
/// ```text
/// let layer = decode_ethernet(frame, &DecodeOptions::default())?;
/// assert_eq!(layer.header().len(), 14);
/// ```
pub(crate) fn decode_ethernet(data: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
    let (header, rest) =
        etherparse::Ethernet2Header::from_slice(&data).map_err(|_| DecodeError::TooShort {
            layer: ProtocolKind::Ethernet,
            needed: layout::ETHERNET_HEADER_LEN,
            actual: data.len(),
        })?;
    let header_len = data.len() - rest.len();
    let ether_type = header.ether_type.0;

    let body = data.slice(header_len..);
    let child = Decoder::for_ether_type(ether_type).decode_payload(body.clone(), options)?;

    let protocol = Protocol::Link(LinkHeader::Ethernet(EthernetHeader {
        destination: MacAddr(header.destination),
        source: MacAddr(header.source),
        ether_type,
    }));
    Ok(Layer::new(protocol, data.slice(..header_len), body).with_child(child))
}

/// # Errors
/// `TooShort` when the 16-byte cooked header is incomplete.
pub(crate) fn decode_linux_sll(
    data: Bytes,
    options: &DecodeOptions,
) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::LinuxSll, &data);
    reader.require_len(layout::SLL_HEADER_LEN)?;

    let packet_type = reader.read_u16_be(layout::SLL_PACKET_TYPE_RANGE)?;
    let arphrd_type = reader.read_u16_be(layout::SLL_ARPHRD_TYPE_RANGE)?;
    let address_len = reader.read_u16_be(layout::SLL_ADDRESS_LEN_RANGE)? as usize;
    let address = reader.read_slice(layout::SLL_ADDRESS_RANGE)?;
    let ether_type = reader.read_u16_be(layout::SLL_PROTOCOL_RANGE)?;
    let address = address[..address_len.min(address.len())].to_vec();

    let body = data.slice(layout::SLL_HEADER_LEN..);
    let child = Decoder::for_ether_type(ether_type).decode_payload(body.clone(), options)?;

    let protocol = Protocol::Link(LinkHeader::LinuxSll(LinuxSllHeader {
        packet_type,
        arphrd_type,
        address,
        ether_type,
    }));
    Ok(Layer::new(protocol, data.slice(..layout::SLL_HEADER_LEN), body).with_child(child))
}
