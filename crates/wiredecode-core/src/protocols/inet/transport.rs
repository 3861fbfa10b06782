use bytes::Bytes;
use serde::Serialize;

use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtocolKind, TransportHeader};
use crate::protocols::common::ByteReader;
use crate::protocols::data;

use super::layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TcpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub acknowledgment_number: u32,
    pub header_len: usize,
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
    pub psh: bool,
    pub urg: bool,
    pub window_size: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub length: u16,
    pub checksum: u16,
}

pub(crate) fn decode_tcp(data: Bytes) -> Result<Layer, DecodeError> {
    ByteReader::new(ProtocolKind::Tcp, &data).require_len(layout::TCP_MIN_HEADER_LEN)?;
    let (header, rest) = etherparse::TcpHeader::from_slice(&data)
        .map_err(|e| DecodeError::header(ProtocolKind::Tcp, e))?;
    let header_len = data.len() - rest.len();

    let tcp = TcpHeader {
        source_port: header.source_port,
        destination_port: header.destination_port,
        sequence_number: header.sequence_number,
        acknowledgment_number: header.acknowledgment_number,
        header_len,
        syn: header.syn,
        ack: header.ack,
        fin: header.fin,
        rst: header.rst,
        psh: header.psh,
        urg: header.urg,
        window_size: header.window_size,
    };
    let body = data.slice(header_len..);
    let child = data::decode(body.clone());
    let protocol = Protocol::Transport(TransportHeader::Tcp(tcp));
    Ok(Layer::new(protocol, data.slice(..header_len), body).with_child(child))
}

pub(crate) fn decode_udp(data: Bytes) -> Result<Layer, DecodeError> {
    let (header, _) = etherparse::UdpHeader::from_slice(&data).map_err(|_| DecodeError::TooShort {
        layer: ProtocolKind::Udp,
        needed: layout::UDP_HEADER_LEN,
        actual: data.len(),
    })?;

    let udp = UdpHeader {
        source_port: header.source_port,
        destination_port: header.destination_port,
        length: header.length,
        checksum: header.checksum,
    };
    let body = data.slice(layout::UDP_HEADER_LEN..);
    let child = data::decode(body.clone());
    let protocol = Protocol::Transport(TransportHeader::Udp(udp));
    Ok(Layer::new(protocol, data.slice(..layout::UDP_HEADER_LEN), body).with_child(child))
}
