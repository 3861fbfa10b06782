use std::net::Ipv4Addr;

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, NetworkHeader, Protocol, ProtocolKind};
use crate::protocols::common::ByteReader;

use super::layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipv4Header {
    pub header_len: usize,
    pub total_len: u16,
    pub identification: u16,
    pub dont_fragment: bool,
    pub more_fragments: bool,
    pub fragment_offset: u16,
    pub time_to_live: u8,
    pub protocol: u8,
    pub header_checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

/// Strict IPv4: the payload handed to the next decoder is exactly
/// `total_len - header_len` bytes; anything after it (link padding) becomes
/// the trailer.
///
/// # Errors
/// - `TooShort` or `UnsupportedVersion` from [`parse_header`].
/// - `InvalidLength` when `total_len` exceeds the buffer or undercuts the
///   header itself.
///
/// # Examples
/// Internal helper, reached through [`Decoder::Ipv4`].
/// ```text
/// let layer = decode_ipv4(datagram_with_padding, &DecodeOptions::default())?;
/// assert_eq!(layer.trailer().len(), 6);
/// ```
pub(crate) fn decode_ipv4(data: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
    let header = parse_header(&data)?;
    let total_len = usize::from(header.total_len);
    if total_len > data.len() || total_len < header.header_len {
        return Err(DecodeError::InvalidLength {
            layer: ProtocolKind::Ipv4,
            declared: total_len,
            available: data.len(),
        });
    }

    let body = data.slice(header.header_len..total_len);
    let trailer = data.slice(total_len..);
    let next = if header.fragment_offset != 0 {
        // Only the first fragment starts with the transport header.
        Decoder::Data
    } else {
        match header.protocol {
            layout::IP_PROTO_UDP => Decoder::Udp,
            layout::IP_PROTO_TCP => Decoder::Tcp,
            layout::IP_PROTO_ICMP => Decoder::Icmp,
            _ => Decoder::Data,
        }
    };
    let child = next.decode_payload(body.clone(), options)?;

    let header_bytes = data.slice(..header.header_len);
    let protocol = Protocol::Network(NetworkHeader::Ipv4(header));
    Ok(Layer::new(protocol, header_bytes, body)
        .with_trailer(trailer)
        .with_child(child))
}

/// Lenient IPv4 for the header quoted by ICMP destination-unreachable.
///
/// The quote is usually cut short, so the declared total length is ignored
/// and only UDP is followed, and only when its full header was quoted.
pub(crate) fn decode_quoted_ipv4(
    data: Bytes,
    options: &DecodeOptions,
) -> Result<Layer, DecodeError> {
    let header = parse_header(&data)?;
    let body = data.slice(header.header_len..);
    let next = if header.protocol == layout::IP_PROTO_UDP && body.len() >= layout::UDP_HEADER_LEN
    {
        Decoder::Udp
    } else {
        debug!(
            protocol = header.protocol,
            quoted = body.len(),
            "quoted datagram not followed"
        );
        Decoder::Data
    };
    let child = next.decode_payload(body.clone(), options)?;

    let header_bytes = data.slice(..header.header_len);
    let protocol = Protocol::Network(NetworkHeader::Ipv4(header));
    Ok(Layer::new(protocol, header_bytes, body).with_child(child))
}

/// Fixed header plus options, validated by `etherparse`.
///
/// # Errors
/// `TooShort` below 20 bytes, `UnsupportedVersion` for anything but 4, and
/// `Header` when `etherparse` rejects the IHL or the options.
fn parse_header(data: &[u8]) -> Result<Ipv4Header, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Ipv4, data);
    reader.require_len(layout::IPV4_MIN_HEADER_LEN)?;
    let version = reader.read_u8(0)? >> 4;
    if version != layout::IPV4_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            layer: ProtocolKind::Ipv4,
            version,
        });
    }

    let (header, rest) = etherparse::Ipv4Header::from_slice(data)
        .map_err(|e| DecodeError::header(ProtocolKind::Ipv4, e))?;

    Ok(Ipv4Header {
        header_len: data.len() - rest.len(),
        total_len: header.total_len,
        identification: header.identification,
        dont_fragment: header.dont_fragment,
        more_fragments: header.more_fragments,
        fragment_offset: header.fragment_offset.value(),
        time_to_live: header.time_to_live,
        protocol: header.protocol.0,
        header_checksum: header.header_checksum,
        source: Ipv4Addr::from(header.source),
        destination: Ipv4Addr::from(header.destination),
    })
}
