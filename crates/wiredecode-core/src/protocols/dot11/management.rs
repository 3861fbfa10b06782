use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtocolKind, WirelessHeader};
use crate::protocols::common::{ByteReader, MacAddr};

use super::layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagementHeader {
    pub duration: u16,
    pub destination: MacAddr,
    pub source: MacAddr,
    pub bssid: MacAddr,
    pub sequence_number: u16,
    pub fragment_number: u8,
}

/// Tagged parameter from the variable part of a management frame body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InformationElement {
    pub id: u8,
    pub data: Vec<u8>,
}

/// Beacon and probe response share the same fixed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeaconFrame {
    pub timestamp: u64,
    pub beacon_interval: u16,
    pub capability: u16,
    pub ssid: Option<String>,
    pub elements: Vec<InformationElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRequestFrame {
    pub ssid: Option<String>,
    pub elements: Vec<InformationElement>,
}

/// # Errors
/// `TooShort` for a header under 22 bytes, or a beacon or probe response
/// without its 12 fixed bytes.
pub(crate) fn decode_management(
    data: Bytes,
    subtype: u8,
    options: &DecodeOptions,
) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Dot11Management, &data);
    reader.require_len(layout::MANAGEMENT_HEADER_LEN)?;
    let sequence_control = reader.read_u16_le(layout::SEQUENCE_CONTROL_RANGE)?;
    let header = ManagementHeader {
        duration: reader.read_u16_le(layout::DURATION_RANGE)?,
        destination: reader.read_mac(layout::ADDRESS1_RANGE)?,
        source: reader.read_mac(layout::ADDRESS2_RANGE)?,
        bssid: reader.read_mac(layout::ADDRESS3_RANGE)?,
        sequence_number: sequence_control >> 4,
        fragment_number: (sequence_control & 0x0f) as u8,
    };

    let next = match subtype {
        layout::SUBTYPE_BEACON => Decoder::Dot11Beacon,
        layout::SUBTYPE_PROBE_REQUEST => Decoder::Dot11ProbeRequest,
        layout::SUBTYPE_PROBE_RESPONSE => Decoder::Dot11ProbeResponse,
        _ => {
            debug!(subtype, "management subtype kept opaque");
            Decoder::Data
        }
    };
    let body = data.slice(layout::MANAGEMENT_HEADER_LEN..);
    let child = next.decode(body.clone(), options)?;

    let protocol = Protocol::Wireless(WirelessHeader::Management(header));
    Ok(Layer::new(protocol, data.slice(..layout::MANAGEMENT_HEADER_LEN), body).with_child(child))
}

pub(crate) fn decode_beacon(data: Bytes) -> Result<Layer, DecodeError> {
    let frame = parse_beacon(ProtocolKind::Dot11Beacon, &data)?;
    Ok(fixed_then_elements(
        Protocol::Wireless(WirelessHeader::Beacon(frame)),
        data,
        layout::BEACON_FIXED_LEN,
    ))
}

pub(crate) fn decode_probe_response(data: Bytes) -> Result<Layer, DecodeError> {
    let frame = parse_beacon(ProtocolKind::Dot11ProbeResponse, &data)?;
    Ok(fixed_then_elements(
        Protocol::Wireless(WirelessHeader::ProbeResponse(frame)),
        data,
        layout::BEACON_FIXED_LEN,
    ))
}

pub(crate) fn decode_probe_request(data: Bytes) -> Result<Layer, DecodeError> {
    let elements = parse_elements(&data);
    let frame = ProbeRequestFrame {
        ssid: ssid_of(&elements),
        elements,
    };
    Ok(fixed_then_elements(
        Protocol::Wireless(WirelessHeader::ProbeRequest(frame)),
        data,
        0,
    ))
}

fn parse_beacon(kind: ProtocolKind, data: &[u8]) -> Result<BeaconFrame, DecodeError> {
    let reader = ByteReader::new(kind, data);
    reader.require_len(layout::BEACON_FIXED_LEN)?;
    let elements = parse_elements(&data[layout::BEACON_FIXED_LEN..]);
    Ok(BeaconFrame {
        timestamp: reader.read_u64_le(layout::BEACON_TIMESTAMP_RANGE)?,
        beacon_interval: reader.read_u16_le(layout::BEACON_INTERVAL_RANGE)?,
        capability: reader.read_u16_le(layout::BEACON_CAPABILITY_RANGE)?,
        ssid: ssid_of(&elements),
        elements,
    })
}

// Terminal node: fixed parameters as header, element bytes as body.
fn fixed_then_elements(protocol: Protocol, data: Bytes, fixed_len: usize) -> Layer {
    Layer::new(protocol, data.slice(..fixed_len), data.slice(fixed_len..))
}

/// Walk `(id, len, data)` triples, stopping at the first truncated element.
fn parse_elements(mut bytes: &[u8]) -> Vec<InformationElement> {
    let mut elements = Vec::new();
    while let [id, len, rest @ ..] = bytes {
        let len = usize::from(*len);
        let Some(data) = rest.get(..len) else {
            debug!(id = *id, len, available = rest.len(), "truncated information element");
            break;
        };
        elements.push(InformationElement {
            id: *id,
            data: data.to_vec(),
        });
        bytes = &rest[len..];
    }
    elements
}

fn ssid_of(elements: &[InformationElement]) -> Option<String> {
    elements
        .iter()
        .find(|element| element.id == layout::ELEMENT_SSID)
        .map(|element| String::from_utf8_lossy(&element.data).into_owned())
}
