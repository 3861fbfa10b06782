use bytes::Bytes;
use serde::Serialize;
use tracing::trace;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{EncapsulationHeader, Layer, Protocol, ProtocolKind};
use crate::protocols::common::ByteReader;

use super::layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LlcHeader {
    pub dsap: u8,
    pub ssap: u8,
    pub control: u8,
}

impl LlcHeader {
    pub fn is_snap(&self) -> bool {
        self.dsap == layout::SAP_SNAP
            && self.ssap == layout::SAP_SNAP
            && self.control == layout::CONTROL_UI
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapHeader {
    pub oui: u32,
    pub ether_type: u16,
}

/// # Errors
/// `TooShort` when the three LLC bytes are missing. A SNAP header that does
/// not fit leaves the payload opaque instead.
///
/// # Examples
/// Internal helper, reached through [`Decoder::Llc`].
/// ```text
/// let layer = decode_llc(Bytes::from_static(&[0x42, 0x42, 0x03, 0x01]), &options)?;
/// assert_eq!(layer.kinds(), vec![ProtocolKind::Llc, ProtocolKind::Data]);
/// ```
pub(crate) fn decode_llc(data: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Llc, &data);
    reader.require_len(layout::LLC_HEADER_LEN)?;
    let header = LlcHeader {
        dsap: reader.read_u8(layout::LLC_DSAP_OFFSET)?,
        ssap: reader.read_u8(layout::LLC_SSAP_OFFSET)?,
        control: reader.read_u8(layout::LLC_CONTROL_OFFSET)?,
    };

    let next = if header.is_snap() {
        Decoder::Snap
    } else {
        trace!(dsap = header.dsap, ssap = header.ssap, "non-SNAP LLC payload");
        Decoder::Data
    };
    let body = data.slice(layout::LLC_HEADER_LEN..);
    let child = next.decode_payload(body.clone(), options)?;

    let protocol = Protocol::Encapsulation(EncapsulationHeader::Llc(header));
    Ok(Layer::new(protocol, data.slice(..layout::LLC_HEADER_LEN), body).with_child(child))
}

/// # Errors
/// `TooShort` below five bytes; errors from the ethertype's decoder once its
/// fixed header fits.
pub(crate) fn decode_snap(data: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Snap, &data);
    reader.require_len(layout::SNAP_HEADER_LEN)?;
    let [a, b, c] = reader.read_array::<3>(layout::SNAP_OUI_RANGE)?;
    let header = SnapHeader {
        oui: u32::from_be_bytes([0, a, b, c]),
        ether_type: reader.read_u16_be(layout::SNAP_ETHER_TYPE_RANGE)?,
    };

    let next = if header.oui == layout::OUI_ENCAPSULATED_ETHERNET {
        Decoder::for_ether_type(header.ether_type)
    } else {
        Decoder::Data
    };
    let body = data.slice(layout::SNAP_HEADER_LEN..);
    let child = next.decode_payload(body.clone(), options)?;

    let protocol = Protocol::Encapsulation(EncapsulationHeader::Snap(header));
    Ok(Layer::new(protocol, data.slice(..layout::SNAP_HEADER_LEN), body).with_child(child))
}
