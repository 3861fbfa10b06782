use bytes::Bytes;
use serde::Serialize;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtocolKind, WirelessHeader};
use crate::protocols::common::{ByteReader, MacAddr};
use crate::protocols::{data, protected};

use super::frame::DataFrameFlags;
use super::layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataFrameHeader {
    pub duration: u16,
    pub address1: MacAddr,
    pub address2: MacAddr,
    pub address3: MacAddr,
    pub sequence_number: u16,
    pub fragment_number: u8,
    pub address4: Option<MacAddr>,
    pub qos_control: Option<u16>,
}

impl DataFrameFlags {
    pub(crate) fn header_len(self) -> usize {
        let mut len = layout::DATA_HEADER_LEN;
        if self.addr4 {
            len += layout::ADDRESS_LEN;
        }
        if self.qos {
            len += layout::QOS_CONTROL_LEN;
        }
        len
    }
}

/// Data frame header sized by `flags`, then LLC or the confidentiality chain.
///
/// # Errors
/// `TooShort` when the header implied by `flags` does not fit, and
/// `IcvMismatch` from a WEP body that fails verification.
pub(crate) fn decode_data(
    data: Bytes,
    flags: DataFrameFlags,
    options: &DecodeOptions,
) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Dot11Data, &data);
    let header_len = flags.header_len();
    reader.require_len(header_len)?;

    let sequence_control = reader.read_u16_le(layout::SEQUENCE_CONTROL_RANGE)?;
    let mut offset = layout::DATA_HEADER_LEN;
    let address4 = if flags.addr4 {
        let mac = reader.read_mac(offset..offset + layout::ADDRESS_LEN)?;
        offset += layout::ADDRESS_LEN;
        Some(mac)
    } else {
        None
    };
    let qos_control = if flags.qos {
        Some(reader.read_u16_le(offset..offset + layout::QOS_CONTROL_LEN)?)
    } else {
        None
    };

    let header = DataFrameHeader {
        duration: reader.read_u16_le(layout::DURATION_RANGE)?,
        address1: reader.read_mac(layout::ADDRESS1_RANGE)?,
        address2: reader.read_mac(layout::ADDRESS2_RANGE)?,
        address3: reader.read_mac(layout::ADDRESS3_RANGE)?,
        sequence_number: sequence_control >> 4,
        fragment_number: (sequence_control & 0x0f) as u8,
        address4,
        qos_control,
    };

    let body = data.slice(header_len..);
    // Null-function frames carry no payload at all.
    let child = if body.is_empty() {
        data::decode(body.clone())
    } else if flags.protected {
        protected::decode_protected(body.clone(), options)?
    } else {
        Decoder::Llc.decode_payload(body.clone(), options)?
    };

    let protocol = Protocol::Wireless(WirelessHeader::Data(header));
    Ok(Layer::new(protocol, data.slice(..header_len), body).with_child(child))
}
