use bytes::Bytes;
use serde::Serialize;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtocolKind, WirelessHeader};
use crate::protocols::common::ByteReader;

use super::layout;

/// RadioTap capture metadata.
///
/// Only the leading standard fields are decoded; the walk stops at the first
/// present bit whose layout is not listed in `layout::RADIOTAP_FIELDS`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RadioTapHeader {
    pub version: u8,
    pub length: u16,
    pub present: Vec<u32>,
    pub tsft: Option<u64>,
    pub flags: Option<u8>,
    pub rate: Option<u8>,
    pub channel_frequency: Option<u16>,
    pub channel_flags: Option<u16>,
    pub fhss: Option<u16>,
    pub antenna_signal: Option<i8>,
    pub antenna_noise: Option<i8>,
}

impl RadioTapHeader {
    /// `Some(true)` when the Flags field is present and announces a trailing FCS.
    pub fn fcs_at_end(&self) -> Option<bool> {
        self.flags
            .map(|flags| flags & layout::RADIOTAP_FLAG_FCS_AT_END != 0)
    }
}

pub(crate) fn decode_radiotap(data: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
    let header = parse_header(&data)?;
    let header_len = usize::from(header.length);
    let fcs_at_end = header.fcs_at_end().unwrap_or(options.dot11_fcs_at_end);

    let body = data.slice(header_len..);
    let child = Decoder::Dot11 { fcs_at_end }.decode(body.clone(), options)?;

    let protocol = Protocol::Wireless(WirelessHeader::RadioTap(header));
    Ok(Layer::new(protocol, data.slice(..header_len), body).with_child(child))
}

fn parse_header(data: &[u8]) -> Result<RadioTapHeader, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::RadioTap, data);
    reader.require_len(layout::RADIOTAP_MIN_LEN)?;

    let version = reader.read_u8(layout::RADIOTAP_VERSION_OFFSET)?;
    if version != layout::RADIOTAP_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            layer: ProtocolKind::RadioTap,
            version,
        });
    }
    let length = reader.read_u16_le(layout::RADIOTAP_LENGTH_RANGE)?;
    let header_len = usize::from(length);
    if header_len < layout::RADIOTAP_MIN_LEN || header_len > data.len() {
        return Err(DecodeError::InvalidLength {
            layer: ProtocolKind::RadioTap,
            declared: header_len,
            available: data.len(),
        });
    }

    // Fields never extend past the declared header length.
    let reader = ByteReader::new(ProtocolKind::RadioTap, &data[..header_len]);
    let mut offset = layout::RADIOTAP_PRESENT_OFFSET;
    let mut present = Vec::new();
    loop {
        let word = reader.read_u32_le(offset..offset + 4)?;
        present.push(word);
        offset += 4;
        if word & layout::PRESENT_EXT == 0 {
            break;
        }
    }

    let mut header = RadioTapHeader {
        version,
        length,
        present,
        ..RadioTapHeader::default()
    };
    let first = header.present[0];
    for (bit, align, size) in layout::RADIOTAP_FIELDS {
        if first & bit == 0 {
            continue;
        }
        offset = offset.next_multiple_of(align);
        let field = offset..offset + size;
        match bit {
            layout::PRESENT_TSFT => header.tsft = Some(reader.read_u64_le(field)?),
            layout::PRESENT_FLAGS => header.flags = Some(reader.read_u8(offset)?),
            layout::PRESENT_RATE => header.rate = Some(reader.read_u8(offset)?),
            layout::PRESENT_CHANNEL => {
                header.channel_frequency = Some(reader.read_u16_le(offset..offset + 2)?);
                header.channel_flags = Some(reader.read_u16_le(offset + 2..offset + 4)?);
            }
            layout::PRESENT_FHSS => header.fhss = Some(reader.read_u16_le(field)?),
            layout::PRESENT_DBM_ANTSIGNAL => {
                header.antenna_signal = Some(reader.read_u8(offset)? as i8)
            }
            layout::PRESENT_DBM_ANTNOISE => {
                header.antenna_noise = Some(reader.read_u8(offset)? as i8)
            }
            _ => break,
        }
        offset += size;
    }

    Ok(header)
}
