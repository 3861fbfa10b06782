use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtocolKind, WirelessHeader};
use crate::protocols::common::ByteReader;

use super::control::ControlSubtype;
use super::layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    Management,
    Control,
    Data,
    Reserved,
}

impl FrameType {
    fn from_bits(bits: u8) -> Self {
        match bits {
            layout::FRAME_TYPE_MANAGEMENT => FrameType::Management,
            layout::FRAME_TYPE_CONTROL => FrameType::Control,
            layout::FRAME_TYPE_DATA => FrameType::Data,
            _ => FrameType::Reserved,
        }
    }
}

/// The two-byte frame control field shared by every 802.11 frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameControl {
    pub version: u8,
    pub frame_type: FrameType,
    pub subtype: u8,
    pub to_ds: bool,
    pub from_ds: bool,
    pub more_fragments: bool,
    pub retry: bool,
    pub power_management: bool,
    pub more_data: bool,
    pub protected: bool,
    pub order: bool,
}

impl FrameControl {
    pub fn parse(bytes: [u8; 2]) -> Self {
        let [info, flags] = bytes;
        let flag = |mask: u8| flags & mask != 0;
        Self {
            version: info & 0x03,
            frame_type: FrameType::from_bits((info >> 2) & 0x03),
            subtype: info >> 4,
            to_ds: flag(layout::FLAG_TO_DS),
            from_ds: flag(layout::FLAG_FROM_DS),
            more_fragments: flag(layout::FLAG_MORE_FRAGMENTS),
            retry: flag(layout::FLAG_RETRY),
            power_management: flag(layout::FLAG_POWER_MANAGEMENT),
            more_data: flag(layout::FLAG_MORE_DATA),
            protected: flag(layout::FLAG_PROTECTED),
            order: flag(layout::FLAG_ORDER),
        }
    }

    pub fn is_qos(&self) -> bool {
        self.frame_type == FrameType::Data && self.subtype & layout::SUBTYPE_QOS_BIT != 0
    }

    pub fn data_flags(&self) -> DataFrameFlags {
        DataFrameFlags {
            addr4: self.to_ds && self.from_ds,
            qos: self.is_qos(),
            protected: self.protected,
        }
    }
}

/// Layout switches for a data frame, decided from its frame control field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataFrameFlags {
    /// Both To-DS and From-DS set: a fourth address follows sequence control.
    pub addr4: bool,
    /// QoS subtype: a QoS control field closes the header.
    pub qos: bool,
    /// Body is encrypted and goes through the confidentiality chain.
    pub protected: bool,
}

/// Frame control, then the type's decoder over the body. With `fcs_at_end`
/// the last four bytes are kept as the trailer.
///
/// # Errors
/// `TooShort` when frame control (plus the FCS, if announced) is missing,
/// or when the subtype decoder's own header does not fit in the body.
pub(crate) fn decode_frame(
    data: Bytes,
    fcs_at_end: bool,
    options: &DecodeOptions,
) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Dot11, &data);
    let fcs_len = if fcs_at_end { layout::FCS_LEN } else { 0 };
    reader.require_len(layout::FRAME_CONTROL_LEN + fcs_len)?;
    let frame_control = FrameControl::parse(reader.read_array(0..layout::FRAME_CONTROL_LEN)?);

    let body_end = data.len() - fcs_len;
    let body = data.slice(layout::FRAME_CONTROL_LEN..body_end);
    let trailer = data.slice(body_end..);

    let next = match frame_control.frame_type {
        FrameType::Control => match ControlSubtype::from_subtype(frame_control.subtype) {
            Some(subtype) => Decoder::Dot11Control(subtype),
            None => {
                debug!(subtype = frame_control.subtype, "unhandled control subtype");
                Decoder::Data
            }
        },
        FrameType::Data => Decoder::Dot11Data(frame_control.data_flags()),
        FrameType::Management => Decoder::Dot11Management {
            subtype: frame_control.subtype,
        },
        FrameType::Reserved => Decoder::Data,
    };
    let child = next.decode(body.clone(), options)?;

    let protocol = Protocol::Wireless(WirelessHeader::Dot11(frame_control));
    Ok(Layer::new(protocol, data.slice(..layout::FRAME_CONTROL_LEN), body)
        .with_trailer(trailer)
        .with_child(child))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::{DataFrameFlags, FrameControl, FrameType, decode_frame};
    use crate::decoder::DecodeOptions;
    use crate::error::DecodeError;
    use crate::layer::ProtocolKind;

    #[test]
    fn frame_control_bits() {
        // QoS data, To-DS and From-DS, protected.
        let fc = FrameControl::parse([0x88, 0x43]);
        assert_eq!(fc.frame_type, FrameType::Data);
        assert_eq!(fc.subtype, 8);
        assert!(fc.to_ds && fc.from_ds && fc.protected);
        assert!(!fc.retry);
        assert_eq!(
            fc.data_flags(),
            DataFrameFlags {
                addr4: true,
                qos: true,
                protected: true,
            }
        );
    }

    #[test]
    fn management_subtype_is_not_qos() {
        let fc = FrameControl::parse([0x80, 0x00]);
        assert_eq!(fc.frame_type, FrameType::Management);
        assert_eq!(fc.subtype, 8);
        assert!(!fc.is_qos());
    }

    #[test]
    fn control_frame_dispatch() {
        // RTS: duration, RA, TA
        let mut frame = vec![0xb4, 0x00, 0x10, 0x00];
        frame.extend_from_slice(&[1u8; 6]);
        frame.extend_from_slice(&[2u8; 6]);
        let layer = decode_frame(Bytes::from(frame), false, &DecodeOptions::default()).unwrap();
        assert_eq!(layer.kinds(), vec![ProtocolKind::Dot11, ProtocolKind::Dot11Rts]);
    }

    #[test]
    fn reserved_type_is_opaque() {
        let frame = Bytes::from_static(&[0x0c, 0x00, 1, 2, 3]);
        let layer = decode_frame(frame, false, &DecodeOptions::default()).unwrap();
        assert_eq!(layer.kinds(), vec![ProtocolKind::Dot11, ProtocolKind::Data]);
    }

    #[test]
    fn unknown_control_subtype_is_opaque() {
        // Subtype 7 (control wrapper) is not decoded.
        let frame = Bytes::from_static(&[0x74, 0x00, 0, 0, 0, 0]);
        let layer = decode_frame(frame, false, &DecodeOptions::default()).unwrap();
        assert_eq!(layer.kinds(), vec![ProtocolKind::Dot11, ProtocolKind::Data]);
    }

    #[test]
    fn fcs_requires_room() {
        let err = decode_frame(Bytes::from_static(&[0xd4, 0x00, 0, 0]), true, &DecodeOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                layer: ProtocolKind::Dot11,
                needed: 6,
                actual: 4,
            }
        );
    }
}
