use bytes::Bytes;
use serde::Serialize;

use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtocolKind, WirelessHeader};
use crate::protocols::common::{ByteReader, MacAddr};

use super::layout;

/// Control frame subtypes with a dedicated decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSubtype {
    PsPoll,
    Rts,
    Cts,
    Ack,
    CfEnd,
    CfEndCfAck,
}

impl ControlSubtype {
    pub fn from_subtype(subtype: u8) -> Option<Self> {
        match subtype {
            layout::SUBTYPE_PS_POLL => Some(ControlSubtype::PsPoll),
            layout::SUBTYPE_RTS => Some(ControlSubtype::Rts),
            layout::SUBTYPE_CTS => Some(ControlSubtype::Cts),
            layout::SUBTYPE_ACK => Some(ControlSubtype::Ack),
            layout::SUBTYPE_CF_END => Some(ControlSubtype::CfEnd),
            layout::SUBTYPE_CF_END_CF_ACK => Some(ControlSubtype::CfEndCfAck),
            _ => None,
        }
    }

    pub fn kind(self) -> ProtocolKind {
        match self {
            ControlSubtype::PsPoll => ProtocolKind::Dot11PsPoll,
            ControlSubtype::Rts => ProtocolKind::Dot11Rts,
            ControlSubtype::Cts => ProtocolKind::Dot11Cts,
            ControlSubtype::Ack => ProtocolKind::Dot11Ack,
            ControlSubtype::CfEnd => ProtocolKind::Dot11CfEnd,
            ControlSubtype::CfEndCfAck => ProtocolKind::Dot11CfEndCfAck,
        }
    }

    pub(crate) fn header_len(self) -> usize {
        match self {
            ControlSubtype::Cts | ControlSubtype::Ack => layout::CONTROL_SHORT_LEN,
            _ => layout::CONTROL_LONG_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum ControlFrame {
    Cts {
        duration: u16,
        receiver: MacAddr,
    },
    Ack {
        duration: u16,
        receiver: MacAddr,
    },
    Rts {
        duration: u16,
        receiver: MacAddr,
        transmitter: MacAddr,
    },
    PsPoll {
        association_id: u16,
        bssid: MacAddr,
        transmitter: MacAddr,
    },
    CfEnd {
        duration: u16,
        receiver: MacAddr,
        bssid: MacAddr,
    },
    CfEndCfAck {
        duration: u16,
        receiver: MacAddr,
        bssid: MacAddr,
    },
}

impl ControlFrame {
    pub fn subtype(&self) -> ControlSubtype {
        match self {
            ControlFrame::Cts { .. } => ControlSubtype::Cts,
            ControlFrame::Ack { .. } => ControlSubtype::Ack,
            ControlFrame::Rts { .. } => ControlSubtype::Rts,
            ControlFrame::PsPoll { .. } => ControlSubtype::PsPoll,
            ControlFrame::CfEnd { .. } => ControlSubtype::CfEnd,
            ControlFrame::CfEndCfAck { .. } => ControlSubtype::CfEndCfAck,
        }
    }

    pub fn kind(&self) -> ProtocolKind {
        self.subtype().kind()
    }
}

/// Control frames are terminal: anything after the fixed fields stays in the body.
pub(crate) fn decode_control(data: Bytes, subtype: ControlSubtype) -> Result<Layer, DecodeError> {
    let kind = subtype.kind();
    let header_len = subtype.header_len();
    let reader = ByteReader::new(kind, &data);
    reader.require_len(header_len)?;

    // Every control frame starts with a 16-bit field (duration or AID)
    // followed by one or two addresses.
    let first = reader.read_u16_le(layout::DURATION_RANGE)?;
    let address1 = reader.read_mac(layout::ADDRESS1_RANGE)?;
    let address2 = if header_len == layout::CONTROL_LONG_LEN {
        reader.read_mac(layout::ADDRESS2_RANGE)?
    } else {
        MacAddr::default()
    };

    let frame = match subtype {
        ControlSubtype::Cts => ControlFrame::Cts {
            duration: first,
            receiver: address1,
        },
        ControlSubtype::Ack => ControlFrame::Ack {
            duration: first,
            receiver: address1,
        },
        ControlSubtype::Rts => ControlFrame::Rts {
            duration: first,
            receiver: address1,
            transmitter: address2,
        },
        ControlSubtype::PsPoll => ControlFrame::PsPoll {
            association_id: first,
            bssid: address1,
            transmitter: address2,
        },
        ControlSubtype::CfEnd => ControlFrame::CfEnd {
            duration: first,
            receiver: address1,
            bssid: address2,
        },
        ControlSubtype::CfEndCfAck => ControlFrame::CfEndCfAck {
            duration: first,
            receiver: address1,
            bssid: address2,
        },
    };

    let protocol = Protocol::Wireless(WirelessHeader::Control(frame));
    Ok(Layer::new(protocol, data.slice(..header_len), data.slice(header_len..)))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::{ControlFrame, ControlSubtype, decode_control};
    use crate::error::DecodeError;
    use crate::layer::{Protocol, ProtocolKind, WirelessHeader};
    use crate::protocols::common::MacAddr;

    fn control_frame(layer: &crate::layer::Layer) -> &ControlFrame {
        let Protocol::Wireless(WirelessHeader::Control(frame)) = layer.protocol() else {
            panic!("expected control frame");
        };
        frame
    }

    #[test]
    fn cts_is_terminal() {
        let data = Bytes::from_static(&[0x2c, 0x01, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let layer = decode_control(data, ControlSubtype::Cts).unwrap();
        assert_eq!(layer.kind(), ProtocolKind::Dot11Cts);
        assert!(layer.child().is_none());
        assert!(layer.body().is_empty());
        assert_eq!(
            control_frame(&layer),
            &ControlFrame::Cts {
                duration: 300,
                receiver: MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            }
        );
    }

    #[test]
    fn ps_poll_reads_association_id() {
        let mut data = vec![0x01, 0xc0];
        data.extend_from_slice(&[0xaa; 6]);
        data.extend_from_slice(&[0xbb; 6]);
        let layer = decode_control(Bytes::from(data), ControlSubtype::PsPoll).unwrap();
        assert_eq!(
            control_frame(&layer),
            &ControlFrame::PsPoll {
                association_id: 0xc001,
                bssid: MacAddr([0xaa; 6]),
                transmitter: MacAddr([0xbb; 6]),
            }
        );
    }

    #[test]
    fn trailing_bytes_stay_in_body() {
        let mut data = vec![0u8; 14];
        data.extend_from_slice(&[1, 2]);
        let layer = decode_control(Bytes::from(data), ControlSubtype::CfEndCfAck).unwrap();
        assert_eq!(layer.kind(), ProtocolKind::Dot11CfEndCfAck);
        assert_eq!(layer.header().len(), 14);
        assert_eq!(layer.body().as_ref(), &[1, 2]);
    }

    #[test]
    fn rts_too_short() {
        let err = decode_control(Bytes::from_static(&[0u8; 8]), ControlSubtype::Rts).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                layer: ProtocolKind::Dot11Rts,
                needed: 14,
                actual: 8,
            }
        );
    }

    #[test]
    fn subtype_mapping() {
        assert_eq!(ControlSubtype::from_subtype(13), Some(ControlSubtype::Ack));
        assert_eq!(ControlSubtype::from_subtype(10), Some(ControlSubtype::PsPoll));
        assert_eq!(ControlSubtype::from_subtype(7), None);
    }
}
