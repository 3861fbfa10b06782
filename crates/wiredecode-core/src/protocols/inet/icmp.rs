use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtocolKind, TransportHeader};
use crate::protocols::common::ByteReader;
use crate::protocols::data;

use super::layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
}

pub(crate) fn decode_icmp(data: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
    let reader = ByteReader::new(ProtocolKind::Icmp, &data);
    reader.require_len(layout::ICMP_MIN_HEADER_LEN)?;
    let icmp_type = reader.read_u8(layout::ICMP_TYPE_OFFSET)?;
    let code = reader.read_u8(layout::ICMP_CODE_OFFSET)?;

    let (header, rest) = etherparse::Icmpv4Header::from_slice(&data)
        .map_err(|e| DecodeError::header(ProtocolKind::Icmp, e))?;
    let header_len = data.len() - rest.len();
    let body = data.slice(header_len..);

    let child = if icmp_type == layout::ICMP_DEST_UNREACHABLE {
        match Decoder::IcmpQuotedIpv4.decode(body.clone(), options) {
            Ok(quoted) => quoted,
            Err(err) => {
                debug!(%err, "quoted IPv4 header unreadable, keeping it opaque");
                data::decode(body.clone())
            }
        }
    } else {
        data::decode(body.clone())
    };

    let icmp = IcmpHeader {
        icmp_type,
        code,
        checksum: header.checksum,
    };
    let protocol = Protocol::Transport(TransportHeader::Icmp(icmp));
    Ok(Layer::new(protocol, data.slice(..header_len), body).with_child(child))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use etherparse::PacketBuilder;

    use super::decode_icmp;
    use crate::decoder::DecodeOptions;
    use crate::error::DecodeError;
    use crate::layer::ProtocolKind;

    fn unreachable_with_quote(quote: &[u8]) -> Bytes {
        let mut message = vec![3, 3, 0, 0, 0, 0, 0, 0];
        message.extend_from_slice(quote);
        Bytes::from(message)
    }

    fn quoted_udp(len: usize) -> Vec<u8> {
        let builder = PacketBuilder::ipv4([10, 1, 1, 1], [10, 2, 2, 2], 3).udp(33434, 33435);
        let payload = [0u8; 32];
        let mut packet = Vec::new();
        builder.write(&mut packet, &payload).unwrap();
        packet.truncate(len);
        packet
    }

    #[test]
    fn unreachable_follows_quoted_udp() {
        let message = unreachable_with_quote(&quoted_udp(28));
        let layer = decode_icmp(message, &DecodeOptions::default()).unwrap();
        assert_eq!(
            layer.kinds(),
            vec![
                ProtocolKind::Icmp,
                ProtocolKind::Ipv4,
                ProtocolKind::Udp,
                ProtocolKind::Data
            ]
        );
    }

    #[test]
    fn unreachable_with_short_quote_is_opaque() {
        let message = unreachable_with_quote(&[0x45, 0, 0]);
        let layer = decode_icmp(message, &DecodeOptions::default()).unwrap();
        assert_eq!(layer.kinds(), vec![ProtocolKind::Icmp, ProtocolKind::Data]);
        assert_eq!(layer.child().unwrap().body().len(), 3);
    }

    #[test]
    fn echo_reply_is_opaque() {
        let message = Bytes::from_static(&[0, 0, 0xff, 0xff, 0, 1, 0, 1, b'p', b'i', b'n', b'g']);
        let layer = decode_icmp(message, &DecodeOptions::default()).unwrap();
        assert_eq!(layer.kinds(), vec![ProtocolKind::Icmp, ProtocolKind::Data]);
        assert_eq!(layer.header().len(), 8);
        assert_eq!(layer.child().unwrap().body().as_ref(), b"ping");
    }

    #[test]
    fn icmp_too_short() {
        let err = decode_icmp(Bytes::from_static(&[3, 1, 0]), &DecodeOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                layer: ProtocolKind::Icmp,
                needed: 8,
                actual: 3,
            }
        ));
    }
}
