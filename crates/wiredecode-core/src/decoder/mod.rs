//! Decoder dispatch.
//!
//! Every protocol unit is a variant of [`Decoder`]. A unit parses its own
//! header, picks the next variant from a discriminant field and recurses on
//! the remaining bytes; the returned [`Layer`] already has its child attached.
//! Per-frame state (FCS presence, data frame flags, management subtype) is
//! carried inside the variant itself, so a `Decoder` value is a complete,
//! immutable description of how to decode one buffer.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::layer::Layer;
use crate::protocols::dot11::{self, ControlSubtype, DataFrameFlags};
use crate::protocols::{data, inet, link, llc};

mod options;

pub use options::{DecodeOptions, IcvPolicy, TemporalKeyDecryptor, WepKey, WepKeyError};

/// One protocol decoder unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    Ethernet,
    LinuxSll,
    Ipv4,
    /// IPv4 header quoted inside an ICMP destination-unreachable message.
    IcmpQuotedIpv4,
    Arp,
    Tcp,
    Udp,
    Icmp,
    RadioTap,
    Dot11 { fcs_at_end: bool },
    Dot11Control(ControlSubtype),
    Dot11Data(DataFrameFlags),
    Dot11Management { subtype: u8 },
    Dot11Beacon,
    Dot11ProbeRequest,
    Dot11ProbeResponse,
    Llc,
    Snap,
    Data,
}

impl Decoder {
    /// Decode `data` as this unit and everything nested inside it.
    ///
    /// # Examples
    /// ```
    /// use bytes::Bytes;
    /// use wiredecode_core::{DecodeOptions, Decoder, ProtocolKind};
    ///
    /// // LLC/SNAP header announcing an ethertype nobody decodes.
    /// let frame = Bytes::from_static(&[0xaa, 0xaa, 0x03, 0, 0, 0, 0x88, 0xb5, 1, 2]);
    /// let layer = Decoder::Llc.decode(frame, &DecodeOptions::default())?;
    /// assert_eq!(
    ///     layer.kinds(),
    ///     vec![ProtocolKind::Llc, ProtocolKind::Snap, ProtocolKind::Data]
    /// );
    /// # Ok::<(), wiredecode_core::DecodeError>(())
    /// ```
    pub fn decode(self, data: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
        trace!(decoder = ?self, len = data.len(), "decoding layer");
        match self {
            Decoder::Ethernet => link::decode_ethernet(data, options),
            Decoder::LinuxSll => link::decode_linux_sll(data, options),
            Decoder::Ipv4 => inet::decode_ipv4(data, options),
            Decoder::IcmpQuotedIpv4 => inet::decode_quoted_ipv4(data, options),
            Decoder::Arp => inet::decode_arp(data),
            Decoder::Tcp => inet::decode_tcp(data),
            Decoder::Udp => inet::decode_udp(data),
            Decoder::Icmp => inet::decode_icmp(data, options),
            Decoder::RadioTap => dot11::decode_radiotap(data, options),
            Decoder::Dot11 { fcs_at_end } => dot11::decode_frame(data, fcs_at_end, options),
            Decoder::Dot11Control(subtype) => dot11::decode_control(data, subtype),
            Decoder::Dot11Data(flags) => dot11::decode_data(data, flags, options),
            Decoder::Dot11Management { subtype } => dot11::decode_management(data, subtype, options),
            Decoder::Dot11Beacon => dot11::decode_beacon(data),
            Decoder::Dot11ProbeRequest => dot11::decode_probe_request(data),
            Decoder::Dot11ProbeResponse => dot11::decode_probe_response(data),
            Decoder::Llc => llc::decode_llc(data, options),
            Decoder::Snap => llc::decode_snap(data, options),
            Decoder::Data => Ok(data::decode(data)),
        }
    }

    /// Decode `data` as the optional next layer of an enclosing header.
    ///
    /// A payload shorter than this unit's fixed header is kept as an opaque
    /// data leaf; the enclosing layer stays decoded. Once the fixed header
    /// fits, any failure inside it aborts the call like [`Decoder::decode`].
    ///
    /// # Errors
    /// Whatever [`Decoder::decode`] reports for a payload long enough to hold
    /// this unit's fixed header.
    pub(crate) fn decode_payload(
        self,
        data: Bytes,
        options: &DecodeOptions,
    ) -> Result<Layer, DecodeError> {
        let needed = self.min_header_len();
        if data.len() < needed {
            debug!(
                decoder = ?self,
                needed,
                available = data.len(),
                "payload too short for next layer, keeping it opaque"
            );
            return Ok(data::decode(data));
        }
        self.decode(data, options)
    }

    /// Fewest bytes this unit needs before it can read its own fixed header.
    pub fn min_header_len(self) -> usize {
        match self {
            Decoder::Ethernet => link::layout::ETHERNET_HEADER_LEN,
            Decoder::LinuxSll => link::layout::SLL_HEADER_LEN,
            Decoder::Ipv4 | Decoder::IcmpQuotedIpv4 => inet::layout::IPV4_MIN_HEADER_LEN,
            Decoder::Arp => inet::layout::ARP_FIXED_LEN,
            Decoder::Tcp => inet::layout::TCP_MIN_HEADER_LEN,
            Decoder::Udp => inet::layout::UDP_HEADER_LEN,
            Decoder::Icmp => inet::layout::ICMP_MIN_HEADER_LEN,
            Decoder::RadioTap => dot11::layout::RADIOTAP_MIN_LEN,
            Decoder::Dot11 { fcs_at_end } => {
                dot11::layout::FRAME_CONTROL_LEN
                    + if fcs_at_end { dot11::layout::FCS_LEN } else { 0 }
            }
            Decoder::Dot11Control(subtype) => subtype.header_len(),
            Decoder::Dot11Data(flags) => flags.header_len(),
            Decoder::Dot11Management { .. } => dot11::layout::MANAGEMENT_HEADER_LEN,
            Decoder::Dot11Beacon | Decoder::Dot11ProbeResponse => dot11::layout::BEACON_FIXED_LEN,
            Decoder::Dot11ProbeRequest | Decoder::Data => 0,
            Decoder::Llc => llc::layout::LLC_HEADER_LEN,
            Decoder::Snap => llc::layout::SNAP_HEADER_LEN,
        }
    }

    /// Next decoder for an ethertype, shared by Ethernet, Linux SLL and SNAP.
    pub fn for_ether_type(ether_type: u16) -> Decoder {
        match ether_type {
            link::layout::ETHERTYPE_IPV4 => Decoder::Ipv4,
            link::layout::ETHERTYPE_ARP => Decoder::Arp,
            _ => Decoder::Data,
        }
    }
}

/// Outermost encapsulation of a captured buffer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Ethernet,
    LinuxSll,
    Ieee80211,
    RadioTap,
    RawIpv4,
}

impl LinkType {
    pub fn decoder(self, options: &DecodeOptions) -> Decoder {
        match self {
            LinkType::Ethernet => Decoder::Ethernet,
            LinkType::LinuxSll => Decoder::LinuxSll,
            LinkType::Ieee80211 => Decoder::Dot11 {
                fcs_at_end: options.dot11_fcs_at_end,
            },
            LinkType::RadioTap => Decoder::RadioTap,
            LinkType::RawIpv4 => Decoder::Ipv4,
        }
    }
}

/// Entry point for decoding whole captured buffers.
///
/// Holds no mutable state; one instance can serve any number of threads.
///
/// # Examples
/// ```
/// use wiredecode_core::{DecodeOptions, LinkType, PacketDecoder, ProtocolKind};
///
/// let mut frame = vec![0xff; 12];
/// frame.extend_from_slice(&[0x88, 0xcc, 0x01, 0x02]);
///
/// let decoder = PacketDecoder::new(DecodeOptions::default());
/// let root = decoder.decode(LinkType::Ethernet, &frame)?;
/// assert_eq!(root.kinds(), vec![ProtocolKind::Ethernet, ProtocolKind::Data]);
/// assert!(root.find(ProtocolKind::Ipv4).is_none());
/// # Ok::<(), wiredecode_core::DecodeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PacketDecoder {
    options: DecodeOptions,
}

impl PacketDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn decode(&self, link: LinkType, data: &[u8]) -> Result<Layer, DecodeError> {
        self.decode_bytes(link, Bytes::copy_from_slice(data))
    }

    pub fn decode_bytes(&self, link: LinkType, data: Bytes) -> Result<Layer, DecodeError> {
        link.decoder(&self.options).decode(data, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::{DecodeOptions, Decoder, LinkType};
    use crate::error::DecodeError;
    use crate::layer::ProtocolKind;

    #[test]
    fn ether_type_dispatch_table() {
        assert_eq!(Decoder::for_ether_type(0x0800), Decoder::Ipv4);
        assert_eq!(Decoder::for_ether_type(0x0806), Decoder::Arp);
        assert_eq!(Decoder::for_ether_type(0x86dd), Decoder::Data);
    }

    #[test]
    fn short_payload_for_next_layer_is_opaque() {
        let options = DecodeOptions::default();
        let payload = Bytes::from_static(&[0x45, 0x00, 0x00, 0x14, 0x00]);
        let layer = Decoder::Ipv4.decode_payload(payload.clone(), &options).unwrap();
        assert_eq!(layer.kind(), ProtocolKind::Data);
        assert_eq!(layer.body(), &payload);

        let err = Decoder::Ipv4.decode(payload, &options).unwrap_err();
        assert!(matches!(err, DecodeError::TooShort { needed: 20, actual: 5, .. }));
    }

    #[test]
    fn fixed_header_sizes() {
        assert_eq!(Decoder::Llc.min_header_len(), 3);
        assert_eq!(Decoder::Snap.min_header_len(), 5);
        assert_eq!(Decoder::Dot11 { fcs_at_end: true }.min_header_len(), 6);
        assert_eq!(Decoder::Data.min_header_len(), 0);
    }

    #[test]
    fn raw_dot11_link_uses_configured_fcs() {
        let options = DecodeOptions::default().with_dot11_fcs_at_end(false);
        assert_eq!(
            LinkType::Ieee80211.decoder(&options),
            Decoder::Dot11 { fcs_at_end: false }
        );
        assert_eq!(LinkType::RadioTap.decoder(&options), Decoder::RadioTap);
    }
}
