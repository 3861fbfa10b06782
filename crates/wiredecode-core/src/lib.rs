//! wiredecode core library: layered packet decoding from raw captured bytes.
//!
//! A captured buffer is handed to the decoder of its outermost encapsulation
//! (Ethernet, Linux SLL, raw 802.11, RadioTap or raw IPv4). Each decoder
//! parses its own header, picks the next decoder from a discriminant field and
//! recurses on the remaining bytes, producing a singly linked chain of
//! [`Layer`]s. Unknown discriminants, and payloads too short for the next
//! layer's fixed header, end the chain in an opaque data layer; structural
//! violations of a layer's own header abort the call with a [`DecodeError`].
//!
//! Wireless support covers RadioTap, 802.11 control/data/management frames
//! and the WEP/WPA/WPA2 confidentiality envelopes, with optional WEP
//! decryption (RC4 plus CRC-32 ICV) driven by [`DecodeOptions`].
//!
//! All I/O is isolated in `source`; `capture` drives decoding over a pcap
//! file and aggregates the chains into a deterministic [`Report`].
//!
//! Invariants:
//! - Every non-terminal layer's child was decoded from exactly its body.
//! - Decoding holds no state between calls; options are immutable.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```
//! use wiredecode_core::{DecodeOptions, LinkType, PacketDecoder, ProtocolKind};
//!
//! // RadioTap (no fields) + 802.11 ACK, no FCS.
//! let frame = [
//!     0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0xd4, 0x00, 0x00, 0x00, 0x02, 0x11, 0x22, 0x33, 0x44, 0x55,
//! ];
//! let options = DecodeOptions::default().with_dot11_fcs_at_end(false);
//! let root = PacketDecoder::new(options).decode(LinkType::RadioTap, &frame)?;
//! assert_eq!(
//!     root.kinds(),
//!     vec![ProtocolKind::RadioTap, ProtocolKind::Dot11, ProtocolKind::Dot11Ack]
//! );
//! # Ok::<(), wiredecode_core::DecodeError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod capture;
mod decoder;
mod error;
mod layer;
pub mod protocols;
mod source;

pub use capture::{CaptureError, decode_capture_file, decode_source};
pub use decoder::{
    DecodeOptions, Decoder, IcvPolicy, LinkType, PacketDecoder, TemporalKeyDecryptor, WepKey,
    WepKeyError,
};
pub use error::DecodeError;
pub use layer::{
    EncapsulationHeader, Layer, LayerIter, LinkHeader, NetworkHeader, ProtectedHeader, Protocol,
    ProtocolKind, TransportHeader, WirelessHeader,
};
pub use protocols::protected::Scheme;
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded capture with deterministic ordering.
///
/// # Examples
/// ```
/// use wiredecode_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcap", 123);
/// assert_eq!(report.report_version, wiredecode_core::REPORT_VERSION);
/// assert!(report.packets.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Optional capture summary (may be empty when unavailable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// How many decoded chains contain each protocol, sorted by kind.
    pub protocols: BTreeMap<ProtocolKind, u64>,
    /// Per-packet results in capture order.
    pub packets: Vec<PacketSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
///
/// # Examples
/// ```
/// use wiredecode_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.pcap".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Capture totals (timestamps may be absent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total packet count observed in the capture.
    pub packets_total: u64,
    /// Packets whose whole chain decoded.
    pub packets_decoded: u64,
    /// Packets aborted by a structural error.
    pub packets_failed: u64,
    /// Packets on link types without a decoder.
    pub packets_unsupported: u64,
    /// RFC3339 timestamp of the first packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Outcome of decoding one captured packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketSummary {
    /// Zero-based position in the capture.
    pub index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Decoder used for the outermost layer; absent for unsupported link types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,
    pub captured_len: usize,
    /// Decoded chain, outermost first. Empty when decoding failed.
    pub layers: Vec<LayerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One layer of a decoded chain.
///
/// # Examples
/// ```
/// use bytes::Bytes;
/// use wiredecode_core::{Layer, LayerSummary, ProtocolKind};
///
/// let summary = LayerSummary::from(&Layer::opaque(Bytes::from_static(b"abc")));
/// assert_eq!(summary.kind, ProtocolKind::Data);
/// assert_eq!(summary.body_len, 3);
/// assert!(summary.fields.is_null());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSummary {
    pub kind: ProtocolKind,
    pub header_len: usize,
    pub body_len: usize,
    pub trailer_len: usize,
    /// Typed header fields; null for opaque data.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub fields: serde_json::Value,
}

impl From<&Layer> for LayerSummary {
    fn from(layer: &Layer) -> Self {
        // Protocol serializes as {"family": .., "header": ..}; keep the header.
        let fields = serde_json::to_value(layer.protocol())
            .ok()
            .and_then(|mut value| value.get_mut("header").map(serde_json::Value::take))
            .unwrap_or_default();
        Self {
            kind: layer.kind(),
            header_len: layer.header().len(),
            body_len: layer.body().len(),
            trailer_len: layer.trailer().len(),
            fields,
        }
    }
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use wiredecode_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcap", 123);
/// assert_eq!(report.tool.name, "wiredecode");
/// assert!(report.protocols.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "wiredecode".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        protocols: BTreeMap::new(),
        packets: vec![],
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("capture.pcap", 1);
        report.capture_summary = Some(CaptureSummary {
            packets_total: 1,
            packets_unsupported: 1,
            ..CaptureSummary::default()
        });
        report.packets.push(PacketSummary {
            index: 0,
            timestamp: None,
            link_type: None,
            captured_len: 4,
            layers: vec![],
            error: None,
        });

        let value = serde_json::to_value(&report).expect("report json");
        let capture = value.get("capture_summary").expect("capture_summary");
        assert!(capture.get("time_start").is_none());
        assert!(capture.get("time_end").is_none());

        let packet = &value["packets"][0];
        assert!(packet.get("timestamp").is_none());
        assert!(packet.get("link_type").is_none());
        assert!(packet.get("error").is_none());
    }

    #[test]
    fn protocol_counts_serialize_as_names() {
        let mut report = make_stub_report("capture.pcap", 1);
        report.protocols.insert(ProtocolKind::Dot11Beacon, 2);
        report.protocols.insert(ProtocolKind::Ethernet, 1);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["protocols"]["dot11_beacon"], 2);
        assert_eq!(value["protocols"]["ethernet"], 1);
    }

    #[test]
    fn layer_summary_keeps_typed_fields() {
        let frame = Bytes::from_static(&[0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x88, 0xb5]);
        let root = Decoder::Llc.decode(frame, &DecodeOptions::default()).unwrap();
        let snap = LayerSummary::from(root.child().unwrap());
        assert_eq!(snap.kind, ProtocolKind::Snap);
        assert_eq!(snap.header_len, 5);
        assert_eq!(snap.fields["ether_type"], 0x88b5);
        assert_eq!(snap.fields["oui"], 0);
    }
}
