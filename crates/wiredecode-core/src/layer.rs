//! Decoded protocol layers.
//!
//! A [`Layer`] owns three disjoint byte views of the buffer it was decoded
//! from (header, body, trailer) plus at most one child decoded from the body.
//! Views are `Bytes` slices, so the whole chain shares the capture buffer;
//! only decrypted payloads allocate a buffer of their own, owned by the
//! subtree below the confidentiality envelope.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::protocols::dot11::{
    BeaconFrame, ControlFrame, DataFrameHeader, FrameControl, ManagementHeader,
    ProbeRequestFrame, RadioTapHeader,
};
use crate::protocols::inet::{ArpHeader, IcmpHeader, Ipv4Header, TcpHeader, UdpHeader};
use crate::protocols::link::{EthernetHeader, LinuxSllHeader};
use crate::protocols::llc::{LlcHeader, SnapHeader};
use crate::protocols::protected::{WepHeader, Wpa2Header, WpaHeader};

/// Flat identifier of every node type a chain can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    Ethernet,
    LinuxSll,
    Ipv4,
    Arp,
    Tcp,
    Udp,
    Icmp,
    RadioTap,
    Dot11,
    Dot11Cts,
    Dot11Ack,
    Dot11Rts,
    Dot11PsPoll,
    Dot11CfEnd,
    Dot11CfEndCfAck,
    Dot11Data,
    Dot11Management,
    Dot11Beacon,
    Dot11ProbeRequest,
    Dot11ProbeResponse,
    Wep,
    WepData,
    Wpa,
    WpaData,
    Wpa2,
    Wpa2Data,
    Llc,
    Snap,
    Data,
}

impl ProtocolKind {
    pub fn name(self) -> &'static str {
        match self {
            ProtocolKind::Ethernet => "ethernet",
            ProtocolKind::LinuxSll => "linux_sll",
            ProtocolKind::Ipv4 => "ipv4",
            ProtocolKind::Arp => "arp",
            ProtocolKind::Tcp => "tcp",
            ProtocolKind::Udp => "udp",
            ProtocolKind::Icmp => "icmp",
            ProtocolKind::RadioTap => "radiotap",
            ProtocolKind::Dot11 => "dot11",
            ProtocolKind::Dot11Cts => "dot11_cts",
            ProtocolKind::Dot11Ack => "dot11_ack",
            ProtocolKind::Dot11Rts => "dot11_rts",
            ProtocolKind::Dot11PsPoll => "dot11_ps_poll",
            ProtocolKind::Dot11CfEnd => "dot11_cf_end",
            ProtocolKind::Dot11CfEndCfAck => "dot11_cf_end_cf_ack",
            ProtocolKind::Dot11Data => "dot11_data",
            ProtocolKind::Dot11Management => "dot11_management",
            ProtocolKind::Dot11Beacon => "dot11_beacon",
            ProtocolKind::Dot11ProbeRequest => "dot11_probe_request",
            ProtocolKind::Dot11ProbeResponse => "dot11_probe_response",
            ProtocolKind::Wep => "wep",
            ProtocolKind::WepData => "wep_data",
            ProtocolKind::Wpa => "wpa",
            ProtocolKind::WpaData => "wpa_data",
            ProtocolKind::Wpa2 => "wpa2",
            ProtocolKind::Wpa2Data => "wpa2_data",
            ProtocolKind::Llc => "llc",
            ProtocolKind::Snap => "snap",
            ProtocolKind::Data => "data",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed header of a decoded layer, grouped by protocol family.
///
/// Serializes as `{"family": .., "header": {..}}`; the header object holds
/// the protocol's own fields, the protocol itself is named by [`ProtocolKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "family", content = "header", rename_all = "snake_case")]
pub enum Protocol {
    Link(LinkHeader),
    Network(NetworkHeader),
    Transport(TransportHeader),
    Wireless(WirelessHeader),
    Protected(ProtectedHeader),
    Encapsulation(EncapsulationHeader),
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LinkHeader {
    Ethernet(EthernetHeader),
    LinuxSll(LinuxSllHeader),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NetworkHeader {
    Ipv4(Ipv4Header),
    Arp(ArpHeader),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransportHeader {
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Icmp(IcmpHeader),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WirelessHeader {
    RadioTap(RadioTapHeader),
    Dot11(FrameControl),
    Control(ControlFrame),
    Data(DataFrameHeader),
    Management(ManagementHeader),
    Beacon(BeaconFrame),
    ProbeRequest(ProbeRequestFrame),
    ProbeResponse(BeaconFrame),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProtectedHeader {
    Wep(WepHeader),
    /// Decrypted WEP payload; `icv` is the verified integrity check value.
    WepData { icv: u32 },
    Wpa(WpaHeader),
    WpaData,
    Wpa2(Wpa2Header),
    Wpa2Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EncapsulationHeader {
    Llc(LlcHeader),
    Snap(SnapHeader),
}

impl Protocol {
    pub fn kind(&self) -> ProtocolKind {
        match self {
            Protocol::Link(LinkHeader::Ethernet(_)) => ProtocolKind::Ethernet,
            Protocol::Link(LinkHeader::LinuxSll(_)) => ProtocolKind::LinuxSll,
            Protocol::Network(NetworkHeader::Ipv4(_)) => ProtocolKind::Ipv4,
            Protocol::Network(NetworkHeader::Arp(_)) => ProtocolKind::Arp,
            Protocol::Transport(TransportHeader::Tcp(_)) => ProtocolKind::Tcp,
            Protocol::Transport(TransportHeader::Udp(_)) => ProtocolKind::Udp,
            Protocol::Transport(TransportHeader::Icmp(_)) => ProtocolKind::Icmp,
            Protocol::Wireless(WirelessHeader::RadioTap(_)) => ProtocolKind::RadioTap,
            Protocol::Wireless(WirelessHeader::Dot11(_)) => ProtocolKind::Dot11,
            Protocol::Wireless(WirelessHeader::Control(frame)) => frame.kind(),
            Protocol::Wireless(WirelessHeader::Data(_)) => ProtocolKind::Dot11Data,
            Protocol::Wireless(WirelessHeader::Management(_)) => ProtocolKind::Dot11Management,
            Protocol::Wireless(WirelessHeader::Beacon(_)) => ProtocolKind::Dot11Beacon,
            Protocol::Wireless(WirelessHeader::ProbeRequest(_)) => ProtocolKind::Dot11ProbeRequest,
            Protocol::Wireless(WirelessHeader::ProbeResponse(_)) => {
                ProtocolKind::Dot11ProbeResponse
            }
            Protocol::Protected(ProtectedHeader::Wep(_)) => ProtocolKind::Wep,
            Protocol::Protected(ProtectedHeader::WepData { .. }) => ProtocolKind::WepData,
            Protocol::Protected(ProtectedHeader::Wpa(_)) => ProtocolKind::Wpa,
            Protocol::Protected(ProtectedHeader::WpaData) => ProtocolKind::WpaData,
            Protocol::Protected(ProtectedHeader::Wpa2(_)) => ProtocolKind::Wpa2,
            Protocol::Protected(ProtectedHeader::Wpa2Data) => ProtocolKind::Wpa2Data,
            Protocol::Encapsulation(EncapsulationHeader::Llc(_)) => ProtocolKind::Llc,
            Protocol::Encapsulation(EncapsulationHeader::Snap(_)) => ProtocolKind::Snap,
            Protocol::Data => ProtocolKind::Data,
        }
    }
}

/// One decoded protocol layer and, through its child, the rest of the chain.
///
/// The wire image of a layer is `header ++ body ++ trailer`. When a child is
/// present it was decoded from exactly `body`, so
/// `child.wire_len() == body.len()` holds at every level.
///
/// # Examples
/// ```
/// use bytes::Bytes;
/// use wiredecode_core::{Layer, ProtocolKind};
///
/// let leaf = Layer::opaque(Bytes::from_static(b"payload"));
/// assert_eq!(leaf.kind(), ProtocolKind::Data);
/// assert!(leaf.child().is_none());
/// assert_eq!(leaf.wire_len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    protocol: Protocol,
    header: Bytes,
    body: Bytes,
    trailer: Bytes,
    child: Option<Box<Layer>>,
}

impl Layer {
    pub(crate) fn new(protocol: Protocol, header: Bytes, body: Bytes) -> Self {
        Self {
            protocol,
            header,
            body,
            trailer: Bytes::new(),
            child: None,
        }
    }

    /// Terminal node wrapping bytes that are not interpreted any further.
    pub fn opaque(data: Bytes) -> Self {
        Self::new(Protocol::Data, Bytes::new(), data)
    }

    pub(crate) fn with_trailer(mut self, trailer: Bytes) -> Self {
        self.trailer = trailer;
        self
    }

    pub(crate) fn with_child(mut self, child: Layer) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn kind(&self) -> ProtocolKind {
        self.protocol.kind()
    }

    pub fn header(&self) -> &Bytes {
        &self.header
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn trailer(&self) -> &Bytes {
        &self.trailer
    }

    pub fn child(&self) -> Option<&Layer> {
        self.child.as_deref()
    }

    pub fn wire_len(&self) -> usize {
        self.header.len() + self.body.len() + self.trailer.len()
    }

    /// Walk the chain from this layer down, returning the first layer of `kind`.
    pub fn find(&self, kind: ProtocolKind) -> Option<&Layer> {
        self.iter().find(|layer| layer.kind() == kind)
    }

    pub fn iter(&self) -> LayerIter<'_> {
        LayerIter { next: Some(self) }
    }

    pub fn kinds(&self) -> Vec<ProtocolKind> {
        self.iter().map(Layer::kind).collect()
    }

    /// Innermost layer of the chain.
    pub fn leaf(&self) -> &Layer {
        let mut layer = self;
        while let Some(child) = layer.child() {
            layer = child;
        }
        layer
    }
}

pub struct LayerIter<'a> {
    next: Option<&'a Layer>,
}

impl<'a> Iterator for LayerIter<'a> {
    type Item = &'a Layer;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.child();
        Some(current)
    }
}
