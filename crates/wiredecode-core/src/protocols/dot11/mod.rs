//! IEEE 802.11 decoding.
//!
//! RadioTap metadata decides whether the 802.11 frame carries a trailing FCS.
//! The generic frame decoder reads the frame control field and dispatches on
//! frame type: control frames by subtype to thin terminal parsers, data
//! frames to the data decoder (QoS, four-address and protected flags decided
//! here and passed along), management frames by subtype to beacon and probe
//! parsers. Offsets live in `layout`; everything is little-endian.

mod control;
mod data;
mod frame;
pub mod layout;
mod management;
mod radiotap;

pub use control::{ControlFrame, ControlSubtype};
pub use data::DataFrameHeader;
pub use frame::{DataFrameFlags, FrameControl, FrameType};
pub use management::{BeaconFrame, InformationElement, ManagementHeader, ProbeRequestFrame};
pub use radiotap::RadioTapHeader;

pub(crate) use control::decode_control;
pub(crate) use data::decode_data;
pub(crate) use frame::decode_frame;
pub(crate) use management::{
    decode_beacon, decode_management, decode_probe_request, decode_probe_response,
};
pub(crate) use radiotap::decode_radiotap;
