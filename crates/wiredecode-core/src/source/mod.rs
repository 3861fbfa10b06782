//! Capture ingestion.
//!
//! A [`PacketSource`] yields raw captured buffers with their timestamp and
//! pcap link type; nothing here interprets packet bytes beyond choosing the
//! outermost [`LinkType`].

mod pcap;

pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

use crate::decoder::LinkType;

#[derive(Debug, Clone)]
pub struct PacketEvent {
    /// Capture time in seconds since the Unix epoch.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

impl PacketEvent {
    /// Outermost decoder for this packet, `None` for link types not decoded.
    pub fn link_type(&self) -> Option<LinkType> {
        pcap::link_type_for(self.linktype)
    }
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error ({context}): {message}")]
    Pcap {
        context: &'static str,
        message: String,
    },
}

impl SourceError {
    pub(crate) fn pcap(context: &'static str, err: impl std::fmt::Display) -> Self {
        SourceError::Pcap {
            context,
            message: err.to_string(),
        }
    }
}
