//! PCAP/PCAPNG file source.
//!
//! Reads legacy pcap (micro- or nanosecond) and pcapng captures through
//! `pcap-parser`'s streaming readers and emits one [`PacketEvent`] per packet
//! record. Per-interface link types and timestamp resolutions from pcapng
//! interface description blocks are tracked so that each enhanced packet is
//! stamped correctly.

mod format;

use std::fs::File;
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};
use tracing::{debug, trace};

use crate::source::{PacketEvent, PacketSource, SourceError};

pub(crate) use format::link_type_for;

pub struct PcapFileSource {
    reader: Reader,
}

enum Reader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Linktype,
        nanosecond: bool,
    },
    Ng {
        reader: PcapNGReader<File>,
        interfaces: Vec<Interface>,
    },
}

/// What a pcapng interface description block tells us about its packets.
#[derive(Debug, Clone, Copy)]
struct Interface {
    linktype: Linktype,
    ticks_per_second: u64,
    offset: i64,
}

impl Interface {
    fn from_block(linktype: Linktype, tsresol: u8, offset: i64) -> Self {
        let ticks_per_second = format::ticks_per_second(tsresol).unwrap_or_else(|| {
            debug!(tsresol, "unrepresentable timestamp resolution, assuming microseconds");
            format::ticks_per_second(format::DEFAULT_TSRESOL).unwrap_or(1_000_000)
        });
        Self {
            linktype,
            ticks_per_second,
            offset,
        }
    }
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut file = File::open(path)?;
        let reader = if format::sniff_pcapng(&mut file)? {
            let reader = PcapNGReader::new(format::READER_BUFFER_SIZE, file)
                .map_err(|e| SourceError::pcap("pcapng reader init", e))?;
            Reader::Ng {
                reader,
                interfaces: Vec::new(),
            }
        } else {
            let reader = LegacyPcapReader::new(format::READER_BUFFER_SIZE, file)
                .map_err(|e| SourceError::pcap("pcap reader init", e))?;
            Reader::Legacy {
                reader,
                linktype: Linktype::ETHERNET,
                nanosecond: false,
            }
        };
        debug!(
            path = %path.display(),
            pcapng = matches!(reader, Reader::Ng { .. }),
            "opened capture"
        );
        Ok(Self { reader })
    }
}

impl PacketSource for PcapFileSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        loop {
            let step = match &mut self.reader {
                Reader::Legacy {
                    reader,
                    linktype,
                    nanosecond,
                } => match reader.next() {
                    Ok((offset, block)) => {
                        let event = legacy_block(block, linktype, nanosecond);
                        reader.consume(offset);
                        Step::Block(event)
                    }
                    Err(err) => Step::from(err),
                },
                Reader::Ng { reader, interfaces } => match reader.next() {
                    Ok((offset, block)) => {
                        let event = ng_block(block, interfaces);
                        reader.consume(offset);
                        Step::Block(event)
                    }
                    Err(err) => Step::from(err),
                },
            };

            match step {
                Step::Block(Some(event)) => return Ok(Some(event)),
                Step::Block(None) => {}
                Step::Eof => return Ok(None),
                Step::Incomplete => self.refill()?,
                Step::Failed(message) => {
                    return Err(SourceError::Pcap {
                        context: self.context(false),
                        message,
                    });
                }
            }
        }
    }
}

/// Outcome of one reader step, detached from the reader's buffer.
enum Step {
    Block(Option<PacketEvent>),
    Eof,
    Incomplete,
    Failed(String),
}

impl<'a> From<PcapError<&'a [u8]>> for Step {
    fn from(err: PcapError<&'a [u8]>) -> Self {
        match err {
            PcapError::Eof => Step::Eof,
            PcapError::Incomplete(_) => Step::Incomplete,
            other => Step::Failed(other.to_string()),
        }
    }
}

impl PcapFileSource {
    fn refill(&mut self) -> Result<(), SourceError> {
        let context = self.context(true);
        let result = match &mut self.reader {
            Reader::Legacy { reader, .. } => reader.refill(),
            Reader::Ng { reader, .. } => reader.refill(),
        };
        result.map_err(|e| SourceError::pcap(context, e))
    }

    fn context(&self, refill: bool) -> &'static str {
        match (&self.reader, refill) {
            (Reader::Legacy { .. }, false) => "pcap reader next",
            (Reader::Legacy { .. }, true) => "pcap reader refill",
            (Reader::Ng { .. }, false) => "pcapng reader next",
            (Reader::Ng { .. }, true) => "pcapng reader refill",
        }
    }
}

fn legacy_block(
    block: PcapBlockOwned<'_>,
    linktype: &mut Linktype,
    nanosecond: &mut bool,
) -> Option<PacketEvent> {
    match block {
        PcapBlockOwned::LegacyHeader(header) => {
            debug!(
                linktype = header.network.0,
                nanosecond = header.is_nanosecond_precision(),
                "pcap header"
            );
            *linktype = header.network;
            *nanosecond = header.is_nanosecond_precision();
            None
        }
        PcapBlockOwned::Legacy(packet) => Some(PacketEvent {
            ts: Some(format::legacy_seconds(
                packet.ts_sec,
                packet.ts_usec,
                *nanosecond,
            )),
            linktype: *linktype,
            data: packet.data.to_vec(),
        }),
        _ => None,
    }
}

fn ng_block(block: PcapBlockOwned<'_>, interfaces: &mut Vec<Interface>) -> Option<PacketEvent> {
    let PcapBlockOwned::NG(block) = block else {
        return None;
    };
    match block {
        Block::SectionHeader(_) => {
            // Interface ids restart with every section.
            interfaces.clear();
            None
        }
        Block::InterfaceDescription(idb) => {
            let interface = Interface::from_block(idb.linktype, idb.if_tsresol, idb.if_tsoffset);
            debug!(
                interface = interfaces.len(),
                linktype = idb.linktype.0,
                ticks_per_second = interface.ticks_per_second,
                "pcapng interface"
            );
            interfaces.push(interface);
            None
        }
        Block::EnhancedPacket(epb) => {
            let interface = interface_for(interfaces, epb.if_id);
            Some(PacketEvent {
                ts: Some(format::pcapng_seconds(
                    epb.ts_high,
                    epb.ts_low,
                    interface.ticks_per_second,
                    interface.offset,
                )),
                linktype: interface.linktype,
                data: epb.data.to_vec(),
            })
        }
        Block::SimplePacket(spb) => Some(PacketEvent {
            ts: None,
            linktype: interface_for(interfaces, 0).linktype,
            data: spb.data.to_vec(),
        }),
        _ => {
            trace!("skipping pcapng block");
            None
        }
    }
}

/// Interface description for `if_id`; unknown ids fall back to Ethernet.
fn interface_for(interfaces: &[Interface], if_id: u32) -> Interface {
    interfaces
        .get(if_id as usize)
        .copied()
        .unwrap_or_else(|| {
            debug!(if_id, "packet references undeclared interface");
            Interface::from_block(Linktype::ETHERNET, format::DEFAULT_TSRESOL, 0)
        })
}
