//! Capture decoding pipeline: packet source -> decoder chain -> report.

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info, warn};

use crate::decoder::{DecodeOptions, PacketDecoder};
use crate::layer::ProtocolKind;
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{
    CaptureSummary, DEFAULT_GENERATED_AT, LayerSummary, PacketSummary, Report, make_stub_report,
};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn decode_capture_file(path: &Path, options: &DecodeOptions) -> Result<Report, CaptureError> {
    let source = PcapFileSource::open(path)?;
    decode_source(path, source, options)
}

pub fn decode_source<S: PacketSource>(
    path: &Path,
    mut source: S,
    options: &DecodeOptions,
) -> Result<Report, CaptureError> {
    let decoder = PacketDecoder::new(options.clone());
    let mut summary = CaptureSummary::default();
    let mut first_ts = None;
    let mut last_ts = None;
    let mut protocols: BTreeMap<ProtocolKind, u64> = BTreeMap::new();
    let mut packets = Vec::new();

    while let Some(event) = source.next_packet()? {
        let index = summary.packets_total;
        summary.packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, event.ts);

        let packet = decode_packet(&decoder, index, event);
        match (&packet.link_type, &packet.error) {
            (None, _) => summary.packets_unsupported += 1,
            (Some(_), Some(_)) => summary.packets_failed += 1,
            (Some(_), None) => {
                summary.packets_decoded += 1;
                for layer in &packet.layers {
                    *protocols.entry(layer.kind).or_default() += 1;
                }
            }
        }
        packets.push(packet);
    }
    info!(
        total = summary.packets_total,
        decoded = summary.packets_decoded,
        failed = summary.packets_failed,
        unsupported = summary.packets_unsupported,
        "capture decoded"
    );

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    summary.time_start = ts_to_rfc3339(first_ts);
    summary.time_end = ts_to_rfc3339(last_ts);
    report.generated_at = summary
        .time_end
        .clone()
        .or(summary.time_start.clone())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.capture_summary = Some(summary);
    report.protocols = protocols;
    report.packets = packets;
    Ok(report)
}

fn decode_packet(decoder: &PacketDecoder, index: u64, event: PacketEvent) -> PacketSummary {
    let link_type = event.link_type();
    let mut packet = PacketSummary {
        index,
        timestamp: ts_to_rfc3339(event.ts),
        link_type,
        captured_len: event.data.len(),
        layers: Vec::new(),
        error: None,
    };

    let Some(link) = link_type else {
        debug!(index, linktype = event.linktype.0, "no decoder for link type");
        packet.error = Some(format!("unsupported link type {}", event.linktype.0));
        return packet;
    };
    match decoder.decode_bytes(link, Bytes::from(event.data)) {
        Ok(root) => packet.layers = root.iter().map(LayerSummary::from).collect(),
        Err(err) => {
            warn!(index, layer = %err.layer(), %err, "packet failed to decode");
            packet.error = Some(err.to_string());
        }
    }
    packet
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
