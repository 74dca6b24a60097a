//! Capture replay: drive both decoders from a recorded session.
//!
//! Frames are sliced into UDP datagrams, routed to a decoder by destination
//! port and decoded against a clock that follows capture time, so freshness
//! behaves as it did live. The result is a deterministic [`ReplayReport`].

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};

use crate::config::{ConfigError, TelemetryConfig};
use crate::source::{CaptureFileSource, CaptureFrame, FrameSource, SourceError};
use crate::telemetry::{Clock, F1Decoder, ManualClock, PcarsDecoder, Protocol, TelemetryDecoder};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, ReplayReport, make_stub_report};

mod sources;
mod streams;
pub mod udp;

use sources::{SourceKey, add_source_stats, build_source_summaries};
use streams::Streams;
use udp::parse_udp_datagram;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub fn replay_capture_file(
    path: &Path,
    config: &TelemetryConfig,
) -> Result<ReplayReport, ReplayError> {
    let bytes = path.metadata()?.len();
    let source = CaptureFileSource::open(path)?;
    replay_source(&path.display().to_string(), bytes, source, config)
}

/// Replay frames from any source. `input_path` and `input_bytes` only label
/// the report.
pub fn replay_source<S: FrameSource>(
    input_path: &str,
    input_bytes: u64,
    mut source: S,
    config: &TelemetryConfig,
) -> Result<ReplayReport, ReplayError> {
    config.validate()?;

    let mut f1 = F1Decoder::new(config.f1_stale_after());
    let mut pcars = PcarsDecoder::new(config.pcars_stale_after(), config.max_json_len);
    let clock = ManualClock::default();
    let mut streams = Streams::default();
    let mut source_stats = HashMap::new();

    let mut packets_total = 0u64;
    let mut udp_datagrams = 0u64;
    let mut unrouted_datagrams = 0u64;
    let mut malformed_frames = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut origin = None;

    while let Some(CaptureFrame { ts, linktype, data }) = source.next_frame()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        if let Some(ts) = ts {
            let start = *origin.get_or_insert(ts);
            clock.set(capture_offset(start, ts));
        }

        let datagram = match parse_udp_datagram(linktype, &data) {
            Ok(Some(datagram)) => datagram,
            Ok(None) => continue,
            Err(err) => {
                malformed_frames += 1;
                debug!(frame = packets_total, "skipping frame: {err}");
                continue;
            }
        };
        udp_datagrams += 1;

        let Some(protocol) = Protocol::for_port(datagram.destination.port(), config) else {
            unrouted_datagrams += 1;
            continue;
        };

        let payload_len = datagram.payload.len().min(config.max_packet_len);
        let payload = &datagram.payload[..payload_len];
        add_source_stats(
            &mut source_stats,
            SourceKey {
                protocol,
                src: datagram.source,
                dst: datagram.destination,
            },
            payload.len(),
        );

        let decoder: &mut dyn TelemetryDecoder = match protocol {
            Protocol::F1 => &mut f1,
            Protocol::Pcars => &mut pcars,
        };
        let result = decoder.decode(payload, clock.now());
        let stats = streams.get_mut(protocol);
        if payload_len < datagram.payload.len() {
            stats.truncated += 1;
        }
        stats.record(&result);
    }

    let mut report = make_stub_report(input_path, input_bytes);
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        udp_datagrams,
        unrouted_datagrams,
        malformed_frames,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    let end = clock.now();
    report.streams = streams
        .into_parts()
        .into_iter()
        .map(|(protocol, stats)| {
            let decoder: &dyn TelemetryDecoder = match protocol {
                Protocol::F1 => &f1,
                Protocol::Pcars => &pcars,
            };
            stats.into_summary(decoder, end)
        })
        .collect();
    report.sources = build_source_summaries(source_stats);

    for stream in &report.streams {
        info!(
            protocol = stream.protocol.label(),
            packets = stream.packets,
            decoded = stream.decoded,
            ignored = stream.ignored,
            rejected = stream.rejected,
            valid_at_end = stream.valid_at_end,
            "replayed stream"
        );
    }
    Ok(report)
}

fn capture_offset(start: f64, ts: f64) -> Duration {
    Duration::try_from_secs_f64(ts - start).unwrap_or(Duration::ZERO)
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

#[cfg(test)]
mod tests {
    use super::{capture_offset, ts_to_rfc3339, update_ts_bounds};
    use std::time::Duration;

    #[test]
    fn ts_bounds_track_min_and_max() {
        let mut first = None;
        let mut last = None;
        for ts in [Some(5.0), None, Some(3.0), Some(9.0)] {
            update_ts_bounds(&mut first, &mut last, ts);
        }
        assert_eq!(first, Some(3.0));
        assert_eq!(last, Some(9.0));
    }

    #[test]
    fn offset_before_start_clamps_to_zero() {
        assert_eq!(capture_offset(10.0, 9.5), Duration::ZERO);
        assert_eq!(capture_offset(10.0, 12.5), Duration::from_millis(2500));
    }

    #[test]
    fn rfc3339_formatting() {
        assert_eq!(
            ts_to_rfc3339(Some(1_600_000_000.0)).as_deref(),
            Some("2020-09-13T12:26:40Z")
        );
        assert_eq!(ts_to_rfc3339(None), None);
    }
}
