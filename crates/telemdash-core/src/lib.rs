//! telemdash core library: racing-game UDP telemetry decoding.
//!
//! Two protocols feed one normalized model:
//! - F1 2020 car telemetry, a fixed little-endian binary layout
//!   (`protocols::f1`);
//! - Project CARS 2, either JSON relayed by a forwarder or a heuristically
//!   decoded legacy binary broadcast (`protocols::pcars`).
//!
//! Protocol modules follow a layout/reader/parser split: layouts hold byte
//! offsets, readers do bounds-checked extraction, parsers build typed records.
//! Decoders in `telemetry` apply those records to a [`TelemetrySnapshot`] and
//! track freshness against a per-protocol staleness window. Capture replay in
//! `replay` drives the same decoders from PCAP/PCAPNG files and produces a
//! deterministic [`ReplayReport`].
//!
//! Invariants:
//! - Untrusted bytes never panic a decoder; failures are returned values.
//! - A failed decode never touches the snapshot or its freshness timestamp.
//! - Validity is a function of the caller-supplied clock reading only.
//!
//! # Examples
//! ```
//! use std::time::Duration;
//!
//! use telemdash_core::{PcarsDecoder, TelemetryDecoder};
//!
//! let mut decoder = PcarsDecoder::default();
//! decoder.decode(br#"{"speed": 142.0, "gear": 4}"#, Duration::from_secs(1))?;
//! let snapshot = decoder.snapshot(Duration::from_secs(2));
//! assert!(snapshot.valid);
//! assert_eq!(snapshot.gear, 4);
//! # Ok::<(), telemdash_core::DecodeError>(())
//! ```

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

pub mod config;
#[doc(hidden)]
pub mod fixtures;
pub mod protocols;
pub mod replay;
pub mod source;
pub mod telemetry;

pub use config::{ConfigError, TelemetryConfig};
pub use replay::{ReplayError, replay_capture_file, replay_source};
pub use source::{CaptureFileSource, CaptureFrame, FrameSource, SourceError};
pub use telemetry::{
    Clock, Dashboard, DecodeError, DecodeOutcome, DisplayTelemetry, F1Decoder, Freshness,
    ManualClock, MonotonicClock, PcarsDecoder, Protocol, SourceKind, TelemetryDecoder,
    TelemetrySnapshot,
};

/// Current replay report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Timestamp used when the capture carries no time information.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// One received datagram, borrowed for the duration of a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPacket<'a> {
    pub payload: &'a [u8],
    pub source: SocketAddr,
}

impl<'a> RawPacket<'a> {
    pub fn new(payload: &'a [u8], source: SocketAddr) -> Self {
        Self { payload, source }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Result of replaying a capture through both decoders.
///
/// # Examples
/// ```
/// use telemdash_core::make_stub_report;
///
/// let report = make_stub_report("session.pcapng", 4096);
/// assert_eq!(report.report_version, telemdash_core::REPORT_VERSION);
/// assert!(report.streams.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 time of the last captured frame, or the epoch.
    pub generated_at: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// One entry per protocol, F1 first.
    pub streams: Vec<StreamSummary>,
    /// Datagram counts per sender and listener, sorted by endpoint.
    pub sources: Vec<SourceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the replay.
    pub path: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Frames read from the capture, UDP or not.
    pub packets_total: u64,
    pub udp_datagrams: u64,
    /// UDP datagrams whose destination port matches no listener.
    pub unrouted_datagrams: u64,
    /// Frames that could not be sliced into a UDP datagram.
    pub malformed_frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Decoding outcome counts for one protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSummary {
    pub protocol: Protocol,
    pub packets: u64,
    pub decoded: u64,
    /// Well-formed packets of types the decoder does not consume.
    pub ignored: u64,
    pub rejected: u64,
    /// Datagrams cut down to the configured receive buffer size.
    pub truncated: u64,
    /// Rejection counts by stable error id, sorted by id.
    pub rejections: Vec<RejectionSummary>,
    /// Whether the snapshot was still fresh at the last captured frame.
    pub valid_at_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_snapshot: Option<TelemetrySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionSummary {
    /// Stable identifier, e.g. `TD-F1-UNSUPPORTED-FORMAT`.
    pub id: String,
    pub count: u64,
    /// First rejection message seen for this id.
    pub example: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub protocol: Protocol,
    /// Sender in `ip:port` form.
    pub src: String,
    /// Listener in `ip:port` form.
    pub dst: String,
    pub packets: u64,
    pub bytes: u64,
}

/// Build a report with base fields filled and no replay results.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> ReplayReport {
    ReplayReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "telemdash".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        streams: vec![],
        sources: vec![],
    }
}
