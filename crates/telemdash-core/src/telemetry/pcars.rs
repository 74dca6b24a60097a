use std::time::Duration;

use tracing::trace;

use super::freshness::{DEFAULT_PCARS_STALE_AFTER, Freshness};
use super::snapshot::{SourceKind, TelemetrySnapshot};
use super::{DecodeError, DecodeOutcome, Protocol, TelemetryDecoder, rejected};
use crate::protocols::pcars::layout::DEFAULT_MAX_JSON_LEN;
use crate::protocols::pcars::{PayloadFormat, classify, parse_forwarder_json, parse_legacy_binary};

/// Decoder for Project CARS 2 data, either forwarder JSON or the legacy
/// binary broadcast.
///
/// The legacy path is heuristic: its offsets are estimates and a packet is
/// only accepted when speed, RPM and gear all look plausible.
#[derive(Debug, Clone)]
pub struct PcarsDecoder {
    snapshot: TelemetrySnapshot,
    freshness: Freshness,
    max_json_len: usize,
}

impl PcarsDecoder {
    pub fn new(stale_after: Duration, max_json_len: usize) -> Self {
        Self {
            snapshot: TelemetrySnapshot::default(),
            freshness: Freshness::new(stale_after),
            max_json_len,
        }
    }

    fn decode_json(&mut self, payload: &[u8]) -> Result<SourceKind, DecodeError> {
        let record = parse_forwarder_json(payload, self.max_json_len)
            .map_err(|err| rejected(Protocol::Pcars, payload.len(), err))?;
        self.snapshot.apply_forwarder(&record);
        trace!(?record, "decoded PCARS forwarder JSON");
        Ok(SourceKind::Forwarder)
    }

    fn decode_legacy(&mut self, payload: &[u8]) -> Result<SourceKind, DecodeError> {
        let record = parse_legacy_binary(payload)
            .map_err(|err| rejected(Protocol::Pcars, payload.len(), err))?;
        self.snapshot.apply_legacy(&record);
        trace!(
            build = record.build_version,
            speed_ms = record.speed_ms,
            rpm = record.rpm,
            gear = record.gear,
            "decoded PCARS legacy binary"
        );
        Ok(SourceKind::LegacyBinary)
    }
}

impl Default for PcarsDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_PCARS_STALE_AFTER, DEFAULT_MAX_JSON_LEN)
    }
}

impl TelemetryDecoder for PcarsDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Pcars
    }

    fn decode(&mut self, payload: &[u8], now: Duration) -> Result<DecodeOutcome, DecodeError> {
        let source = match classify(payload) {
            PayloadFormat::Json => self.decode_json(payload)?,
            PayloadFormat::LegacyBinary => self.decode_legacy(payload)?,
        };
        self.snapshot.mark_decoded(now, source);
        self.freshness.stamp(now);
        Ok(DecodeOutcome::Updated(source))
    }

    fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    fn snapshot(&self, now: Duration) -> TelemetrySnapshot {
        TelemetrySnapshot {
            valid: self.is_valid(now),
            ..self.snapshot
        }
    }
}
