use std::time::Duration;

use tracing::trace;

use super::freshness::{DEFAULT_F1_STALE_AFTER, Freshness};
use super::snapshot::{SourceKind, TelemetrySnapshot};
use super::{DecodeError, DecodeOutcome, Protocol, TelemetryDecoder, rejected};
use crate::protocols::f1::{F1Packet, parse_packet};

/// Decoder for F1 2020 car telemetry broadcasts.
#[derive(Debug, Clone)]
pub struct F1Decoder {
    snapshot: TelemetrySnapshot,
    freshness: Freshness,
}

impl F1Decoder {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            snapshot: TelemetrySnapshot::default(),
            freshness: Freshness::new(stale_after),
        }
    }
}

impl Default for F1Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_F1_STALE_AFTER)
    }
}

impl TelemetryDecoder for F1Decoder {
    fn protocol(&self) -> Protocol {
        Protocol::F1
    }

    fn decode(&mut self, payload: &[u8], now: Duration) -> Result<DecodeOutcome, DecodeError> {
        let packet = parse_packet(payload).map_err(|err| rejected(Protocol::F1, payload.len(), err))?;
        match packet {
            F1Packet::Other(header) => {
                trace!(packet_id = header.packet_id, "ignored F1 packet");
                Ok(DecodeOutcome::Ignored {
                    packet_id: header.packet_id,
                })
            }
            F1Packet::CarTelemetry(packet) => {
                self.snapshot.apply_car_telemetry(&packet.player);
                self.snapshot.mark_decoded(now, SourceKind::Native);
                self.freshness.stamp(now);
                trace!(
                    frame = packet.header.frame_identifier,
                    speed = packet.player.speed,
                    gear = packet.player.gear,
                    rpm = packet.player.engine_rpm,
                    "decoded F1 car telemetry"
                );
                Ok(DecodeOutcome::Updated(SourceKind::Native))
            }
        }
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
