use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;

use super::f1::F1Decoder;
use super::pcars::PcarsDecoder;
use super::snapshot::{SourceKind, TelemetrySnapshot};
use super::{DecodeError, DecodeOutcome, Protocol, TelemetryDecoder};
use crate::RawPacket;
use crate::config::TelemetryConfig;

/// What the display shows: the active game's snapshot plus packet diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayTelemetry {
    pub protocol: Protocol,
    pub snapshot: TelemetrySnapshot,
    /// Milliseconds since the last successful decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_ms: Option<u64>,
    /// Label of the last decoded packet, e.g. `"F1 CarTelemetry"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_packet_type: Option<&'static str>,
    pub last_packet_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_source: Option<SocketAddr>,
}

/// Consumer side: owns both decoders and feeds only the active one.
#[derive(Debug, Clone)]
pub struct Dashboard {
    active: Protocol,
    f1: F1Decoder,
    pcars: PcarsDecoder,
    last_packet_type: Option<&'static str>,
    last_packet_len: usize,
    last_source: Option<SocketAddr>,
}

impl Dashboard {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            active: Protocol::F1,
            f1: F1Decoder::new(config.f1_stale_after()),
            pcars: PcarsDecoder::new(config.pcars_stale_after(), config.max_json_len),
            last_packet_type: None,
            last_packet_len: 0,
            last_source: None,
        }
    }

    pub fn active(&self) -> Protocol {
        self.active
    }

    pub fn set_active(&mut self, protocol: Protocol) {
        self.active = protocol;
    }

    /// Switch between F1 and PCARS, returning the newly active protocol.
    pub fn toggle_game(&mut self) -> Protocol {
        self.active = self.active.other();
        self.active
    }

    pub fn decoder(&self, protocol: Protocol) -> &dyn TelemetryDecoder {
        match protocol {
            Protocol::F1 => &self.f1,
            Protocol::Pcars => &self.pcars,
        }
    }

    fn decoder_mut(&mut self, protocol: Protocol) -> &mut dyn TelemetryDecoder {
        match protocol {
            Protocol::F1 => &mut self.f1,
            Protocol::Pcars => &mut self.pcars,
        }
    }

    /// Decode a datagram received on the active game's listener.
    ///
    /// Size and source are recorded for every packet; the packet label only
    /// changes on a successful decode.
    pub fn ingest(
        &mut self,
        packet: RawPacket<'_>,
        now: Duration,
    ) -> Result<DecodeOutcome, DecodeError> {
        self.last_packet_len = packet.len();
        self.last_source = Some(packet.source);
        let outcome = self.decoder_mut(self.active).decode(packet.payload, now)?;
        if let DecodeOutcome::Updated(source) = outcome {
            self.last_packet_type = Some(packet_label(source));
        }
        Ok(outcome)
    }

    pub fn display(&self, now: Duration) -> DisplayTelemetry {
        let decoder = self.decoder(self.active);
        DisplayTelemetry {
            protocol: self.active,
            snapshot: decoder.snapshot(now),
            age_ms: decoder
                .freshness()
                .age(now)
                .map(|age| age.as_millis() as u64),
            last_packet_type: self.last_packet_type,
            last_packet_len: self.last_packet_len,
            last_source: self.last_source,
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}

fn packet_label(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Native => "F1 CarTelemetry",
        SourceKind::Forwarder => "PCARS JSON",
        SourceKind::LegacyBinary => "PCARS UDP",
        SourceKind::None => "None",
    }
}

#[cfg(test)]
mod tests {
    use super::Dashboard;
    use crate::RawPacket;
    use crate::protocols::f1::{
        CarTelemetryRecord, CarTelemetryTrailer, F1Header, write_car_telemetry,
    };
    use crate::telemetry::{Protocol, SourceKind};
    use std::net::SocketAddr;
    use std::time::Duration;

    fn source() -> SocketAddr {
        "192.168.1.20:51000".parse().unwrap()
    }

    fn f1_packet(speed: u16) -> Vec<u8> {
        let car = CarTelemetryRecord {
            speed,
            gear: 6,
            engine_rpm: 10500,
            ..CarTelemetryRecord::default()
        };
        write_car_telemetry(
            &F1Header::car_telemetry(0, 9, 1.0),
            &[car],
            &CarTelemetryTrailer::default(),
        )
    }

    #[test]
    fn ingest_routes_to_active_game_only() {
        let mut dashboard = Dashboard::default();
        assert_eq!(dashboard.active(), Protocol::F1);

        let bytes = f1_packet(210);
        dashboard
            .ingest(RawPacket::new(&bytes, source()), Duration::from_secs(1))
            .unwrap();
        let display = dashboard.display(Duration::from_secs(1));
        assert_eq!(display.snapshot.speed_kmh, 210.0);
        assert_eq!(display.last_packet_type, Some("F1 CarTelemetry"));
        assert_eq!(display.last_packet_len, bytes.len());
        assert_eq!(display.last_source, Some(source()));
        assert_eq!(display.age_ms, Some(0));

        assert_eq!(dashboard.toggle_game(), Protocol::Pcars);
        let display = dashboard.display(Duration::from_secs(1));
        assert_eq!(display.snapshot.source, SourceKind::None);
        assert!(!display.snapshot.valid);
    }

    #[test]
    fn failed_packet_records_size_but_not_label() {
        let mut dashboard = Dashboard::default();
        dashboard.set_active(Protocol::Pcars);
        dashboard
            .ingest(
                RawPacket::new(br#"{"speed":88.0}"#, source()),
                Duration::from_secs(1),
            )
            .unwrap();
        assert!(
            dashboard
                .ingest(RawPacket::new(br#"{"speed":"#, source()), Duration::from_secs(2))
                .is_err()
        );
        let display = dashboard.display(Duration::from_secs(2));
        assert_eq!(display.last_packet_type, Some("PCARS JSON"));
        assert_eq!(display.last_packet_len, 9);
        assert_eq!(display.snapshot.speed_kmh, 88.0);
        assert!(display.snapshot.valid);
    }

    #[test]
    fn display_validity_uses_active_protocol_window() {
        let mut dashboard = Dashboard::default();
        dashboard.set_active(Protocol::Pcars);
        dashboard
            .ingest(RawPacket::new(br#"{"gear":2}"#, source()), Duration::ZERO)
            .unwrap();
        assert!(dashboard.display(Duration::from_millis(4999)).snapshot.valid);
        assert!(!dashboard.display(Duration::from_secs(5)).snapshot.valid);
    }
}
