use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocols::f1::CarTelemetryRecord;
use crate::protocols::pcars::{ForwarderRecord, LegacyRecord, layout as pcars_layout};

/// Lowest gear a snapshot holds (reverse).
pub const MIN_GEAR: i8 = -1;
/// Highest gear a snapshot holds.
pub const MAX_GEAR: i8 = 8;
pub const MAX_FUEL_PERCENT: f32 = 100.0;

/// Where the values in a snapshot came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Nothing decoded yet.
    #[default]
    None,
    /// The game's own binary broadcast (F1).
    Native,
    /// JSON relayed by a forwarder (PCARS).
    Forwarder,
    /// PCARS legacy binary broadcast, decoded heuristically.
    LegacyBinary,
}

/// Normalized telemetry shared by both protocols.
///
/// Fields keep their last decoded values when data goes stale; only `valid`
/// reflects freshness.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub speed_kmh: f32,
    /// -1 = reverse, 0 = neutral
    pub gear: i8,
    pub rpm: u32,
    /// 0.0..=1.0, F1 only
    pub throttle: f32,
    /// 0.0..=1.0, F1 only
    pub brake: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_percent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_time_s: Option<f32>,
    /// Set from freshness on the copy a decoder hands out; false in storage.
    pub valid: bool,
    /// Clock reading of the last successful decode.
    #[serde(skip)]
    pub updated_at: Option<Duration>,
    pub source: SourceKind,
}

impl TelemetrySnapshot {
    /// Fuel and lap time are not part of F1 car telemetry and are left alone.
    pub(crate) fn apply_car_telemetry(&mut self, record: &CarTelemetryRecord) {
        self.speed_kmh = f32::from(record.speed);
        self.gear = record.gear;
        self.rpm = u32::from(record.engine_rpm);
        self.throttle = record.throttle;
        self.brake = record.brake;
    }

    /// Forwarder values are clamped into the snapshot ranges.
    pub(crate) fn apply_forwarder(&mut self, record: &ForwarderRecord) {
        if let Some(speed) = record.speed {
            self.speed_kmh = speed.clamp(0.0, f32::MAX);
        }
        if let Some(gear) = record.gear {
            self.gear = gear.clamp(i64::from(MIN_GEAR), i64::from(MAX_GEAR)) as i8;
        }
        if let Some(rpm) = record.rpm {
            self.rpm = rpm.clamp(0, i64::from(u32::MAX)) as u32;
        }
        if let Some(fuel) = record.fuel {
            self.fuel_percent = Some(fuel.clamp(0.0, MAX_FUEL_PERCENT));
        }
        if let Some(lap_time) = record.lap_time {
            self.lap_time_s = Some(lap_time.clamp(0.0, f32::MAX));
        }
    }

    pub(crate) fn apply_legacy(&mut self, record: &LegacyRecord) {
        self.speed_kmh = record.speed_ms * pcars_layout::MS_TO_KMH;
        self.rpm = record.rpm as u32;
        self.gear = record.gear;
        self.fuel_percent = Some(pcars_layout::LEGACY_FUEL_PLACEHOLDER_PERCENT);
        self.lap_time_s = Some(pcars_layout::LEGACY_LAP_TIME_PLACEHOLDER);
    }

    pub(crate) fn mark_decoded(&mut self, now: Duration, source: SourceKind) {
        self.updated_at = Some(now);
        self.source = source;
    }
}
