use serde::{Deserialize, Deserializer, Serialize};

use super::error::PcarsError;
use super::layout;
use super::reader::PcarsReader;

/// Forwarder JSON document. Every key is optional; unknown keys are ignored.
///
/// The document is a delta: a missing key means "unchanged", not "zero".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForwarderRecord {
    /// km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(
        default,
        deserialize_with = "truncated_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub gear: Option<i64>,
    #[serde(
        default,
        deserialize_with = "truncated_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub rpm: Option<i64>,
    /// Percent, 0.0..=100.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<f32>,
    /// Seconds
    #[serde(
        default,
        rename = "lapTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub lap_time: Option<f32>,
}

/// Integers may arrive as JSON floats; the fractional part is dropped.
fn truncated_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|v| v as i64))
}

/// Fields extracted from a legacy binary packet at estimated offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegacyRecord {
    pub build_version: u32,
    pub packet_type: u8,
    pub speed_ms: f32,
    pub rpm: f32,
    pub max_rpm: f32,
    pub gear: i8,
    pub fuel_level: f32,
    pub last_lap_time: f32,
}

/// Parse a forwarder JSON payload.
///
/// Input beyond `max_len` bytes is dropped before parsing to bound the parse
/// cost. Only the first JSON value is read; trailing bytes are ignored.
///
/// # Examples
/// ```
/// use telemdash_core::protocols::pcars::parse_forwarder_json;
///
/// let record = parse_forwarder_json(br#"{"gear": 3}"#, 512)?;
/// assert_eq!(record.gear, Some(3));
/// assert_eq!(record.speed, None);
/// # Ok::<(), telemdash_core::protocols::pcars::PcarsError>(())
/// ```
pub fn parse_forwarder_json(payload: &[u8], max_len: usize) -> Result<ForwarderRecord, PcarsError> {
    let reader = PcarsReader::new(payload);
    let document = reader.truncated(max_len);
    let mut values = serde_json::Deserializer::from_slice(document).into_iter::<ForwarderRecord>();
    match values.next() {
        Some(Ok(record)) => Ok(record),
        Some(Err(err)) => Err(PcarsError::Parse(err.to_string())),
        None => Err(PcarsError::Parse("empty document".to_string())),
    }
}

/// Best-effort extraction from a legacy binary packet.
///
/// The build version is the only structural signal available; everything
/// else is read at estimated offsets and rejected wholesale when any value
/// falls outside its plausibility range.
pub fn parse_legacy_binary(payload: &[u8]) -> Result<LegacyRecord, PcarsError> {
    let reader = PcarsReader::new(payload);
    if reader.len() < layout::LEGACY_MIN_LEN {
        return Err(PcarsError::TooSmallForLegacyBinary {
            needed: layout::LEGACY_MIN_LEN,
            actual: reader.len(),
        });
    }

    let build_version = reader.read_u32_le(layout::BUILD_VERSION_RANGE)?;
    if !layout::PLAUSIBLE_BUILD_VERSIONS.contains(&build_version) {
        return Err(PcarsError::ImplausibleVersion {
            version: build_version,
        });
    }

    if reader.len() < layout::LEGACY_FIELDS_MIN_LEN {
        return Err(PcarsError::TooSmallToExtractFields {
            needed: layout::LEGACY_FIELDS_MIN_LEN,
            actual: reader.len(),
        });
    }

    let speed_ms = reader.read_f32_le(layout::SPEED_RANGE)?;
    let rpm = reader.read_f32_le(layout::RPM_RANGE)?;
    let gear = reader.read_i8(layout::GEAR_OFFSET)?;

    // `contains` is false for NaN, so NaN fields are rejected too.
    if !layout::PLAUSIBLE_SPEED_MS.contains(&speed_ms)
        || !layout::PLAUSIBLE_RPM.contains(&rpm)
        || !layout::PLAUSIBLE_GEAR.contains(&gear)
    {
        return Err(PcarsError::ImplausibleValues {
            speed_ms,
            rpm,
            gear,
        });
    }

    Ok(LegacyRecord {
        build_version,
        packet_type: reader.read_u8(layout::PACKET_TYPE_OFFSET)?,
        speed_ms,
        rpm,
        max_rpm: reader.read_f32_le(layout::MAX_RPM_RANGE)?,
        gear,
        fuel_level: reader.read_f32_le(layout::FUEL_LEVEL_RANGE)?,
        last_lap_time: reader.read_f32_le(layout::LAST_LAP_TIME_RANGE)?,
    })
}
