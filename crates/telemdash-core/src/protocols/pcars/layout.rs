//! Project CARS 2 payload constants.
//!
//! The legacy binary offsets below are estimates taken from community
//! reverse engineering, not from a published layout. They are expected to be
//! wrong for some game builds and packet types; correct them here only.

use std::ops::{Range, RangeInclusive};

// Forwarder JSON classification.
pub const JSON_OPEN_BRACE: u8 = b'{';
pub const CLASSIFY_SAMPLE_LEN: usize = 50;
/// Printable share of the sample, as `NUMERATOR / DENOMINATOR`, that must be
/// strictly exceeded to classify as JSON.
pub const JSON_PRINTABLE_NUMERATOR: usize = 4;
pub const JSON_PRINTABLE_DENOMINATOR: usize = 5;
pub const DEFAULT_MAX_JSON_LEN: usize = 512;

// Legacy binary packets.
pub const LEGACY_MIN_LEN: usize = 100;
pub const LEGACY_FIELDS_MIN_LEN: usize = 40;
pub const BUILD_VERSION_RANGE: Range<usize> = 0..4;
pub const PLAUSIBLE_BUILD_VERSIONS: Range<u32> = 1000..10000;
pub const PACKET_TYPE_OFFSET: usize = 4;
/// m/s, estimated offset.
pub const SPEED_RANGE: Range<usize> = 16..20;
/// Estimated offset.
pub const RPM_RANGE: Range<usize> = 24..28;
/// Estimated offset.
pub const MAX_RPM_RANGE: Range<usize> = 28..32;
/// Estimated offset.
pub const GEAR_OFFSET: usize = 32;
/// 0.0..=1.0, estimated offset; not used for the snapshot.
pub const FUEL_LEVEL_RANGE: Range<usize> = 40..44;
/// Seconds, estimated offset; not used for the snapshot.
pub const LAST_LAP_TIME_RANGE: Range<usize> = 48..52;

pub const PLAUSIBLE_SPEED_MS: RangeInclusive<f32> = 0.0..=200.0;
pub const PLAUSIBLE_RPM: RangeInclusive<f32> = 0.0..=20000.0;
pub const PLAUSIBLE_GEAR: RangeInclusive<i8> = -1..=8;

pub const MS_TO_KMH: f32 = 3.6;
/// Fuel shown for legacy binary data, which exposes no reliable fuel field.
pub const LEGACY_FUEL_PLACEHOLDER_PERCENT: f32 = 50.0;
pub const LEGACY_LAP_TIME_PLACEHOLDER: f32 = 0.0;
