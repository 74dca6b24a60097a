//! F1 2020 car telemetry wire layout (little-endian, packed).

use std::ops::Range;

pub const PACKET_FORMAT_2020: u16 = 2020;
pub const PACKET_ID_CAR_TELEMETRY: u8 = 6;
pub const MAX_CARS: usize = 22;
pub const CORNERS: usize = 4;

// Header, offsets from the start of the datagram.
pub const HEADER_LEN: usize = 25;
pub const FORMAT_RANGE: Range<usize> = 0..2;
pub const GAME_MAJOR_VERSION_OFFSET: usize = 2;
pub const GAME_MINOR_VERSION_OFFSET: usize = 3;
pub const PACKET_VERSION_OFFSET: usize = 4;
pub const PACKET_ID_OFFSET: usize = 5;
pub const RESERVED_OFFSET: usize = 6;
pub const SESSION_UID_RANGE: Range<usize> = 7..15;
pub const SESSION_TIME_RANGE: Range<usize> = 15..19;
pub const FRAME_ID_RANGE: Range<usize> = 19..23;
pub const PLAYER_CAR_INDEX_OFFSET: usize = 23;
pub const SECONDARY_PLAYER_CAR_INDEX_OFFSET: usize = 24;

// Car record, offsets relative to the start of one record.
pub const CAR_RECORD_LEN: usize = 58;
pub const SPEED_RANGE: Range<usize> = 0..2;
pub const THROTTLE_RANGE: Range<usize> = 2..6;
pub const STEER_RANGE: Range<usize> = 6..10;
pub const BRAKE_RANGE: Range<usize> = 10..14;
pub const CLUTCH_OFFSET: usize = 14;
pub const GEAR_OFFSET: usize = 15;
pub const ENGINE_RPM_RANGE: Range<usize> = 16..18;
pub const DRS_OFFSET: usize = 18;
pub const REV_LIGHTS_PERCENT_OFFSET: usize = 19;
pub const BRAKES_TEMPERATURE_OFFSET: usize = 20;
pub const TYRES_SURFACE_TEMPERATURE_OFFSET: usize = 28;
pub const TYRES_INNER_TEMPERATURE_OFFSET: usize = 32;
pub const ENGINE_TEMPERATURE_RANGE: Range<usize> = 36..38;
pub const TYRES_PRESSURE_OFFSET: usize = 38;
pub const SURFACE_TYPE_OFFSET: usize = 54;

pub const CARS_OFFSET: usize = HEADER_LEN;

// Trailer, offsets from the start of the datagram.
pub const TRAILER_OFFSET: usize = CARS_OFFSET + MAX_CARS * CAR_RECORD_LEN;
pub const TRAILER_LEN: usize = 7;
pub const BUTTON_STATUS_RANGE: Range<usize> = TRAILER_OFFSET..TRAILER_OFFSET + 4;
pub const MFD_PANEL_INDEX_OFFSET: usize = TRAILER_OFFSET + 4;
pub const MFD_PANEL_INDEX_SECONDARY_OFFSET: usize = TRAILER_OFFSET + 5;
pub const SUGGESTED_GEAR_OFFSET: usize = TRAILER_OFFSET + 6;

pub const CAR_TELEMETRY_LEN: usize = TRAILER_OFFSET + TRAILER_LEN;

/// Byte range of the record for car `index` within a car telemetry packet.
pub const fn car_record_range(index: usize) -> Range<usize> {
    let start = CARS_OFFSET + index * CAR_RECORD_LEN;
    start..start + CAR_RECORD_LEN
}
