//! Encoders for F1 car telemetry packets, used to synthesise test traffic.

use super::layout;
use super::parser::{CarTelemetryRecord, CarTelemetryTrailer, F1Header};

pub fn write_header(header: &F1Header) -> [u8; layout::HEADER_LEN] {
    let mut out = [0u8; layout::HEADER_LEN];
    out[layout::FORMAT_RANGE].copy_from_slice(&header.packet_format.to_le_bytes());
    out[layout::GAME_MAJOR_VERSION_OFFSET] = header.game_major_version;
    out[layout::GAME_MINOR_VERSION_OFFSET] = header.game_minor_version;
    out[layout::PACKET_VERSION_OFFSET] = header.packet_version;
    out[layout::PACKET_ID_OFFSET] = header.packet_id;
    out[layout::RESERVED_OFFSET] = 0;
    out[layout::SESSION_UID_RANGE].copy_from_slice(&header.session_uid.to_le_bytes());
    out[layout::SESSION_TIME_RANGE].copy_from_slice(&header.session_time.to_le_bytes());
    out[layout::FRAME_ID_RANGE].copy_from_slice(&header.frame_identifier.to_le_bytes());
    out[layout::PLAYER_CAR_INDEX_OFFSET] = header.player_car_index;
    out[layout::SECONDARY_PLAYER_CAR_INDEX_OFFSET] = header.secondary_player_car_index;
    out
}

pub fn write_car_record(record: &CarTelemetryRecord) -> [u8; layout::CAR_RECORD_LEN] {
    let mut out = [0u8; layout::CAR_RECORD_LEN];
    out[layout::SPEED_RANGE].copy_from_slice(&record.speed.to_le_bytes());
    out[layout::THROTTLE_RANGE].copy_from_slice(&record.throttle.to_le_bytes());
    out[layout::STEER_RANGE].copy_from_slice(&record.steer.to_le_bytes());
    out[layout::BRAKE_RANGE].copy_from_slice(&record.brake.to_le_bytes());
    out[layout::CLUTCH_OFFSET] = record.clutch;
    out[layout::GEAR_OFFSET] = record.gear as u8;
    out[layout::ENGINE_RPM_RANGE].copy_from_slice(&record.engine_rpm.to_le_bytes());
    out[layout::DRS_OFFSET] = record.drs;
    out[layout::REV_LIGHTS_PERCENT_OFFSET] = record.rev_lights_percent;
    for (idx, value) in record.brakes_temperature.iter().enumerate() {
        let start = layout::BRAKES_TEMPERATURE_OFFSET + idx * 2;
        out[start..start + 2].copy_from_slice(&value.to_le_bytes());
    }
    let surface = layout::TYRES_SURFACE_TEMPERATURE_OFFSET;
    out[surface..surface + layout::CORNERS].copy_from_slice(&record.tyres_surface_temperature);
    let inner = layout::TYRES_INNER_TEMPERATURE_OFFSET;
    out[inner..inner + layout::CORNERS].copy_from_slice(&record.tyres_inner_temperature);
    out[layout::ENGINE_TEMPERATURE_RANGE].copy_from_slice(&record.engine_temperature.to_le_bytes());
    for (idx, value) in record.tyres_pressure.iter().enumerate() {
        let start = layout::TYRES_PRESSURE_OFFSET + idx * 4;
        out[start..start + 4].copy_from_slice(&value.to_le_bytes());
    }
    let surface_type = layout::SURFACE_TYPE_OFFSET;
    out[surface_type..surface_type + layout::CORNERS].copy_from_slice(&record.surface_type);
    out
}

/// Encode a full car telemetry packet.
///
/// `cars` fills slots from index 0; missing slots are zeroed and extra
/// entries beyond the grid size are dropped.
pub fn write_car_telemetry(
    header: &F1Header,
    cars: &[CarTelemetryRecord],
    trailer: &CarTelemetryTrailer,
) -> Vec<u8> {
    let mut out = vec![0u8; layout::CAR_TELEMETRY_LEN];
    out[..layout::HEADER_LEN].copy_from_slice(&write_header(header));
    for (idx, car) in cars.iter().take(layout::MAX_CARS).enumerate() {
        out[layout::car_record_range(idx)].copy_from_slice(&write_car_record(car));
    }
    out[layout::BUTTON_STATUS_RANGE].copy_from_slice(&trailer.button_status.to_le_bytes());
    out[layout::MFD_PANEL_INDEX_OFFSET] = trailer.mfd_panel_index;
    out[layout::MFD_PANEL_INDEX_SECONDARY_OFFSET] = trailer.mfd_panel_index_secondary_player;
    out[layout::SUGGESTED_GEAR_OFFSET] = trailer.suggested_gear as u8;
    out
}
