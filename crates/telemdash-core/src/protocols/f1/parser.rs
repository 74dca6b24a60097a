use serde::Serialize;

use super::error::F1Error;
use super::layout;
use super::reader::F1Reader;

/// Decoded F1 packet header.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct F1Header {
    pub packet_format: u16,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub packet_id: u8,
    pub session_uid: u64,
    pub session_time: f32,
    pub frame_identifier: u32,
    pub player_car_index: u8,
    pub secondary_player_car_index: u8,
}

impl F1Header {
    /// Header of a car telemetry packet as the bundled simulator emits it
    /// (game version 2.20, no secondary player).
    pub fn car_telemetry(player_car_index: u8, frame_identifier: u32, session_time: f32) -> Self {
        Self {
            packet_format: layout::PACKET_FORMAT_2020,
            game_major_version: 2,
            game_minor_version: 20,
            packet_version: 1,
            packet_id: layout::PACKET_ID_CAR_TELEMETRY,
            session_uid: 12_345_678_901_234_567,
            session_time,
            frame_identifier,
            player_car_index,
            secondary_player_car_index: 255,
        }
    }
}

/// One car's telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CarTelemetryRecord {
    /// km/h
    pub speed: u16,
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    pub clutch: u8,
    /// 1..=8, 0 = neutral, -1 = reverse
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: u8,
    pub rev_lights_percent: u8,
    pub brakes_temperature: [u16; layout::CORNERS],
    pub tyres_surface_temperature: [u8; layout::CORNERS],
    pub tyres_inner_temperature: [u8; layout::CORNERS],
    pub engine_temperature: u16,
    /// PSI
    pub tyres_pressure: [f32; layout::CORNERS],
    pub surface_type: [u8; layout::CORNERS],
}

/// Control bytes following the car array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarTelemetryTrailer {
    pub button_status: u32,
    /// 255 when the MFD is closed.
    pub mfd_panel_index: u8,
    pub mfd_panel_index_secondary_player: u8,
    pub suggested_gear: i8,
}

impl Default for CarTelemetryTrailer {
    fn default() -> Self {
        Self {
            button_status: 0,
            mfd_panel_index: 255,
            mfd_panel_index_secondary_player: 255,
            suggested_gear: 0,
        }
    }
}

/// Car telemetry packet reduced to the player's record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CarTelemetryPacket {
    pub header: F1Header,
    pub player: CarTelemetryRecord,
    pub trailer: CarTelemetryTrailer,
}

/// Outcome of parsing an F1 datagram.
#[derive(Debug, Clone, PartialEq)]
pub enum F1Packet {
    CarTelemetry(CarTelemetryPacket),
    /// A valid header for a packet type other than car telemetry.
    Other(F1Header),
}

/// Decode the fixed 25-byte header. Only the length is checked here.
pub fn parse_header(payload: &[u8]) -> Result<F1Header, F1Error> {
    let reader = F1Reader::new(payload);
    reader.require_header()?;

    Ok(F1Header {
        packet_format: reader.read_u16_le(layout::FORMAT_RANGE)?,
        game_major_version: reader.read_u8(layout::GAME_MAJOR_VERSION_OFFSET)?,
        game_minor_version: reader.read_u8(layout::GAME_MINOR_VERSION_OFFSET)?,
        packet_version: reader.read_u8(layout::PACKET_VERSION_OFFSET)?,
        packet_id: reader.read_u8(layout::PACKET_ID_OFFSET)?,
        session_uid: reader.read_u64_le(layout::SESSION_UID_RANGE)?,
        session_time: reader.read_f32_le(layout::SESSION_TIME_RANGE)?,
        frame_identifier: reader.read_u32_le(layout::FRAME_ID_RANGE)?,
        player_car_index: reader.read_u8(layout::PLAYER_CAR_INDEX_OFFSET)?,
        secondary_player_car_index: reader.read_u8(layout::SECONDARY_PLAYER_CAR_INDEX_OFFSET)?,
    })
}

/// Validate and decode an F1 2020 datagram.
///
/// Checks run in a fixed order: header length, packet format, player index,
/// packet id, full car telemetry length. A well-formed header for any packet
/// type other than car telemetry yields `F1Packet::Other`.
pub fn parse_packet(payload: &[u8]) -> Result<F1Packet, F1Error> {
    let header = parse_header(payload)?;
    if header.packet_format != layout::PACKET_FORMAT_2020 {
        return Err(F1Error::UnsupportedFormat {
            format: header.packet_format,
            expected: layout::PACKET_FORMAT_2020,
        });
    }
    if usize::from(header.player_car_index) >= layout::MAX_CARS {
        return Err(F1Error::IndexOutOfRange {
            index: header.player_car_index,
            max: layout::MAX_CARS,
        });
    }
    if header.packet_id != layout::PACKET_ID_CAR_TELEMETRY {
        return Ok(F1Packet::Other(header));
    }

    let reader = F1Reader::new(payload);
    reader.require_car_telemetry()?;

    // The player's slot varies per session; slot 0 is not special.
    let record = reader.car_record(header.player_car_index)?;
    let player = parse_car_record(&record)?;
    let trailer = parse_trailer(&reader)?;

    Ok(F1Packet::CarTelemetry(CarTelemetryPacket {
        header,
        player,
        trailer,
    }))
}

fn parse_car_record(record: &F1Reader<'_>) -> Result<CarTelemetryRecord, F1Error> {
    Ok(CarTelemetryRecord {
        speed: record.read_u16_le(layout::SPEED_RANGE)?,
        throttle: record.read_f32_le(layout::THROTTLE_RANGE)?,
        steer: record.read_f32_le(layout::STEER_RANGE)?,
        brake: record.read_f32_le(layout::BRAKE_RANGE)?,
        clutch: record.read_u8(layout::CLUTCH_OFFSET)?,
        gear: record.read_i8(layout::GEAR_OFFSET)?,
        engine_rpm: record.read_u16_le(layout::ENGINE_RPM_RANGE)?,
        drs: record.read_u8(layout::DRS_OFFSET)?,
        rev_lights_percent: record.read_u8(layout::REV_LIGHTS_PERCENT_OFFSET)?,
        brakes_temperature: record.read_u16_le_array(layout::BRAKES_TEMPERATURE_OFFSET)?,
        tyres_surface_temperature: record
            .read_u8_array(layout::TYRES_SURFACE_TEMPERATURE_OFFSET)?,
        tyres_inner_temperature: record.read_u8_array(layout::TYRES_INNER_TEMPERATURE_OFFSET)?,
        engine_temperature: record.read_u16_le(layout::ENGINE_TEMPERATURE_RANGE)?,
        tyres_pressure: record.read_f32_le_array(layout::TYRES_PRESSURE_OFFSET)?,
        surface_type: record.read_u8_array(layout::SURFACE_TYPE_OFFSET)?,
    })
}

fn parse_trailer(reader: &F1Reader<'_>) -> Result<CarTelemetryTrailer, F1Error> {
    Ok(CarTelemetryTrailer {
        button_status: reader.read_u32_le(layout::BUTTON_STATUS_RANGE)?,
        mfd_panel_index: reader.read_u8(layout::MFD_PANEL_INDEX_OFFSET)?,
        mfd_panel_index_secondary_player: reader
            .read_u8(layout::MFD_PANEL_INDEX_SECONDARY_OFFSET)?,
        suggested_gear: reader.read_i8(layout::SUGGESTED_GEAR_OFFSET)?,
    })
}
