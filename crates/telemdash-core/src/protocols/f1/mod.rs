//! F1 2020 car telemetry decoding.
//!
//! The parser validates the 25-byte header (packet format, player car index,
//! packet id), checks the datagram carries the full 22-car array plus the
//! 7-byte trailer, then decodes the player's record field by field with
//! explicit little-endian reads. Packets of other types are reported as
//! `F1Packet::Other` rather than as errors.
//!
//! Offsets live in `layout`, bounds-checked reads in `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use error::F1Error;
pub use parser::{
    CarTelemetryPacket, CarTelemetryRecord, CarTelemetryTrailer, F1Header, F1Packet,
    parse_header, parse_packet,
};
pub use writer::write_car_telemetry;
