use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Read the container magic and rewind to the start of the file.
///
/// # Errors
/// Returns `PcapSourceError::Io` when the file is shorter than the magic or
/// cannot be rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(
    reader: &mut R,
) -> Result<[u8; layout::MAGIC_LEN], PcapSourceError> {
    let mut magic = [0u8; layout::MAGIC_LEN];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; layout::MAGIC_LEN]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Link type of interface `if_id`; Ethernet when the interface is unknown.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    usize::try_from(if_id)
        .ok()
        .and_then(|idx| linktypes.get(idx))
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_usec: u32) -> f64 {
    f64::from(ts_sec) + f64::from(ts_usec) * 1e-6
}

pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = (u64::from(ts_high) << 32) | u64::from(ts_low);
    ts as f64 / layout::PCAPNG_TS_UNITS_PER_SECOND
}
