/// Leading bytes of a PCAPNG section header block.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];
pub const MAGIC_LEN: usize = 4;
/// Initial buffer handed to the pcap-parser readers.
pub const PCAP_READER_BUFFER_SIZE: usize = 64 * 1024;
/// PCAPNG timestamps default to microsecond resolution.
pub const PCAPNG_TS_UNITS_PER_SECOND: f64 = 1_000_000.0;
