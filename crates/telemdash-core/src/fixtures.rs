//! Synthetic capture files for tests and demos.
//!
//! UDP frames are Ethernet/IPv4 with fixed MAC addresses, built with
//! `etherparse`. Captures are written as big-endian PCAPNG with a single
//! Ethernet interface and microsecond timestamps.

use std::fs;
use std::io;
use std::net::SocketAddrV4;
use std::path::Path;

use etherparse::PacketBuilder;
use etherparse::err::packet::BuildWriteError;
use thiserror::Error;

const SOURCE_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
const DESTINATION_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
const TIME_TO_LIVE: u8 = 64;

const BLOCK_SECTION_HEADER: u32 = 0x0A0D_0D0A;
const BLOCK_INTERFACE_DESCRIPTION: u32 = 1;
const BLOCK_ENHANCED_PACKET: u32 = 6;
const BYTE_ORDER_MAGIC: u32 = 0x1A2B_3C4D;
const LINKTYPE_ETHERNET: u16 = 1;
const SNAPLEN: u32 = 65535;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to build UDP frame: {0}")]
    Frame(#[from] BuildWriteError),
    #[error("failed to write capture: {0}")]
    Io(#[from] io::Error),
}

/// Ethernet frame carrying `payload` from `src` to `dst`.
pub fn ipv4_udp_frame(
    src: SocketAddrV4,
    dst: SocketAddrV4,
    payload: &[u8],
) -> Result<Vec<u8>, BuildWriteError> {
    let builder = PacketBuilder::ethernet2(SOURCE_MAC, DESTINATION_MAC)
        .ipv4(src.ip().octets(), dst.ip().octets(), TIME_TO_LIVE)
        .udp(src.port(), dst.port());
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload)?;
    Ok(frame)
}

#[derive(Debug, Clone)]
enum Frame {
    Raw(Vec<u8>),
    Udp {
        src: SocketAddrV4,
        dst: SocketAddrV4,
        payload: Vec<u8>,
    },
}

impl Frame {
    fn to_bytes(&self) -> Result<Vec<u8>, BuildWriteError> {
        match self {
            Frame::Raw(bytes) => Ok(bytes.clone()),
            Frame::Udp { src, dst, payload } => ipv4_udp_frame(*src, *dst, payload),
        }
    }
}

/// Accumulates timestamped frames and serializes them as PCAPNG.
///
/// # Examples
/// ```
/// use telemdash_core::fixtures::CaptureBuilder;
///
/// let mut capture = CaptureBuilder::new();
/// capture.push_udp(
///     0,
///     "192.168.1.20:51000".parse()?,
///     "192.168.1.50:20778".parse()?,
///     br#"{"speed": 120.0}"#,
/// );
/// let bytes = capture.to_pcapng()?;
/// assert_eq!(&bytes[..4], &[0x0a, 0x0d, 0x0d, 0x0a]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureBuilder {
    frames: Vec<(u64, Frame)>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, ts_us: u64, frame: Vec<u8>) -> &mut Self {
        self.frames.push((ts_us, Frame::Raw(frame)));
        self
    }

    pub fn push_udp(
        &mut self,
        ts_us: u64,
        src: SocketAddrV4,
        dst: SocketAddrV4,
        payload: &[u8],
    ) -> &mut Self {
        let frame = Frame::Udp {
            src,
            dst,
            payload: payload.to_vec(),
        };
        self.frames.push((ts_us, frame));
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Fails when a UDP payload does not fit one IPv4 datagram.
    pub fn to_pcapng(&self) -> Result<Vec<u8>, FixtureError> {
        let mut output = Vec::new();
        output.extend_from_slice(&pcapng_block(BLOCK_SECTION_HEADER, &section_header_body()));
        output.extend_from_slice(&pcapng_block(
            BLOCK_INTERFACE_DESCRIPTION,
            &interface_description_body(),
        ));
        for (ts_us, frame) in &self.frames {
            output.extend_from_slice(&pcapng_block(
                BLOCK_ENHANCED_PACKET,
                &enhanced_packet_body(*ts_us, &frame.to_bytes()?),
            ));
        }
        Ok(output)
    }

    pub fn write_pcapng(&self, path: &Path) -> Result<(), FixtureError> {
        let bytes = self.to_pcapng()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&BYTE_ORDER_MAGIC.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    // unknown section length
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_description_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&LINKTYPE_ETHERNET.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&SNAPLEN.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, frame: &[u8]) -> Vec<u8> {
    let ts_high = (ts_us >> 32) as u32;
    let ts_low = ts_us as u32;
    let cap_len = frame.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&ts_high.to_be_bytes());
    body.extend_from_slice(&ts_low.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(frame);
    body.resize(body.len() + (4 - frame.len() % 4) % 4, 0);
    body
}
