use std::fs::File;
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader,
    traits::PcapReaderIterator,
};

use crate::source::{CaptureFrame, FrameSource, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

/// Streams frames out of a PCAP or PCAPNG file.
pub struct CaptureFileSource {
    inner: CaptureReader,
}

enum CaptureReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<File>,
        linktypes: Vec<Linktype>,
    },
}

impl CaptureFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let inner = create_reader(file)?;
        Ok(Self { inner })
    }
}

impl FrameSource for CaptureFileSource {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError> {
        let frame = match &mut self.inner {
            CaptureReader::Legacy { reader, linktype } => {
                next_block(reader, "pcap", |block| match block {
                    PcapBlockOwned::LegacyHeader(header) => {
                        *linktype = Some(header.network);
                        None
                    }
                    PcapBlockOwned::Legacy(packet) => Some(CaptureFrame {
                        ts: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                        linktype: linktype.unwrap_or(Linktype::ETHERNET),
                        data: packet.data.to_vec(),
                    }),
                    _ => None,
                })?
            }
            CaptureReader::Ng { reader, linktypes } => {
                next_block(reader, "pcapng", |block| match block {
                    PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                        linktypes.push(intf.linktype);
                        None
                    }
                    PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(CaptureFrame {
                        ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                        linktype: linktype_for_interface(linktypes, packet.if_id),
                        data: packet.data.to_vec(),
                    }),
                    _ => None,
                })?
            }
        };
        Ok(frame)
    }
}

fn create_reader(mut file: File) -> Result<CaptureReader, PcapSourceError> {
    let magic = read_magic_and_rewind(&mut file)?;

    if is_pcapng_magic(&magic) {
        let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
            PcapSourceError::Pcap {
                context: "pcapng reader init",
                message: e.to_string(),
            }
        })?;
        Ok(CaptureReader::Ng {
            reader,
            linktypes: Vec::new(),
        })
    } else {
        let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
            PcapSourceError::Pcap {
                context: "pcap reader init",
                message: e.to_string(),
            }
        })?;
        Ok(CaptureReader::Legacy {
            reader,
            linktype: None,
        })
    }
}

/// Advance `reader` until `on_block` produces a frame or the file ends.
fn next_block<R, F>(
    reader: &mut R,
    format: &'static str,
    mut on_block: F,
) -> Result<Option<CaptureFrame>, PcapSourceError>
where
    R: PcapReaderIterator,
    F: FnMut(PcapBlockOwned<'_>) -> Option<CaptureFrame>,
{
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let frame = on_block(block);
                reader.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader.refill().map_err(|e| PcapSourceError::Pcap {
                    context: format,
                    message: format!("refill failed: {e}"),
                })?;
            }
            Err(e) => {
                return Err(PcapSourceError::Pcap {
                    context: format,
                    message: e.to_string(),
                });
            }
        }
    }
}
