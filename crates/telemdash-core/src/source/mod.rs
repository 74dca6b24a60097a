//! Capture frame sources.
//!
//! A source yields raw link-layer frames with their capture timestamp. All
//! file I/O of the crate lives here.

pub mod pcap;

pub use pcap::CaptureFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured link-layer frame.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    /// Capture timestamp in seconds since the Unix epoch.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError>;
}

impl FrameSource for std::vec::IntoIter<CaptureFrame> {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError> {
        Ok(self.next())
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}
