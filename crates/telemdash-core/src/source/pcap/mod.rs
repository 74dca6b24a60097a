//! PCAP and PCAPNG capture files.
//!
//! The container format is picked from the file's magic bytes. Frames keep
//! the link type of the interface they were captured on.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::CaptureFileSource;
