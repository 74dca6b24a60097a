//! Project CARS 2 decoding.
//!
//! The PCARS port carries two unrelated encodings. `classify` guesses which
//! one a payload uses: JSON documents from a forwarder relay, parsed as a
//! partial update, or legacy binary broadcasts, parsed at estimated offsets
//! and accepted only when every extracted value passes a plausibility check.
//!
//! The legacy path is experimental. Its offsets live in `layout` so they can
//! be corrected without touching the parser or its error contract.

pub mod classify;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use classify::{PayloadFormat, classify};
pub use error::PcarsError;
pub use parser::{ForwarderRecord, LegacyRecord, parse_forwarder_json, parse_legacy_binary};
