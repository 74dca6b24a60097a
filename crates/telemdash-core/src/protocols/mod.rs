//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, ranges and constants (source of truth)
//! - `reader`: bounds-checked byte access and endianness conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and keep no state; decoders in `telemetry` own the
//! snapshots and freshness bookkeeping.

pub(crate) mod common;
pub mod f1;
pub mod pcars;
