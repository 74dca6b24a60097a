//! Protocol decoders writing into a normalized snapshot.
//!
//! Each decoder owns one [`TelemetrySnapshot`] and one [`Freshness`] tracker.
//! A successful decode overwrites the recognized fields and stamps the
//! tracker; a failed decode leaves both untouched. Callers supply the clock
//! reading so decoding stays deterministic under replay.

pub mod clock;
pub mod dashboard;
pub mod error;
pub mod f1;
pub mod freshness;
pub mod pcars;
pub mod snapshot;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TelemetryConfig;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use dashboard::{Dashboard, DisplayTelemetry};
pub use error::DecodeError;
pub use f1::F1Decoder;
pub use freshness::Freshness;
pub use pcars::PcarsDecoder;
pub use snapshot::{SourceKind, TelemetrySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    F1,
    Pcars,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::F1 => "f1",
            Protocol::Pcars => "pcars",
        }
    }

    /// Protocol listening on `port`. The forwarder port carries PCARS JSON.
    ///
    /// # Examples
    /// ```
    /// use telemdash_core::{Protocol, TelemetryConfig};
    ///
    /// let config = TelemetryConfig::default();
    /// assert_eq!(Protocol::for_port(20777, &config), Some(Protocol::F1));
    /// assert_eq!(Protocol::for_port(20778, &config), Some(Protocol::Pcars));
    /// assert_eq!(Protocol::for_port(53, &config), None);
    /// ```
    pub fn for_port(port: u16, config: &TelemetryConfig) -> Option<Self> {
        if port == config.f1_port {
            Some(Protocol::F1)
        } else if port == config.pcars_port || port == config.forwarder_port {
            Some(Protocol::Pcars)
        } else {
            None
        }
    }

    pub fn other(self) -> Self {
        match self {
            Protocol::F1 => Protocol::Pcars,
            Protocol::Pcars => Protocol::F1,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a decode that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The snapshot was updated from a packet of this kind.
    Updated(SourceKind),
    /// Well-formed packet of a type this decoder does not consume.
    Ignored { packet_id: u8 },
}

/// A protocol decoder owning its snapshot and freshness state.
pub trait TelemetryDecoder {
    fn protocol(&self) -> Protocol;

    /// Decode one datagram. On error the snapshot and freshness are unchanged.
    fn decode(&mut self, payload: &[u8], now: Duration) -> Result<DecodeOutcome, DecodeError>;

    fn freshness(&self) -> &Freshness;

    /// Copy of the current snapshot with `valid` evaluated at `now`.
    fn snapshot(&self, now: Duration) -> TelemetrySnapshot;

    fn is_valid(&self, now: Duration) -> bool {
        self.freshness().is_fresh(now)
    }
}

pub(crate) fn rejected(protocol: Protocol, len: usize, err: impl Into<DecodeError>) -> DecodeError {
    let err = err.into();
    debug!(protocol = protocol.label(), error = err.id(), len, "rejected packet: {err}");
    err
}

#[cfg(test)]
mod tests {
    use super::Protocol;
    use crate::config::TelemetryConfig;

    #[test]
    fn for_port_follows_configured_ports() {
        let config = TelemetryConfig {
            f1_port: 4000,
            pcars_port: 4001,
            forwarder_port: 4002,
            ..TelemetryConfig::default()
        };
        assert_eq!(Protocol::for_port(4000, &config), Some(Protocol::F1));
        assert_eq!(Protocol::for_port(4001, &config), Some(Protocol::Pcars));
        assert_eq!(Protocol::for_port(4002, &config), Some(Protocol::Pcars));
        assert_eq!(Protocol::for_port(20777, &config), None);
    }

    #[test]
    fn protocol_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Protocol::Pcars).unwrap(), "\"pcars\"");
        assert_eq!(Protocol::F1.to_string(), "f1");
        assert_eq!(Protocol::F1.other(), Protocol::Pcars);
    }
}
