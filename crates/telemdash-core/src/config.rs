//! Runtime configuration for listeners, size limits and staleness windows.
//!
//! Defaults match the dashboard firmware. A JSON file may override any subset
//! of fields; missing keys keep their defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocols::pcars::layout::DEFAULT_MAX_JSON_LEN;
use crate::telemetry::freshness::{DEFAULT_F1_STALE_AFTER, DEFAULT_PCARS_STALE_AFTER};

pub const DEFAULT_F1_PORT: u16 = 20777;
pub const DEFAULT_PCARS_PORT: u16 = 5606;
pub const DEFAULT_FORWARDER_PORT: u16 = 20778;
/// Receive buffer size; longer datagrams are truncated before decoding.
pub const DEFAULT_MAX_PACKET_LEN: usize = 2048;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("port {port} is assigned to more than one listener")]
    DuplicatePort { port: u16 },
    #[error("max_json_len ({max_json_len}) exceeds max_packet_len ({max_packet_len})")]
    JsonLimitExceedsPacket {
        max_json_len: usize,
        max_packet_len: usize,
    },
}

/// Listener ports, size limits and per-protocol staleness windows.
///
/// # Examples
/// ```
/// use telemdash_core::TelemetryConfig;
///
/// let config = TelemetryConfig::from_json_str(r#"{"f1_port": 30777}"#)?;
/// assert_eq!(config.f1_port, 30777);
/// assert_eq!(config.pcars_port, 5606);
/// # Ok::<(), telemdash_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    pub f1_port: u16,
    pub pcars_port: u16,
    pub forwarder_port: u16,
    pub max_packet_len: usize,
    pub max_json_len: usize,
    pub f1_stale_after_ms: u64,
    pub pcars_stale_after_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            f1_port: DEFAULT_F1_PORT,
            pcars_port: DEFAULT_PCARS_PORT,
            forwarder_port: DEFAULT_FORWARDER_PORT,
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
            max_json_len: DEFAULT_MAX_JSON_LEN,
            f1_stale_after_ms: DEFAULT_F1_STALE_AFTER.as_millis() as u64,
            pcars_stale_after_ms: DEFAULT_PCARS_STALE_AFTER.as_millis() as u64,
        }
    }
}

impl TelemetryConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            ("f1_port", self.f1_port as u64),
            ("pcars_port", self.pcars_port as u64),
            ("forwarder_port", self.forwarder_port as u64),
            ("max_packet_len", self.max_packet_len as u64),
            ("max_json_len", self.max_json_len as u64),
            ("f1_stale_after_ms", self.f1_stale_after_ms),
            ("pcars_stale_after_ms", self.pcars_stale_after_ms),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }

        let mut seen = HashSet::new();
        for port in [self.f1_port, self.pcars_port, self.forwarder_port] {
            if !seen.insert(port) {
                return Err(ConfigError::DuplicatePort { port });
            }
        }

        if self.max_json_len > self.max_packet_len {
            return Err(ConfigError::JsonLimitExceedsPacket {
                max_json_len: self.max_json_len,
                max_packet_len: self.max_packet_len,
            });
        }
        Ok(())
    }

    pub fn f1_stale_after(&self) -> Duration {
        Duration::from_millis(self.f1_stale_after_ms)
    }

    pub fn pcars_stale_after(&self) -> Duration {
        Duration::from_millis(self.pcars_stale_after_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TelemetryConfig};
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn defaults_match_firmware_constants() {
        let config = TelemetryConfig::default();
        assert_eq!(config.f1_port, 20777);
        assert_eq!(config.pcars_port, 5606);
        assert_eq!(config.forwarder_port, 20778);
        assert_eq!(config.max_packet_len, 2048);
        assert_eq!(config.max_json_len, 512);
        assert_eq!(config.f1_stale_after(), Duration::from_secs(2));
        assert_eq!(config.pcars_stale_after(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = TelemetryConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TelemetryConfig::from_json_str(r#"{"f1_prot": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = TelemetryConfig::from_json_str(r#"{"pcars_stale_after_ms": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Zero {
                name: "pcars_stale_after_ms"
            }
        ));
    }

    #[test]
    fn shared_port_is_rejected() {
        let err = TelemetryConfig::from_json_str(r#"{"forwarder_port": 20777}"#).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePort { port: 20777 }));
    }

    #[test]
    fn json_limit_must_fit_packet_limit() {
        let err = TelemetryConfig::from_json_str(r#"{"max_packet_len": 256}"#).unwrap_err();
        assert!(matches!(err, ConfigError::JsonLimitExceedsPacket { .. }));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemdash.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"f1_stale_after_ms": 1500}}"#).unwrap();
        drop(file);

        let config = TelemetryConfig::load(&path).unwrap();
        assert_eq!(config.f1_stale_after(), Duration::from_millis(1500));

        let err = TelemetryConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
