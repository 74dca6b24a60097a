use thiserror::Error;

/// Errors returned by Project CARS 2 parsing and reading.
///
/// # Examples
/// ```
/// use telemdash_core::protocols::pcars::PcarsError;
///
/// let err = PcarsError::ImplausibleVersion { version: 42 };
/// assert!(err.to_string().contains("implausible build version"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PcarsError {
    #[error("forwarder JSON parse error: {0}")]
    Parse(String),
    #[error("packet too small for legacy binary: need {needed} bytes, got {actual}")]
    TooSmallForLegacyBinary { needed: usize, actual: usize },
    #[error("implausible build version: {version}")]
    ImplausibleVersion { version: u32 },
    #[error("packet too small to extract fields: need {needed} bytes, got {actual}")]
    TooSmallToExtractFields { needed: usize, actual: usize },
    #[error("implausible values: speed {speed_ms} m/s, rpm {rpm}, gear {gear}")]
    ImplausibleValues { speed_ms: f32, rpm: f32, gear: i8 },
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
