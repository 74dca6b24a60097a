use thiserror::Error;

/// Errors returned by F1 car telemetry parsing and reading.
///
/// # Examples
/// ```
/// use telemdash_core::protocols::f1::F1Error;
///
/// let err = F1Error::UnsupportedFormat { format: 2019, expected: 2020 };
/// assert!(err.to_string().contains("unsupported packet format"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum F1Error {
    #[error("packet too small for header: need {needed} bytes, got {actual}")]
    TooSmallForHeader { needed: usize, actual: usize },
    #[error("unsupported packet format: {format} (expected {expected})")]
    UnsupportedFormat { format: u16, expected: u16 },
    #[error("player car index out of range: {index} (max {max})")]
    IndexOutOfRange { index: u8, max: usize },
    #[error("packet too small for car telemetry: need {needed} bytes, got {actual}")]
    TooSmallForPayload { needed: usize, actual: usize },
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
