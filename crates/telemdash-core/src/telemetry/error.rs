use thiserror::Error;

use crate::protocols::f1::F1Error;
use crate::protocols::pcars::PcarsError;

/// A packet the decoder refused. The snapshot is untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("F1 decode failed: {0}")]
    F1(#[from] F1Error),
    #[error("PCARS decode failed: {0}")]
    Pcars(#[from] PcarsError),
}

impl DecodeError {
    /// Stable identifier used in replay reports.
    ///
    /// # Examples
    /// ```
    /// use telemdash_core::DecodeError;
    /// use telemdash_core::protocols::f1::F1Error;
    ///
    /// let err = DecodeError::from(F1Error::UnsupportedFormat { format: 2019, expected: 2020 });
    /// assert_eq!(err.id(), "TD-F1-UNSUPPORTED-FORMAT");
    /// ```
    pub fn id(&self) -> &'static str {
        match self {
            DecodeError::F1(err) => match err {
                F1Error::TooSmallForHeader { .. } => "TD-F1-TOO-SMALL-FOR-HEADER",
                F1Error::UnsupportedFormat { .. } => "TD-F1-UNSUPPORTED-FORMAT",
                F1Error::IndexOutOfRange { .. } => "TD-F1-INDEX-OUT-OF-RANGE",
                F1Error::TooSmallForPayload { .. } => "TD-F1-TOO-SMALL-FOR-PAYLOAD",
                F1Error::TooShort { .. } => "TD-F1-TOO-SHORT",
            },
            DecodeError::Pcars(err) => match err {
                PcarsError::Parse(_) => "TD-PCARS-PARSE",
                PcarsError::TooSmallForLegacyBinary { .. } => "TD-PCARS-TOO-SMALL-FOR-LEGACY",
                PcarsError::ImplausibleVersion { .. } => "TD-PCARS-IMPLAUSIBLE-VERSION",
                PcarsError::TooSmallToExtractFields { .. } => "TD-PCARS-TOO-SMALL-TO-EXTRACT",
                PcarsError::ImplausibleValues { .. } => "TD-PCARS-IMPLAUSIBLE-VALUES",
                PcarsError::TooShort { .. } => "TD-PCARS-TOO-SHORT",
            },
        }
    }
}
