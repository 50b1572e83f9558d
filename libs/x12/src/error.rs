//! Error types for 837 parsing

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The ISA header is unparseable, the segment terminator cannot be
    /// detected, or the interchange is not closed by an IEA segment. The
    /// caller may choose to drop the envelope.
    #[error("malformed 837 envelope: {reason}")]
    MalformedEnvelope { reason: String },
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedEnvelope {
            reason: reason.into(),
        }
    }
}
