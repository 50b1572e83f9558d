//! Error types for the data model

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown model name '{0}'")]
    UnknownModel(String),

    #[error("invalid demographics: {0}")]
    InvalidDemographics(String),

    #[error("invalid service record: {0}")]
    InvalidServiceRecord(String),
}
