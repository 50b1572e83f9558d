//! Error types for the scoring engine
//!
//! Fatal errors only: table lookup misses are data, carried in the
//! `RafResult` trace fields, never surfaced here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Reference table problems: missing files, malformed headers or rows.
    /// Fatal at pipeline construction.
    #[error("configuration error: {0}")]
    Configuration(#[from] rafter_tables::Error),

    /// An interaction table row whose expression does not parse. Fatal at
    /// pipeline construction.
    #[error("invalid interaction expression for '{name}': {message}")]
    InvalidInteraction { name: String, message: String },

    /// Invalid demographics or service records. Fatal for the call.
    #[error(transparent)]
    Model(#[from] rafter_models::Error),

    /// Structural 837 parse failure, surfaced per envelope.
    #[error(transparent)]
    Envelope(#[from] rafter_x12::Error),
}
