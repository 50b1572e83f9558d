//! Error types for reference table loading
//!
//! Every variant here is a configuration error in the sense of the pipeline
//! contract: table problems are fatal at init, never mid-call.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("reference table '{table}' could not be read: {source}")]
    TableUnreadable {
        table: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reference table '{table}' has a malformed header: expected columns {expected:?}, got {got:?}")]
    MalformedHeader {
        table: String,
        expected: &'static [&'static str],
        got: Vec<String>,
    },

    #[error("reference table '{table}' row {row}: {message}")]
    MalformedRow {
        table: String,
        row: u64,
        message: String,
    },

    #[error("CSV error in reference table '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
}
