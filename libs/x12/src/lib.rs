//! X12 837 claim parsing
//!
//! Turns raw ISA..IEA claim envelopes into normalized `ServiceRecord`s:
//!
//! 1. **Delimiter discovery** — separators are declared by the ISA header
//!    itself, never assumed.
//! 2. **Segment scanning** — a forward-only reader over borrowed slices of
//!    the input; the envelope is never materialized twice.
//! 3. **Service-level extraction** — a loop-stack state machine that carries
//!    claim context (diagnoses, dates, providers) onto every service line.
//!
//! Unknown transaction types do not abort a parse; their records surface
//! with an empty `claim_type` and are dropped by the eligibility filter
//! downstream. Structural problems (unparseable ISA, undetectable
//! terminator, missing IEA) are `Error::MalformedEnvelope`.

#![forbid(unsafe_code)]

pub mod delimiters;
pub mod error;
pub mod extractor;
pub mod segment;

pub use delimiters::Delimiters;
pub use error::{Error, Result};
pub use extractor::{extract_service_records, Extractor};
pub use segment::{Segment, SegmentScanner};
