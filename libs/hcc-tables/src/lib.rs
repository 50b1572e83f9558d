//! Reference tables for CMS-HCC risk adjustment
//!
//! Loads the published CSV reference files (diagnosis-to-CC mappings,
//! hierarchy edges, coefficients, eligible procedures, chronic flags,
//! interaction definitions) into hash-indexed lookup structures. The default
//! model-year tables are embedded in the crate; deployments can override
//! individual files through `TableSources`.
//!
//! Tables are immutable after load and safe to share across threads; the
//! embedded set is parsed once behind a process-wide initializer.

#![forbid(unsafe_code)]

mod catalog;
mod error;
mod loader;
mod sources;

use once_cell::sync::Lazy;

pub use catalog::ReferenceTables;
pub use error::{Error, Result};
pub use loader::InteractionDef;
pub use sources::TableSources;

static DEFAULT_TABLES: Lazy<ReferenceTables> = Lazy::new(|| {
    ReferenceTables::from_embedded().expect("failed to load embedded reference tables")
});

/// The embedded default reference tables, loaded on first use.
pub fn defaults() -> &'static ReferenceTables {
    &DEFAULT_TABLES
}
