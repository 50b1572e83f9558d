//! CMS-HCC risk scoring pipeline
//!
//! Computes Risk Adjustment Factor (RAF) scores from diagnosis codes and
//! beneficiary demographics, following the stage order of the CMS models:
//!
//! ```text
//! raw 837 / service records
//!        |
//!   eligibility filter
//!        |
//!   diagnosis -> CC mapping
//!        |
//!   hierarchy suppression
//!        |            demographics classifier
//!        |           /
//!   interaction engine
//!        |
//!   coefficient summation -> RafResult
//! ```
//!
//! Scoring is a pure function of `(inputs, tables, variant)`: reference
//! tables are immutable shared state, a call performs no I/O beyond the
//! one-shot lazy table load, and calls are safely parallelizable across
//! beneficiaries.

#![forbid(unsafe_code)]

pub mod coefficients;
pub mod demographics;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod interactions;
pub mod mapper;
pub mod options;
pub mod pipeline;

pub use coefficients::{sum_coefficients, ScoreBreakdown};
pub use demographics::classify;
pub use error::{Error, Result};
pub use filter::{filter_records, FilterPolicy, RETAINED_OUTPATIENT_BILL_TYPES};
pub use hierarchy::apply_hierarchies;
pub use interactions::{FiredInteraction, InteractionSet};
pub use mapper::{map_diagnoses, MappingOutcome};
pub use options::ScoringOptions;
pub use pipeline::Pipeline;

use rafter_models::{Demographics, ModelVariant, RafResult};

/// Calculate a RAF score from diagnosis codes with the embedded default
/// tables and default options.
pub fn calculate_raf<S: AsRef<str>>(
    diagnoses: &[S],
    variant: ModelVariant,
    demographics: &Demographics,
) -> Result<RafResult> {
    Pipeline::with_defaults(variant)?.calculate_from_diagnosis(diagnoses, demographics)
}
