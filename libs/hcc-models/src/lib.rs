//! Data model for CMS-HCC risk adjustment.
//!
//! This crate provides the strongly-typed structures shared by the reference
//! table loader, the X12 837 parser, and the scoring engine:
//!
//! - `ModelVariant`: the closed set of supported CMS model variants
//! - `Demographics`: beneficiary input, validated once at the boundary
//! - `ServiceRecord`: the wire-neutral normalized claim service line
//! - `RafResult`: the serialized scoring output with its full trace
//!
//! # Design Philosophy
//!
//! - **Boundary validation**: inputs are checked once (`validate`) when they
//!   enter the pipeline; internal code assumes valid structs.
//! - **Deterministic output**: sorted containers (`BTreeMap`, sorted vectors)
//!   so serialized results are byte-stable across runs and platforms.
//! - **Lookup misses are data, not errors**: unknown diagnosis codes and
//!   absent coefficients are carried in trace fields of `RafResult`.

#![forbid(unsafe_code)]

pub mod demographics;
pub mod error;
pub mod result;
pub mod service;
pub mod variant;

pub use demographics::{DemographicProfile, Demographics, DualEligibility, Sex};
pub use error::{Error, Result};
pub use result::RafResult;
pub use service::{normalize_diagnosis, ServiceRecord};
pub use variant::ModelVariant;
