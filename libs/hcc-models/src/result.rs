//! Scoring result
//!
//! `RafResult` is the serialized output of a scoring call: the score and its
//! decomposition, plus the full trace that justifies it (CC to diagnosis
//! mapping, coefficients applied, interactions fired, lookup misses). Sorted
//! containers keep the serialized form deterministic.

use crate::demographics::DemographicProfile;
use crate::service::ServiceRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Risk Adjustment Factor result with full decomposition and trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RafResult {
    /// Total RAF: sum of every applied coefficient.
    pub risk_score: f64,
    /// Demographic component: age-sex cell, modifier variables and
    /// demographic interactions.
    pub risk_score_demographics: f64,
    /// HCC component restricted to chronic-flagged HCCs.
    pub risk_score_chronic_only: f64,
    /// HCC component: every surviving HCC coefficient.
    pub risk_score_hcc: f64,
    /// Surviving HCCs after hierarchy suppression, ascending.
    pub hcc_list: Vec<u32>,
    /// Which diagnoses produced each surviving HCC.
    pub cc_to_dx: BTreeMap<u32, BTreeSet<String>>,
    /// Every coefficient applied, keyed by variable name.
    pub coefficients: BTreeMap<String, f64>,
    /// Variables that contributed but had no coefficient row; each counted
    /// as zero.
    pub coefficients_missing: Vec<String>,
    /// Interactions that fired, with the coefficient each contributed.
    pub interactions: BTreeMap<String, f64>,
    /// Echo of the classified demographics.
    pub demographics: DemographicProfile,
    /// Canonical model name (`"CMS-HCC Model V28"`, ...).
    pub model_name: String,
    /// Input diagnosis codes, de-duplicated, first-seen order preserved.
    pub diagnosis_codes: Vec<String>,
    /// Surviving service records, when a service pipeline was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_level_data: Option<Vec<ServiceRecord>>,
    /// Diagnoses with no mapping row for the chosen variant.
    pub unmapped_diagnoses: Vec<String>,
}
