//! Indexed reference tables
//!
//! `ReferenceTables` is the process-wide, read-only lookup state the scoring
//! engine queries: dx→CC mappings, hierarchy edges, coefficients, eligible
//! procedures, chronic flags and interaction definitions, all hash-indexed at
//! load time. Construct once and share; never clone per call.

use crate::error::Result;
use crate::loader::InteractionDef;
use crate::sources::{self, TableSources};
use rafter_models::ModelVariant;
use std::collections::{HashMap, HashSet};

static EMPTY_CCS: &[u32] = &[];
static EMPTY_DEFS: &[InteractionDef] = &[];

/// The full reference table set for every supported model variant.
#[derive(Debug)]
pub struct ReferenceTables {
    dx_to_cc: HashMap<ModelVariant, HashMap<String, Vec<u32>>>,
    hierarchies: HashMap<ModelVariant, HashMap<u32, Vec<u32>>>,
    coefficients: HashMap<ModelVariant, HashMap<String, HashMap<String, f64>>>,
    eligible_procedures: HashSet<String>,
    chronic: HashMap<u32, bool>,
    interactions: HashMap<ModelVariant, Vec<InteractionDef>>,
}

impl ReferenceTables {
    /// Load every table from the embedded defaults.
    pub fn from_embedded() -> Result<Self> {
        Self::load(&TableSources::default(), None)
    }

    /// Load tables, overriding individual files from disk where `sources`
    /// carries a path. The per-variant tables (hierarchies, interactions) are
    /// overridden for `override_variant` only; every other variant keeps its
    /// embedded table.
    pub fn load(sources: &TableSources, override_variant: Option<ModelVariant>) -> Result<Self> {
        Ok(ReferenceTables {
            dx_to_cc: sources::load_dx_to_cc(sources)?,
            hierarchies: sources::load_hierarchies(sources, override_variant)?,
            coefficients: sources::load_coefficients(sources)?,
            eligible_procedures: sources::load_procedures(sources)?,
            chronic: sources::load_chronic(sources)?,
            interactions: sources::load_interactions(sources, override_variant)?,
        })
    }

    /// Condition categories for a normalized diagnosis code under `variant`.
    /// Absence of a mapping is normal and yields an empty slice.
    pub fn ccs_for(&self, diagnosis: &str, variant: ModelVariant) -> &[u32] {
        self.dx_to_cc
            .get(&variant)
            .and_then(|by_dx| by_dx.get(diagnosis))
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CCS)
    }

    /// Hierarchy edges for `variant`: parent CC → children it suppresses.
    pub fn hierarchy(&self, variant: ModelVariant) -> Option<&HashMap<u32, Vec<u32>>> {
        self.hierarchies.get(&variant)
    }

    /// Coefficient for `(segment, variable)` under `variant`, if present.
    pub fn coefficient(&self, variant: ModelVariant, segment: &str, variable: &str) -> Option<f64> {
        self.coefficients
            .get(&variant)?
            .get(segment)?
            .get(variable)
            .copied()
    }

    /// Whether a CPT/HCPCS code qualifies a service for risk adjustment.
    pub fn procedure_eligible(&self, code: &str) -> bool {
        self.eligible_procedures.contains(&code.to_ascii_uppercase())
    }

    /// Chronic flag for a condition category; unknown CCs are non-chronic.
    pub fn is_chronic(&self, cc: u32) -> bool {
        self.chronic.get(&cc).copied().unwrap_or(false)
    }

    /// Interaction definitions for `variant`, in table order.
    pub fn interaction_defs(&self, variant: ModelVariant) -> &[InteractionDef] {
        self.interactions
            .get(&variant)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_DEFS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    #[test]
    fn embedded_defaults_cover_every_variant() {
        let tables = defaults();
        for variant in ModelVariant::ALL {
            assert!(
                tables.hierarchy(variant).is_some(),
                "missing hierarchy table for {variant}"
            );
        }
    }

    #[test]
    fn dx_lookup_is_variant_scoped() {
        let tables = defaults();
        assert_eq!(tables.ccs_for("E119", ModelVariant::V28), &[38]);
        assert_eq!(tables.ccs_for("E119", ModelVariant::V24), &[19]);
        // N18.3 maps in V24 but not in V22.
        assert_eq!(tables.ccs_for("N183", ModelVariant::V24), &[138]);
        assert!(tables.ccs_for("N183", ModelVariant::V22).is_empty());
    }

    #[test]
    fn unknown_dx_yields_empty() {
        let tables = defaults();
        assert!(tables.ccs_for("Z0000", ModelVariant::V28).is_empty());
    }

    #[test]
    fn coefficient_lookup() {
        let tables = defaults();
        let cell = tables.coefficient(ModelVariant::V28, "CNA", "F65_69");
        assert!(cell.is_some());
        assert!(tables
            .coefficient(ModelVariant::V28, "CNA", "HCC9999")
            .is_none());
    }

    #[test]
    fn chronic_flags() {
        let tables = defaults();
        assert!(tables.is_chronic(38));
        assert!(!tables.is_chronic(263));
        assert!(!tables.is_chronic(9999));
    }

    #[test]
    fn procedure_eligibility_is_case_insensitive() {
        let tables = defaults();
        assert!(tables.procedure_eligible("99213"));
        assert!(tables.procedure_eligible("g0438"));
        assert!(!tables.procedure_eligible("00000"));
    }
}
