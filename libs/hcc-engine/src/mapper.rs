//! Diagnosis-to-CC mapping
//!
//! Joins normalized diagnosis codes against the variant's mapping table.
//! Lookup cannot fail: a diagnosis with no row is recorded in the unmapped
//! trace and scoring continues.

use rafter_models::ModelVariant;
use rafter_tables::ReferenceTables;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Output of the mapping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingOutcome {
    /// Which diagnoses produced each CC (pre-hierarchy).
    pub cc_to_dx: BTreeMap<u32, BTreeSet<String>>,
    /// The mapped CC set (pre-hierarchy).
    pub ccs: BTreeSet<u32>,
    /// Diagnoses with no mapping row, in first-seen order.
    pub unmapped: Vec<String>,
}

/// Map de-duplicated, normalized diagnosis codes for `variant`.
pub fn map_diagnoses(
    diagnoses: &[String],
    variant: ModelVariant,
    tables: &ReferenceTables,
) -> MappingOutcome {
    let mut outcome = MappingOutcome::default();
    for diagnosis in diagnoses {
        let ccs = tables.ccs_for(diagnosis, variant);
        if ccs.is_empty() {
            outcome.unmapped.push(diagnosis.clone());
            continue;
        }
        for &cc in ccs {
            outcome
                .cc_to_dx
                .entry(cc)
                .or_default()
                .insert(diagnosis.clone());
            outcome.ccs.insert(cc);
        }
    }
    debug!(
        mapped = outcome.ccs.len(),
        unmapped = outcome.unmapped.len(),
        "mapped diagnoses to condition categories"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafter_tables::defaults;

    #[test]
    fn maps_and_traces() {
        let diagnoses = vec!["E119".to_string(), "Z0000".to_string()];
        let outcome = map_diagnoses(&diagnoses, ModelVariant::V28, defaults());
        assert_eq!(outcome.ccs, [38].into_iter().collect());
        assert_eq!(outcome.unmapped, vec!["Z0000"]);
    }

    #[test]
    fn two_diagnoses_one_cc() {
        let diagnoses = vec!["E119".to_string(), "E109".to_string()];
        let outcome = map_diagnoses(&diagnoses, ModelVariant::V28, defaults());
        assert_eq!(outcome.ccs.len(), 1);
        let dxs = &outcome.cc_to_dx[&38];
        assert!(dxs.contains("E119") && dxs.contains("E109"));
    }
}
