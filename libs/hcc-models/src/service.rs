//! Normalized service records
//!
//! `ServiceRecord` is the wire-neutral shape produced by the X12 837 parser
//! and consumed by the eligibility filter. External adapters (FHIR EOB) feed
//! the same shape into the pipeline.

use crate::error::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One claim service line (or one claim, for claims without service lines),
/// normalized away from its source encoding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Two-character claim type: `71` professional, `72` institutional
    /// outpatient, `73` inpatient. Empty when the source transaction could
    /// not be classified.
    pub claim_type: String,
    /// Three-character type of bill (`11X`, `13X`, ...) for institutional
    /// claims, empty otherwise.
    pub bill_type: String,
    pub service_date: Option<NaiveDate>,
    pub through_date: Option<NaiveDate>,
    pub place_of_service: String,
    /// CPT/HCPCS procedure code, when the line carries one.
    pub procedure_code: Option<String>,
    /// Up to four procedure modifiers, in declared order.
    pub procedure_modifiers: Vec<String>,
    /// Claim diagnosis codes; the first entry is the principal diagnosis.
    pub diagnosis_codes: Vec<String>,
    /// 1-based indices into `diagnosis_codes` for the diagnoses linked to
    /// this line. Empty when the source carries no pointers.
    pub linked_diagnosis_pointers: Vec<usize>,
    pub provider_specialty: String,
    pub performing_provider_npi: String,
}

impl ServiceRecord {
    /// Boundary validation: linked pointers must address `diagnosis_codes`.
    pub fn validate(&self) -> Result<(), Error> {
        for &ptr in &self.linked_diagnosis_pointers {
            if ptr == 0 || ptr > self.diagnosis_codes.len() {
                return Err(Error::InvalidServiceRecord(format!(
                    "diagnosis pointer {ptr} out of range (claim has {} diagnoses)",
                    self.diagnosis_codes.len()
                )));
            }
        }
        Ok(())
    }

    /// The diagnosis codes this line actually links to: the pointed-at subset
    /// when pointers are present, otherwise every claim diagnosis.
    pub fn linked_diagnoses(&self) -> Vec<&str> {
        if self.linked_diagnosis_pointers.is_empty() {
            self.diagnosis_codes.iter().map(String::as_str).collect()
        } else {
            self.linked_diagnosis_pointers
                .iter()
                .filter_map(|&ptr| self.diagnosis_codes.get(ptr - 1))
                .map(String::as_str)
                .collect()
        }
    }
}

/// Normalize an ICD-10-CM code to canonical form: uppercase, dots stripped.
pub fn normalize_diagnosis(code: &str) -> String {
    code.trim()
        .chars()
        .filter(|c| *c != '.')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dots_and_case() {
        assert_eq!(normalize_diagnosis("e11.9"), "E119");
        assert_eq!(normalize_diagnosis(" I50.32 "), "I5032");
    }

    #[test]
    fn pointer_out_of_range_is_invalid() {
        let record = ServiceRecord {
            diagnosis_codes: vec!["E119".into()],
            linked_diagnosis_pointers: vec![2],
            ..Default::default()
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn linked_diagnoses_follow_pointers() {
        let record = ServiceRecord {
            diagnosis_codes: vec!["E119".into(), "I10".into(), "N183".into()],
            linked_diagnosis_pointers: vec![3, 1],
            ..Default::default()
        };
        assert_eq!(record.linked_diagnoses(), vec!["N183", "E119"]);
    }

    #[test]
    fn no_pointers_links_all() {
        let record = ServiceRecord {
            diagnosis_codes: vec!["E119".into(), "I10".into()],
            ..Default::default()
        };
        assert_eq!(record.linked_diagnoses(), vec!["E119", "I10"]);
    }
}
