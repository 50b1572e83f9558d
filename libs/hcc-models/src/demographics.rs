//! Beneficiary demographics
//!
//! `Demographics` is the caller-supplied input, validated once at the
//! pipeline boundary. `DemographicProfile` is what the classifier derives
//! from it: the coefficient segment, the age-sex cell, and the demographic
//! variables that contribute to the score.

use crate::error::Error;
use crate::variant::ModelVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper sanity bound for age; CMS enrollment data does not exceed this.
const MAX_AGE: u32 = 130;

/// Beneficiary sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    /// Single-letter code used in coefficient variable names (`F75_79`).
    pub fn letter(&self) -> char {
        match self {
            Sex::M => 'M',
            Sex::F => 'F',
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    /// Accepts `M`/`F` and the numeric wire synonyms `1`/`2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" | "m" | "1" => Ok(Sex::M),
            "F" | "f" | "2" => Ok(Sex::F),
            other => Err(Error::InvalidDemographics(format!(
                "sex must be M or F, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Medicare/Medicaid dual eligibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DualEligibility {
    /// `00` (also blank / `NA` on enrollment extracts)
    #[default]
    NonDual,
    /// `01` partial benefit dual
    Partial,
    /// `02` full benefit dual
    Full,
}

impl DualEligibility {
    pub fn is_dual(&self) -> bool {
        !matches!(self, DualEligibility::NonDual)
    }
}

impl FromStr for DualEligibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "NA" | "00" => Ok(DualEligibility::NonDual),
            "01" => Ok(DualEligibility::Partial),
            "02" => Ok(DualEligibility::Full),
            other => Err(Error::InvalidDemographics(format!(
                "dual eligibility code must be 00, 01 or 02, got '{other}'"
            ))),
        }
    }
}

/// Beneficiary demographics, immutable per scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    /// Age in whole years at the scoring date.
    pub age: u32,
    pub sex: Sex,
    #[serde(default)]
    pub dual_eligibility: DualEligibility,
    /// Original reason for Medicare entitlement was disability.
    #[serde(default)]
    pub orig_disabled: bool,
    /// Fewer than 12 months of Medicare enrollment.
    #[serde(default)]
    pub new_enrollee: bool,
    /// End-stage renal disease status; required by the ESRD model variants.
    #[serde(default)]
    pub esrd: bool,
    /// Special Needs Plan enrollment.
    #[serde(default)]
    pub snp: bool,
    /// Part D low income subsidy.
    #[serde(default)]
    pub low_income: bool,
    /// Months since kidney transplant; ESRD variants only.
    #[serde(default)]
    pub graft_months: Option<u32>,
    /// Explicit segment override (e.g. `"INS"` for institutional). When
    /// absent, the classifier derives the segment.
    #[serde(default)]
    pub category: Option<String>,
}

impl Demographics {
    /// Minimal constructor for the common community case.
    pub fn new(age: u32, sex: Sex) -> Self {
        Demographics {
            age,
            sex,
            dual_eligibility: DualEligibility::NonDual,
            orig_disabled: false,
            new_enrollee: false,
            esrd: false,
            snp: false,
            low_income: false,
            graft_months: None,
            category: None,
        }
    }

    /// Boundary validation, run once per scoring call. Internal code assumes
    /// a validated struct.
    pub fn validate(&self, variant: ModelVariant) -> Result<(), Error> {
        if self.age > MAX_AGE {
            return Err(Error::InvalidDemographics(format!(
                "age {} exceeds the supported maximum of {MAX_AGE}",
                self.age
            )));
        }
        if variant.is_esrd() && !self.esrd {
            return Err(Error::InvalidDemographics(format!(
                "{} requires the ESRD flag",
                variant.label()
            )));
        }
        Ok(())
    }
}

/// Output of the demographics classifier: the coefficient segment plus the
/// demographic variables that contribute to the score. Echoed verbatim in
/// `RafResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicProfile {
    /// Coefficient table segment (`CNA`, `CFD`, `NE`, `INS`, `DI`, ...).
    pub segment: String,
    /// Age-sex cell variable (`F75_79`, `M65_69`, ...).
    pub cell: String,
    /// Modifier variables that fired (`OriginallyDisabled_F`, `LTI`, ...).
    pub variables: Vec<String>,
    /// Age < 65 (the disabled community segments).
    pub disabled: bool,
    pub age: u32,
    pub sex: Sex,
    pub dual_eligibility: DualEligibility,
    pub orig_disabled: bool,
    pub new_enrollee: bool,
    pub esrd: bool,
    pub snp: bool,
    pub low_income: bool,
    pub graft_months: Option<u32>,
}
