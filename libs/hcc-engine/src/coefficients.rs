//! Coefficient summation
//!
//! Looks up every contributing variable in the `(segment, variable)`
//! coefficient table and sums the values. Missing entries contribute zero
//! and are traced. Variable names are sorted lexicographically before the
//! left-to-right sum so results are bit-reproducible regardless of how the
//! contributing set was assembled.

use crate::interactions::FiredInteraction;
use rafter_models::{DemographicProfile, ModelVariant};
use rafter_tables::ReferenceTables;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// The kind of a contributing variable, for score decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariableKind {
    /// Age-sex cell or demographic modifier.
    Demographic,
    /// `HCC<n>` for a surviving CC.
    Hcc { cc: u32 },
    Interaction { demographic: bool },
}

/// The summed score with its decomposition and trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub risk_score: f64,
    pub risk_score_demographics: f64,
    pub risk_score_chronic_only: f64,
    pub risk_score_hcc: f64,
    /// Every coefficient applied, by variable name.
    pub coefficients: BTreeMap<String, f64>,
    /// Contributing variables with no coefficient row, sorted.
    pub coefficients_missing: Vec<String>,
    /// Fired interactions with the coefficient each contributed (zero when
    /// the table has no row for the segment).
    pub interactions: BTreeMap<String, f64>,
}

/// Sum coefficients for the contributing variable set: the age-sex cell,
/// `HCC<n>` for each surviving CC (suppressed entirely for new-enrollee
/// segments), the demographic modifiers, and each fired interaction.
pub fn sum_coefficients(
    profile: &DemographicProfile,
    hccs: &BTreeSet<u32>,
    fired: &[FiredInteraction],
    variant: ModelVariant,
    tables: &ReferenceTables,
) -> ScoreBreakdown {
    let new_enrollee_segment = matches!(profile.segment.as_str(), "NE" | "DNE");

    let mut contributing: Vec<(String, VariableKind)> = Vec::new();
    contributing.push((profile.cell.clone(), VariableKind::Demographic));
    for variable in &profile.variables {
        contributing.push((variable.clone(), VariableKind::Demographic));
    }
    if !new_enrollee_segment {
        for &cc in hccs {
            contributing.push((format!("HCC{cc}"), VariableKind::Hcc { cc }));
        }
    }
    for interaction in fired {
        contributing.push((
            interaction.name.clone(),
            VariableKind::Interaction {
                demographic: interaction.demographic,
            },
        ));
    }

    // Lexicographic order fixes the floating point summation sequence.
    contributing.sort_by(|a, b| a.0.cmp(&b.0));

    let mut breakdown = ScoreBreakdown::default();
    for (name, kind) in contributing {
        let value = tables.coefficient(variant, &profile.segment, &name);
        if let VariableKind::Interaction { .. } = kind {
            breakdown
                .interactions
                .insert(name.clone(), value.unwrap_or(0.0));
        }
        let Some(value) = value else {
            breakdown.coefficients_missing.push(name);
            continue;
        };

        breakdown.coefficients.insert(name, value);
        breakdown.risk_score += value;
        match kind {
            VariableKind::Demographic => breakdown.risk_score_demographics += value,
            VariableKind::Hcc { cc } => {
                breakdown.risk_score_hcc += value;
                if tables.is_chronic(cc) {
                    breakdown.risk_score_chronic_only += value;
                }
            }
            VariableKind::Interaction { demographic } => {
                if demographic {
                    breakdown.risk_score_demographics += value;
                }
            }
        }
    }

    debug!(
        segment = %profile.segment,
        risk_score = breakdown.risk_score,
        missing = breakdown.coefficients_missing.len(),
        "summed coefficients"
    );
    breakdown
}
