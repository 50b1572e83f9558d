//! Pipeline configuration
//!
//! `ScoringOptions` is deserializable with `deny_unknown_fields`, so an
//! unrecognized option in a config document is a fatal error at the
//! deserialization boundary rather than a silently ignored knob.

use rafter_tables::TableSources;
use serde::Deserialize;

/// Configuration for a scoring pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScoringOptions {
    /// Apply the CMS eligibility filter to service records before scoring.
    pub filter_claims: bool,
    /// Keep institutional outpatient records with a retained bill type even
    /// when the procedure code is not eligible.
    pub retain_outpatient_bill_types: bool,
    /// When an 837 professional line carries no diagnosis pointers, link
    /// every claim diagnosis rather than only the principal.
    pub link_all_when_pointers_absent: bool,
    /// Per-table path overrides; `None` selects the embedded defaults.
    pub tables: TableSources,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        ScoringOptions {
            filter_claims: true,
            retain_outpatient_bill_types: true,
            link_all_when_pointers_absent: true,
            tables: TableSources::default(),
        }
    }
}
