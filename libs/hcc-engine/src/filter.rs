//! Service-level eligibility filter
//!
//! CMS accepts diagnoses for risk adjustment only from qualifying
//! encounters. Professional services qualify by procedure code;
//! institutional outpatient services by procedure code or retained type of
//! bill; inpatient services qualify unconditionally. Records whose source
//! could not be classified are discarded.

use rafter_models::ServiceRecord;
use rafter_tables::ReferenceTables;
use tracing::debug;

/// Outpatient types of bill whose services are retained regardless of
/// procedure code, per the encounter data filtering guidance.
pub const RETAINED_OUTPATIENT_BILL_TYPES: &[&str] = &[
    "12X", "13X", "43X", "71X", "73X", "76X", "77X", "85X", "87X",
];

/// Filter policy knobs; see the pipeline options for defaults.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    /// Keep institutional outpatient records with a retained bill type even
    /// when the procedure code is not eligible.
    pub retain_outpatient_bill_types: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy {
            retain_outpatient_bill_types: true,
        }
    }
}

fn procedure_eligible(record: &ServiceRecord, tables: &ReferenceTables) -> bool {
    record
        .procedure_code
        .as_deref()
        .is_some_and(|code| tables.procedure_eligible(code))
}

fn retained_bill_type(record: &ServiceRecord) -> bool {
    RETAINED_OUTPATIENT_BILL_TYPES.contains(&record.bill_type.as_str())
}

/// Retain the records whose diagnoses qualify for risk adjustment.
pub fn filter_records(
    records: Vec<ServiceRecord>,
    tables: &ReferenceTables,
    policy: &FilterPolicy,
) -> Vec<ServiceRecord> {
    let input = records.len();
    let surviving: Vec<ServiceRecord> = records
        .into_iter()
        .filter(|record| match record.claim_type.as_str() {
            "" => false,
            "73" => true,
            "72" => {
                procedure_eligible(record, tables)
                    || (policy.retain_outpatient_bill_types && retained_bill_type(record))
            }
            // Professional, and any other classified claim type, qualifies
            // by procedure code.
            _ => procedure_eligible(record, tables),
        })
        .collect();
    debug!(input, surviving = surviving.len(), "filtered service records");
    surviving
}
