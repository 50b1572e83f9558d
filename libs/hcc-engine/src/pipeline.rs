//! Pipeline orchestrator
//!
//! Wires the stages behind three entry points: from raw 837 envelopes, from
//! pre-normalized service records, and from diagnosis codes alone. A
//! pipeline resolves its reference tables once at construction (embedded
//! defaults, or configured paths) and compiles the variant's interaction
//! table; scoring calls are pure functions over that shared state and are
//! safe to run in parallel.

use crate::coefficients::sum_coefficients;
use crate::demographics::classify;
use crate::error::Result;
use crate::filter::{filter_records, FilterPolicy};
use crate::hierarchy::apply_hierarchies;
use crate::interactions::InteractionSet;
use crate::mapper::map_diagnoses;
use crate::options::ScoringOptions;
use rafter_models::{normalize_diagnosis, Demographics, ModelVariant, RafResult, ServiceRecord};
use rafter_tables::{ReferenceTables, TableSources};
use rafter_x12::Extractor;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Reference tables are either the process-wide embedded defaults or an
/// owned set loaded from configured paths.
#[derive(Debug, Clone)]
enum Tables {
    Shared(&'static ReferenceTables),
    Owned(Arc<ReferenceTables>),
}

/// A configured scoring pipeline for one model variant.
#[derive(Debug, Clone)]
pub struct Pipeline {
    variant: ModelVariant,
    options: ScoringOptions,
    tables: Tables,
    interactions: InteractionSet,
}

impl Pipeline {
    /// Build a pipeline, resolving tables and compiling the interaction
    /// predicates. Configuration problems surface here, never mid-call.
    pub fn new(variant: ModelVariant, options: ScoringOptions) -> Result<Self> {
        let tables = if options.tables == TableSources::default() {
            Tables::Shared(rafter_tables::defaults())
        } else {
            Tables::Owned(Arc::new(ReferenceTables::load(
                &options.tables,
                Some(variant),
            )?))
        };
        let interactions = {
            let tables = match &tables {
                Tables::Shared(tables) => *tables,
                Tables::Owned(tables) => tables.as_ref(),
            };
            InteractionSet::compile(tables.interaction_defs(variant))?
        };
        debug!(variant = %variant, "constructed scoring pipeline");
        Ok(Pipeline {
            variant,
            options,
            tables,
            interactions,
        })
    }

    /// Pipeline over the embedded default tables and default options.
    pub fn with_defaults(variant: ModelVariant) -> Result<Self> {
        Pipeline::new(variant, ScoringOptions::default())
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    fn tables(&self) -> &ReferenceTables {
        match &self.tables {
            Tables::Shared(tables) => tables,
            Tables::Owned(tables) => tables.as_ref(),
        }
    }

    /// Score from raw 837 envelopes: parse, filter, then score. FHIR EOB
    /// sources are external adapters that deliver `ServiceRecord`s to
    /// `run_from_service_records`.
    pub fn run(&self, envelopes: &[&str], demographics: &Demographics) -> Result<RafResult> {
        let extractor = Extractor {
            link_all_when_pointers_absent: self.options.link_all_when_pointers_absent,
        };
        let mut records = Vec::new();
        for envelope in envelopes {
            records.extend(extractor.extract(envelope)?);
        }
        self.run_from_service_records(records, demographics)
    }

    /// Score pre-normalized service records: filter, then score the union of
    /// their diagnoses.
    pub fn run_from_service_records(
        &self,
        records: Vec<ServiceRecord>,
        demographics: &Demographics,
    ) -> Result<RafResult> {
        for record in &records {
            record.validate()?;
        }
        let surviving = if self.options.filter_claims {
            let policy = FilterPolicy {
                retain_outpatient_bill_types: self.options.retain_outpatient_bill_types,
            };
            filter_records(records, self.tables(), &policy)
        } else {
            records
        };

        let mut diagnoses = Vec::new();
        let mut seen = BTreeSet::new();
        for record in &surviving {
            for code in &record.diagnosis_codes {
                let code = normalize_diagnosis(code);
                if !code.is_empty() && seen.insert(code.clone()) {
                    diagnoses.push(code);
                }
            }
        }

        self.score(diagnoses, Some(surviving), demographics)
    }

    /// Score a diagnosis list directly, skipping parsing and filtering.
    pub fn calculate_from_diagnosis<S: AsRef<str>>(
        &self,
        diagnoses: &[S],
        demographics: &Demographics,
    ) -> Result<RafResult> {
        let mut deduplicated = Vec::new();
        let mut seen = BTreeSet::new();
        for code in diagnoses {
            let code = normalize_diagnosis(code.as_ref());
            if !code.is_empty() && seen.insert(code.clone()) {
                deduplicated.push(code);
            }
        }
        self.score(deduplicated, None, demographics)
    }

    /// Score an already-mapped CC set, bypassing the diagnosis join. Useful
    /// for standalone calculators and debugging; hierarchies still apply.
    pub fn score_from_ccs(
        &self,
        ccs: BTreeSet<u32>,
        demographics: &Demographics,
    ) -> Result<RafResult> {
        demographics.validate(self.variant)?;
        let profile = classify(demographics, self.variant);
        let hccs = apply_hierarchies(&ccs, self.variant, self.tables());
        let fired = self.interactions.evaluate(&hccs, &profile);
        let breakdown = sum_coefficients(&profile, &hccs, &fired, self.variant, self.tables());

        Ok(RafResult {
            risk_score: breakdown.risk_score,
            risk_score_demographics: breakdown.risk_score_demographics,
            risk_score_chronic_only: breakdown.risk_score_chronic_only,
            risk_score_hcc: breakdown.risk_score_hcc,
            hcc_list: hccs.into_iter().collect(),
            cc_to_dx: Default::default(),
            coefficients: breakdown.coefficients,
            coefficients_missing: breakdown.coefficients_missing,
            interactions: breakdown.interactions,
            demographics: profile,
            model_name: self.variant.label().to_string(),
            diagnosis_codes: Vec::new(),
            service_level_data: None,
            unmapped_diagnoses: Vec::new(),
        })
    }

    /// The shared tail of every entry point: map, suppress, interact, sum,
    /// and assemble the result with its trace.
    fn score(
        &self,
        diagnosis_codes: Vec<String>,
        service_level_data: Option<Vec<ServiceRecord>>,
        demographics: &Demographics,
    ) -> Result<RafResult> {
        demographics.validate(self.variant)?;
        let profile = classify(demographics, self.variant);
        let mapping = map_diagnoses(&diagnosis_codes, self.variant, self.tables());
        let hccs = apply_hierarchies(&mapping.ccs, self.variant, self.tables());
        let fired = self.interactions.evaluate(&hccs, &profile);
        let breakdown = sum_coefficients(&profile, &hccs, &fired, self.variant, self.tables());

        Ok(RafResult {
            risk_score: breakdown.risk_score,
            risk_score_demographics: breakdown.risk_score_demographics,
            risk_score_chronic_only: breakdown.risk_score_chronic_only,
            risk_score_hcc: breakdown.risk_score_hcc,
            hcc_list: hccs.into_iter().collect(),
            cc_to_dx: mapping.cc_to_dx,
            coefficients: breakdown.coefficients,
            coefficients_missing: breakdown.coefficients_missing,
            interactions: breakdown.interactions,
            demographics: profile,
            model_name: self.variant.label().to_string(),
            diagnosis_codes,
            service_level_data,
            unmapped_diagnoses: mapping.unmapped,
        })
    }
}
