//! Demographics classifier
//!
//! Derives the coefficient segment, the age-sex cell and the demographic
//! modifier variables from validated beneficiary demographics. The segment
//! is the primary key into the coefficient table; an explicit `category`
//! override (e.g. `INS`) wins over derivation.

use rafter_models::{DemographicProfile, Demographics, DualEligibility, ModelVariant};
use tracing::debug;

/// Age-sex buckets, shared by every variant.
fn age_bucket(age: u32) -> &'static str {
    match age {
        0..=34 => "0_34",
        35..=44 => "35_44",
        45..=54 => "45_54",
        55..=59 => "55_59",
        60..=64 => "60_64",
        65..=69 => "65_69",
        70..=74 => "70_74",
        75..=79 => "75_79",
        80..=84 => "80_84",
        85..=89 => "85_89",
        90..=94 => "90_94",
        _ => "95_GT",
    }
}

/// Community segment from dual status and age band.
fn community_segment(dual: DualEligibility, aged: bool) -> &'static str {
    match (dual, aged) {
        (DualEligibility::NonDual, true) => "CNA",
        (DualEligibility::NonDual, false) => "CND",
        (DualEligibility::Partial, true) => "CPA",
        (DualEligibility::Partial, false) => "CPD",
        (DualEligibility::Full, true) => "CFA",
        (DualEligibility::Full, false) => "CFD",
    }
}

/// ESRD segment: new enrollees score as `DNE`; a recent transplant selects a
/// post-graft segment by months since graft; everything else (including 10+
/// months post-graft) is the dialysis segment.
fn esrd_segment(demographics: &Demographics) -> &'static str {
    if demographics.new_enrollee {
        return "DNE";
    }
    match demographics.graft_months {
        Some(0..=3) => "GRAFT_0_3",
        Some(4..=9) => "GRAFT_4_9",
        _ => "DI",
    }
}

/// Classify validated demographics for `variant`.
pub fn classify(demographics: &Demographics, variant: ModelVariant) -> DemographicProfile {
    let aged = demographics.age >= 65;
    let segment = match &demographics.category {
        Some(category) => category.clone(),
        None if variant.is_esrd() => esrd_segment(demographics).to_string(),
        None if demographics.new_enrollee => "NE".to_string(),
        None => community_segment(demographics.dual_eligibility, aged).to_string(),
    };
    let cell = format!("{}{}", demographics.sex.letter(), age_bucket(demographics.age));

    // New-enrollee layouts are age-sex only; modifiers apply elsewhere.
    let mut variables = Vec::new();
    if !matches!(segment.as_str(), "NE" | "DNE") {
        if demographics.orig_disabled && aged {
            variables.push(format!("OriginallyDisabled_{}", match demographics.sex {
                rafter_models::Sex::F => "Female",
                rafter_models::Sex::M => "Male",
            }));
        }
        if segment == "INS" {
            variables.push("LTI".to_string());
        }
        if demographics.low_income && variant.is_rx() {
            variables.push("LowIncome".to_string());
        }
    }

    debug!(segment = %segment, cell = %cell, "classified demographics");

    DemographicProfile {
        segment,
        cell,
        variables,
        disabled: !aged,
        age: demographics.age,
        sex: demographics.sex,
        dual_eligibility: demographics.dual_eligibility,
        orig_disabled: demographics.orig_disabled,
        new_enrollee: demographics.new_enrollee,
        esrd: demographics.esrd,
        snp: demographics.snp,
        low_income: demographics.low_income,
        graft_months: demographics.graft_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafter_models::Sex;

    #[test]
    fn community_segments() {
        let mut demo = Demographics::new(67, Sex::F);
        assert_eq!(classify(&demo, ModelVariant::V28).segment, "CNA");

        demo.age = 45;
        assert_eq!(classify(&demo, ModelVariant::V28).segment, "CND");

        demo.dual_eligibility = DualEligibility::Full;
        assert_eq!(classify(&demo, ModelVariant::V28).segment, "CFD");

        demo.dual_eligibility = DualEligibility::Partial;
        demo.age = 80;
        assert_eq!(classify(&demo, ModelVariant::V28).segment, "CPA");
    }

    #[test]
    fn age_sex_cells() {
        assert_eq!(classify(&Demographics::new(0, Sex::F), ModelVariant::V28).cell, "F0_34");
        assert_eq!(classify(&Demographics::new(67, Sex::F), ModelVariant::V28).cell, "F65_69");
        assert_eq!(classify(&Demographics::new(120, Sex::M), ModelVariant::V28).cell, "M95_GT");
    }

    #[test]
    fn new_enrollee_segment_has_no_modifiers() {
        let mut demo = Demographics::new(70, Sex::M);
        demo.new_enrollee = true;
        demo.orig_disabled = true;
        let profile = classify(&demo, ModelVariant::V28);
        assert_eq!(profile.segment, "NE");
        assert!(profile.variables.is_empty());
    }

    #[test]
    fn originally_disabled_fires_only_when_aged() {
        let mut demo = Demographics::new(67, Sex::F);
        demo.orig_disabled = true;
        let profile = classify(&demo, ModelVariant::V28);
        assert_eq!(profile.variables, vec!["OriginallyDisabled_Female"]);

        demo.age = 45;
        let profile = classify(&demo, ModelVariant::V28);
        assert!(profile.variables.is_empty());
    }

    #[test]
    fn category_override_wins() {
        let mut demo = Demographics::new(82, Sex::F);
        demo.category = Some("INS".to_string());
        let profile = classify(&demo, ModelVariant::V28);
        assert_eq!(profile.segment, "INS");
        assert_eq!(profile.variables, vec!["LTI"]);
    }

    #[test]
    fn esrd_graft_buckets() {
        let mut demo = Demographics::new(72, Sex::M);
        demo.esrd = true;
        demo.graft_months = Some(2);
        assert_eq!(classify(&demo, ModelVariant::EsrdV21).segment, "GRAFT_0_3");

        demo.graft_months = Some(7);
        assert_eq!(classify(&demo, ModelVariant::EsrdV21).segment, "GRAFT_4_9");

        demo.graft_months = Some(14);
        assert_eq!(classify(&demo, ModelVariant::EsrdV21).segment, "DI");

        demo.graft_months = None;
        assert_eq!(classify(&demo, ModelVariant::EsrdV21).segment, "DI");

        demo.new_enrollee = true;
        assert_eq!(classify(&demo, ModelVariant::EsrdV21).segment, "DNE");
    }
}
