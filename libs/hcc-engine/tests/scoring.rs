//! Scoring scenarios and algebraic invariants over the embedded tables.

use rafter_engine::{calculate_raf, Pipeline};
use rafter_models::{Demographics, DualEligibility, ModelVariant, RafResult, Sex};

const TOLERANCE: f64 = 1e-9;

fn demographics(age: u32, sex: Sex) -> Demographics {
    Demographics::new(age, sex)
}

fn score(diagnoses: &[&str], variant: ModelVariant, demo: &Demographics) -> RafResult {
    calculate_raf(diagnoses, variant, demo).unwrap()
}

/// Scenario 1: community non-dual aged beneficiary with diabetes, treated
/// hypertension and CKD stage 3.
#[test]
fn community_aged_female() {
    let demo = demographics(67, Sex::F);
    let result = score(&["E11.9", "I10", "N18.3"], ModelVariant::V28, &demo);

    assert_eq!(result.demographics.segment, "CNA");
    assert!(result.hcc_list.contains(&38), "diabetes HCC expected");
    assert!(result.hcc_list.contains(&329), "CKD stage 3 HCC expected");
    assert!(result.risk_score > 0.0);
    assert!(result.unmapped_diagnoses.is_empty());
    assert_eq!(result.model_name, "CMS-HCC Model V28");
}

/// Scenario 2: full-dual disabled beneficiary; diabetes plus heart failure
/// fires the DIABETES_CHF interaction.
#[test]
fn full_dual_disabled_interaction() {
    let mut demo = demographics(45, Sex::F);
    demo.dual_eligibility = DualEligibility::Full;
    demo.orig_disabled = true;
    let result = score(&["E11.9", "I50.9"], ModelVariant::V28, &demo);

    assert_eq!(result.demographics.segment, "CFD");
    assert!(result.hcc_list.contains(&38));
    assert!(result.hcc_list.contains(&226));
    assert!(result.interactions.contains_key("DIABETES_CHF"));
    assert!(result.coefficients.contains_key("DIABETES_CHF"));
}

/// Scenario 3: duplicated diagnosis codes change nothing.
#[test]
fn duplicate_diagnosis_is_idempotent() {
    let mut demo = demographics(75, Sex::F);
    demo.dual_eligibility = DualEligibility::Full;
    let single = score(&["E11.9"], ModelVariant::V28, &demo);
    let doubled = score(&["E11.9", "E11.9"], ModelVariant::V28, &demo);
    assert_eq!(single, doubled);
}

/// Scenario 4: new enrollees score on age-sex and NE variables only.
#[test]
fn new_enrollee_has_no_hcc_coefficients() {
    let mut demo = demographics(70, Sex::M);
    demo.new_enrollee = true;
    let result = score(&["E11.9", "I50.9", "N18.5"], ModelVariant::V28, &demo);

    assert_eq!(result.demographics.segment, "NE");
    assert!(result
        .coefficients
        .keys()
        .all(|variable| !variable.starts_with("HCC")));
    assert!(result.coefficients.contains_key("M70_74"));
    assert!(result.interactions.contains_key("NMCAID_NORIGDIS_NE"));
    assert_eq!(result.risk_score_hcc, 0.0);
}

/// Scenario 5: ESRD beneficiary two months post-transplant lands in the
/// 0-3 month graft segment and scores its demographic coefficient.
#[test]
fn esrd_recent_graft_segment() {
    let mut demo = demographics(72, Sex::M);
    demo.esrd = true;
    demo.graft_months = Some(2);
    let result = score(&["N18.6"], ModelVariant::EsrdV21, &demo);

    assert_eq!(result.demographics.segment, "GRAFT_0_3");
    let cell = rafter_tables::defaults()
        .coefficient(ModelVariant::EsrdV21, "GRAFT_0_3", "M70_74")
        .unwrap();
    assert!((result.risk_score - cell).abs() < TOLERANCE);
}

/// Scenario 6: a hierarchy parent suppresses its child, and removing the
/// parent's diagnosis restores the child.
#[test]
fn hierarchy_suppression_and_restoration() {
    let demo = demographics(67, Sex::F);

    // N18.5 maps to CKD stage 5 (326), N18.4 to stage 4 (327); 326
    // suppresses 327.
    let both = score(&["N18.5", "N18.4"], ModelVariant::V28, &demo);
    assert!(both.hcc_list.contains(&326));
    assert!(!both.hcc_list.contains(&327));

    let without_parent = score(&["N18.4"], ModelVariant::V28, &demo);
    assert!(without_parent.hcc_list.contains(&327));
}

/// Invariant 1: the score decomposes into demographics + HCCs + disease
/// interaction coefficients.
#[test]
fn score_decomposition() {
    let mut demo = demographics(67, Sex::F);
    demo.dual_eligibility = DualEligibility::Full;
    demo.orig_disabled = true;
    let result = score(
        &["E11.9", "I50.9", "N18.5", "C34.11", "J44.9"],
        ModelVariant::V28,
        &demo,
    );

    // No demographic interactions fire for a community segment, so every
    // fired interaction here is a disease interaction.
    let disease_interactions: f64 = result.interactions.values().sum();
    let recomposed = result.risk_score_demographics + result.risk_score_hcc + disease_interactions;
    assert!((result.risk_score - recomposed).abs() < TOLERANCE);
}

/// Invariant 2: hierarchy output is a subset of the mapper output.
#[test]
fn hierarchy_cannot_add_ccs() {
    let demo = demographics(67, Sex::F);
    let result = score(
        &["N18.5", "N18.4", "N18.3", "E11.9"],
        ModelVariant::V28,
        &demo,
    );
    for hcc in &result.hcc_list {
        assert!(result.cc_to_dx.contains_key(hcc));
    }
}

/// Invariant 3: diagnosis order does not matter.
#[test]
fn permutation_invariance() {
    let demo = demographics(67, Sex::F);
    let forward = score(&["E11.9", "I50.9", "N18.5"], ModelVariant::V28, &demo);
    let backward = score(&["N18.5", "I50.9", "E11.9"], ModelVariant::V28, &demo);
    assert_eq!(forward.risk_score, backward.risk_score);
    assert_eq!(forward.hcc_list, backward.hcc_list);
    assert_eq!(forward.coefficients, backward.coefficients);
}

/// Invariant 5: a diagnosis whose CC is suppressed by a present parent
/// contributes nothing.
#[test]
fn suppressed_diagnosis_is_inert() {
    let demo = demographics(67, Sex::F);
    let base = score(&["N18.5", "E11.9"], ModelVariant::V28, &demo);
    let with_child = score(&["N18.5", "E11.9", "N18.4"], ModelVariant::V28, &demo);
    assert_eq!(base.risk_score, with_child.risk_score);
    assert_eq!(base.hcc_list, with_child.hcc_list);
}

/// Invariant 7: the chronic-only component never exceeds the HCC component.
#[test]
fn chronic_component_is_bounded() {
    let demo = demographics(67, Sex::F);
    for diagnoses in [
        vec!["E11.9"],
        vec!["E11.9", "I10"],
        vec!["E11.9", "I50.21", "N18.5", "C34.11"],
        vec!["F20.0", "J44.9", "M05.79"],
    ] {
        let result = score(&diagnoses, ModelVariant::V28, &demo);
        assert!(result.risk_score_chronic_only <= result.risk_score_hcc + TOLERANCE);
    }
}

#[test]
fn age_boundaries() {
    let newborn = score(&[], ModelVariant::V28, &demographics(0, Sex::F));
    assert_eq!(newborn.demographics.cell, "F0_34");
    assert_eq!(newborn.demographics.segment, "CND");

    let centenarian = score(&[], ModelVariant::V28, &demographics(120, Sex::M));
    assert_eq!(centenarian.demographics.cell, "M95_GT");
    assert!(centenarian.risk_score > 0.0);
}

/// An empty diagnosis list scores the demographic component alone.
#[test]
fn empty_diagnosis_list() {
    let result = score(&[], ModelVariant::V28, &demographics(67, Sex::F));
    assert!(result.hcc_list.is_empty());
    assert!((result.risk_score - result.risk_score_demographics).abs() < TOLERANCE);
    assert!(result.risk_score > 0.0);
}

/// A diagnosis with no mapping row lands in the unmapped trace.
#[test]
fn unmapped_diagnosis_is_traced() {
    let result = score(&["Z00.00"], ModelVariant::V28, &demographics(67, Sex::F));
    assert!(result.hcc_list.is_empty());
    assert_eq!(result.unmapped_diagnoses, vec!["Z0000"]);
}

/// Two diagnoses mapping to one CC contribute one coefficient and both
/// appear in the trace.
#[test]
fn shared_cc_counts_once() {
    let result = score(&["E11.9", "E10.9"], ModelVariant::V28, &demographics(67, Sex::F));
    assert_eq!(result.hcc_list, vec![38]);
    let dxs = &result.cc_to_dx[&38];
    assert!(dxs.contains("E119") && dxs.contains("E109"));
    assert_eq!(
        result
            .coefficients
            .keys()
            .filter(|k| k.starts_with("HCC"))
            .count(),
        1
    );
}

/// The mapping differs per variant: the same chart scores different CCs
/// under V24.
#[test]
fn variant_selects_mapping() {
    let demo = demographics(67, Sex::F);
    let v28 = score(&["E11.9", "I50.9"], ModelVariant::V28, &demo);
    let v24 = score(&["E11.9", "I50.9"], ModelVariant::V24, &demo);
    assert_eq!(v28.hcc_list, vec![38, 226]);
    assert_eq!(v24.hcc_list, vec![19, 85]);
    assert!(v24.interactions.contains_key("DIABETES_CHF"));
}

/// ESRD variants refuse demographics without the ESRD flag.
#[test]
fn esrd_variant_requires_flag() {
    let demo = demographics(72, Sex::M);
    let err = calculate_raf(&["N18.6"], ModelVariant::EsrdV21, &demo);
    assert!(err.is_err());
}

/// Scoring an already-mapped CC set applies hierarchies and sums the same
/// coefficients as the diagnosis path.
#[test]
fn score_from_ccs_matches_diagnosis_path() {
    let demo = demographics(67, Sex::F);
    let pipeline = Pipeline::with_defaults(ModelVariant::V28).unwrap();
    let via_dx = pipeline
        .calculate_from_diagnosis(&["E11.9", "I50.9"], &demo)
        .unwrap();
    let via_ccs = pipeline
        .score_from_ccs([38, 226].into_iter().collect(), &demo)
        .unwrap();
    assert_eq!(via_dx.risk_score, via_ccs.risk_score);
    assert_eq!(via_dx.hcc_list, via_ccs.hcc_list);
    assert_eq!(via_dx.coefficients, via_ccs.coefficients);
}

/// The result serializes with deterministic key order.
#[test]
fn result_serialization_shape() {
    let result = score(&["E11.9"], ModelVariant::V28, &demographics(67, Sex::F));
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("risk_score").is_some());
    assert!(json.get("hcc_list").is_some());
    assert!(json.get("service_level_data").is_none());
    assert_eq!(json["model_name"], "CMS-HCC Model V28");
}
