//! End-to-end pipeline tests: raw 837 envelopes through filtering to a
//! scored result, and the equivalence of the raw and pre-normalized entry
//! points.

use rafter_engine::{Pipeline, ScoringOptions};
use rafter_models::{Demographics, ModelVariant, ServiceRecord, Sex};
use rafter_x12::extract_service_records;

const ISA: &str = "ISA*00*          *00*          *ZZ*SUBMITTER*ZZ*RECEIVER*230415*1430*^*00501*000000001*0*P*:~";

fn professional_envelope() -> String {
    format!(
        "{ISA}GS*HC*SUB*REC*20230415*1430*1*X*005010X222A1~\
         ST*837*0001*005010X222A1~\
         CLM*PAT001*500***11:B:1~\
         HI*ABK:E11.9*ABF:I50.9~\
         LX*1~SV1*HC:99214*250*UN*1***1:2~DTP*472*D8*20230415~\
         LX*2~SV1*HC:00000*250*UN*1***1~\
         SE*9*0001~GE*1*1~IEA*1*000000001~"
    )
}

fn inpatient_envelope() -> String {
    format!(
        "{ISA}GS*HC*SUB*REC*20230415*1430*1*X*005010X223A2~\
         ST*837*0001*005010X223A2~\
         CLM*PAT002*15000***11:A:1~\
         HI*ABK:N18.5~\
         LX*1~SV2*0120*HC:99223*15000*UN*7~\
         SE*6*0001~GE*1*1~IEA*1*000000001~"
    )
}

fn demographics() -> Demographics {
    Demographics::new(67, Sex::F)
}

#[test]
fn scores_raw_envelopes() {
    let pipeline = Pipeline::with_defaults(ModelVariant::V28).unwrap();
    let professional = professional_envelope();
    let inpatient = inpatient_envelope();
    let result = pipeline
        .run(&[professional.as_str(), inpatient.as_str()], &demographics())
        .unwrap();

    // The ineligible-procedure line is filtered but its diagnoses still
    // arrive through the claim's eligible line.
    assert_eq!(result.diagnosis_codes, vec!["E119", "I509", "N185"]);
    assert_eq!(result.hcc_list, vec![38, 226, 326]);
    assert!(result.interactions.contains_key("DIABETES_CHF"));
    assert!(result.interactions.contains_key("HF_KIDNEY"));

    let service_data = result.service_level_data.as_ref().unwrap();
    assert_eq!(service_data.len(), 2);
    assert!(service_data.iter().any(|r| r.claim_type == "71"));
    assert!(service_data.iter().any(|r| r.claim_type == "73"));
}

/// Parsing an envelope, re-feeding the normalized records, and re-scoring
/// yields the same result as scoring the raw envelope.
#[test]
fn normalization_round_trip() {
    let pipeline = Pipeline::with_defaults(ModelVariant::V28).unwrap();
    let envelope = professional_envelope();

    let direct = pipeline.run(&[envelope.as_str()], &demographics()).unwrap();
    let records = extract_service_records(&envelope).unwrap();
    let via_records = pipeline
        .run_from_service_records(records, &demographics())
        .unwrap();

    assert_eq!(direct, via_records);
}

#[test]
fn malformed_envelope_is_surfaced() {
    let pipeline = Pipeline::with_defaults(ModelVariant::V28).unwrap();
    let envelope = professional_envelope();
    let truncated = &envelope[..envelope.find("IEA").unwrap()];
    assert!(pipeline.run(&[truncated], &demographics()).is_err());
}

#[test]
fn filter_can_be_disabled() {
    let options = ScoringOptions {
        filter_claims: false,
        ..Default::default()
    };
    let pipeline = Pipeline::new(ModelVariant::V28, options).unwrap();

    // An unclassifiable record would be dropped by the filter; with
    // filtering off its diagnoses score anyway.
    let record = ServiceRecord {
        claim_type: String::new(),
        diagnosis_codes: vec!["E11.9".to_string()],
        ..Default::default()
    };
    let result = pipeline
        .run_from_service_records(vec![record], &demographics())
        .unwrap();
    assert_eq!(result.hcc_list, vec![38]);
}

#[test]
fn out_of_range_pointer_is_rejected() {
    let pipeline = Pipeline::with_defaults(ModelVariant::V28).unwrap();
    let record = ServiceRecord {
        claim_type: "71".to_string(),
        diagnosis_codes: vec!["E11.9".to_string()],
        linked_diagnosis_pointers: vec![4],
        ..Default::default()
    };
    assert!(pipeline
        .run_from_service_records(vec![record], &demographics())
        .is_err());
}

/// External records (e.g. from a FHIR adapter) may carry undotted or dotted
/// codes; normalization happens at the pipeline boundary.
#[test]
fn external_records_are_normalized() {
    let pipeline = Pipeline::with_defaults(ModelVariant::V28).unwrap();
    let record = ServiceRecord {
        claim_type: "73".to_string(),
        bill_type: "11X".to_string(),
        diagnosis_codes: vec!["e11.9".to_string(), "E119".to_string()],
        ..Default::default()
    };
    let result = pipeline
        .run_from_service_records(vec![record], &demographics())
        .unwrap();
    assert_eq!(result.diagnosis_codes, vec!["E119"]);
    assert_eq!(result.hcc_list, vec![38]);
}
