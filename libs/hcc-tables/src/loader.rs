//! CSV row readers for the reference tables
//!
//! Each loader validates the header against its expected columns, then folds
//! rows into the indexed structure the scoring engine queries. Rows whose
//! `model_name` is unknown are skipped (they belong to model years this build
//! does not carry); rows with unparseable keys are configuration errors.

use crate::error::{Error, Result};
use csv::StringRecord;
use rafter_models::{normalize_diagnosis, ModelVariant};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// An interaction definition as it appears in `ra_interactions_<variant>.csv`:
/// the variable name and its (not yet parsed) predicate expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionDef {
    pub name: String,
    pub expression: String,
}

const DX_TO_CC_COLUMNS: &[&str] = &["diagnosis_code", "cc", "model_name"];
const HIERARCHY_COLUMNS: &[&str] = &["parent_cc", "child_cc"];
const COEFFICIENT_COLUMNS: &[&str] = &["model_name", "segment", "variable", "coefficient"];
const PROCEDURE_COLUMNS: &[&str] = &["code"];
const CHRONIC_COLUMNS: &[&str] = &["cc", "is_chronic"];
const INTERACTION_COLUMNS: &[&str] = &["variable", "expression"];

/// Validate the header row and hand back a positioned record iterator.
fn records<'a>(
    table: &str,
    content: &'a str,
    expected: &'static [&'static str],
) -> Result<csv::StringRecordsIntoIter<&'a [u8]>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let header = reader.headers().map_err(|source| Error::Csv {
        table: table.to_string(),
        source,
    })?;
    let got: Vec<String> = header.iter().map(str::to_string).collect();
    if got != expected {
        return Err(Error::MalformedHeader {
            table: table.to_string(),
            expected,
            got,
        });
    }
    Ok(reader.into_records())
}

fn field<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("")
}

fn parse_cc(table: &str, row: u64, raw: &str) -> Result<u32> {
    // Some published files prefix the numeric CC with "HCC".
    let trimmed = raw.strip_prefix("HCC").unwrap_or(raw);
    trimmed.parse::<u32>().map_err(|_| Error::MalformedRow {
        table: table.to_string(),
        row,
        message: format!("condition category '{raw}' is not numeric"),
    })
}

/// `diagnosis_code,cc,model_name` → per-variant `normalized dx → [cc]`.
pub fn load_dx_to_cc(
    table: &str,
    content: &str,
) -> Result<HashMap<ModelVariant, HashMap<String, Vec<u32>>>> {
    let mut mapping: HashMap<ModelVariant, HashMap<String, Vec<u32>>> = HashMap::new();
    let mut skipped = 0usize;

    for (index, record) in records(table, content, DX_TO_CC_COLUMNS)?.enumerate() {
        let row = index as u64 + 2;
        let record = record.map_err(|source| Error::Csv {
            table: table.to_string(),
            source,
        })?;
        let Ok(variant) = field(&record, 2).parse::<ModelVariant>() else {
            skipped += 1;
            continue;
        };
        let dx = normalize_diagnosis(field(&record, 0));
        if dx.is_empty() {
            return Err(Error::MalformedRow {
                table: table.to_string(),
                row,
                message: "empty diagnosis code".to_string(),
            });
        }
        let cc = parse_cc(table, row, field(&record, 1))?;
        let ccs = mapping.entry(variant).or_default().entry(dx).or_default();
        if !ccs.contains(&cc) {
            ccs.push(cc);
        }
    }

    debug!(table, variants = mapping.len(), skipped, "loaded dx-to-cc mapping");
    Ok(mapping)
}

/// `parent_cc,child_cc` → parent → suppressed children.
pub fn load_hierarchy(table: &str, content: &str) -> Result<HashMap<u32, Vec<u32>>> {
    let mut edges: HashMap<u32, Vec<u32>> = HashMap::new();

    for (index, record) in records(table, content, HIERARCHY_COLUMNS)?.enumerate() {
        let row = index as u64 + 2;
        let record = record.map_err(|source| Error::Csv {
            table: table.to_string(),
            source,
        })?;
        let parent = parse_cc(table, row, field(&record, 0))?;
        let child = parse_cc(table, row, field(&record, 1))?;
        let children = edges.entry(parent).or_default();
        if !children.contains(&child) {
            children.push(child);
        }
    }

    debug!(table, parents = edges.len(), "loaded hierarchy edges");
    Ok(edges)
}

/// `model_name,segment,variable,coefficient` → per-variant
/// `segment → variable → value`.
pub fn load_coefficients(
    table: &str,
    content: &str,
) -> Result<HashMap<ModelVariant, HashMap<String, HashMap<String, f64>>>> {
    let mut coefficients: HashMap<ModelVariant, HashMap<String, HashMap<String, f64>>> =
        HashMap::new();
    let mut skipped = 0usize;

    for (index, record) in records(table, content, COEFFICIENT_COLUMNS)?.enumerate() {
        let row = index as u64 + 2;
        let record = record.map_err(|source| Error::Csv {
            table: table.to_string(),
            source,
        })?;
        let Ok(variant) = field(&record, 0).parse::<ModelVariant>() else {
            skipped += 1;
            continue;
        };
        let segment = field(&record, 1).to_string();
        let variable = field(&record, 2).to_string();
        if segment.is_empty() || variable.is_empty() {
            return Err(Error::MalformedRow {
                table: table.to_string(),
                row,
                message: "empty segment or variable".to_string(),
            });
        }
        let value: f64 = field(&record, 3).parse().map_err(|_| Error::MalformedRow {
            table: table.to_string(),
            row,
            message: format!("coefficient '{}' is not a decimal", field(&record, 3)),
        })?;
        coefficients
            .entry(variant)
            .or_default()
            .entry(segment)
            .or_default()
            .insert(variable, value);
    }

    debug!(table, variants = coefficients.len(), skipped, "loaded coefficients");
    Ok(coefficients)
}

/// Single-column `code` file → eligible CPT/HCPCS set.
pub fn load_procedures(table: &str, content: &str) -> Result<HashSet<String>> {
    let mut codes = HashSet::new();

    for record in records(table, content, PROCEDURE_COLUMNS)? {
        let record = record.map_err(|source| Error::Csv {
            table: table.to_string(),
            source,
        })?;
        let code = field(&record, 0);
        if !code.is_empty() {
            codes.insert(code.to_ascii_uppercase());
        }
    }

    debug!(table, codes = codes.len(), "loaded eligible procedures");
    Ok(codes)
}

/// `cc,is_chronic` with `0|1` flags → `cc → bool`.
pub fn load_chronic(table: &str, content: &str) -> Result<HashMap<u32, bool>> {
    let mut chronic = HashMap::new();

    for (index, record) in records(table, content, CHRONIC_COLUMNS)?.enumerate() {
        let row = index as u64 + 2;
        let record = record.map_err(|source| Error::Csv {
            table: table.to_string(),
            source,
        })?;
        let cc = parse_cc(table, row, field(&record, 0))?;
        let flag = match field(&record, 1) {
            "1" => true,
            "0" => false,
            other => {
                return Err(Error::MalformedRow {
                    table: table.to_string(),
                    row,
                    message: format!("is_chronic must be 0 or 1, got '{other}'"),
                })
            }
        };
        chronic.insert(cc, flag);
    }

    Ok(chronic)
}

/// `variable,expression` → interaction definitions in table order.
pub fn load_interactions(table: &str, content: &str) -> Result<Vec<InteractionDef>> {
    let mut defs = Vec::new();

    for (index, record) in records(table, content, INTERACTION_COLUMNS)?.enumerate() {
        let row = index as u64 + 2;
        let record = record.map_err(|source| Error::Csv {
            table: table.to_string(),
            source,
        })?;
        let name = field(&record, 0).to_string();
        let expression = field(&record, 1).to_string();
        if name.is_empty() || expression.is_empty() {
            return Err(Error::MalformedRow {
                table: table.to_string(),
                row,
                message: "empty variable name or expression".to_string(),
            });
        }
        defs.push(InteractionDef { name, expression });
    }

    debug!(table, definitions = defs.len(), "loaded interaction definitions");
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_header() {
        let err = load_chronic("hcc_is_chronic.csv", "cc,chronic\n19,1\n").unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { .. }));
    }

    #[test]
    fn skips_unknown_model_rows() {
        let content = "diagnosis_code,cc,model_name\n\
                       E119,38,CMS-HCC Model V28\n\
                       E119,12,CMS-HCC Model V99\n";
        let mapping = load_dx_to_cc("ra_dx_to_cc.csv", content).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&ModelVariant::V28]["E119"], vec![38]);
    }

    #[test]
    fn rejects_non_numeric_cc() {
        let content = "parent_cc,child_cc\nxyz,19\n";
        assert!(matches!(
            load_hierarchy("ra_hierarchies_v28.csv", content),
            Err(Error::MalformedRow { .. })
        ));
    }

    #[test]
    fn accepts_hcc_prefixed_cc() {
        let content = "cc,is_chronic\nHCC19,1\n";
        let chronic = load_chronic("hcc_is_chronic.csv", content).unwrap();
        assert_eq!(chronic[&19], true);
    }

    #[test]
    fn normalizes_diagnosis_keys() {
        let content = "diagnosis_code,cc,model_name\ne11.9,38,CMS-HCC Model V28\n";
        let mapping = load_dx_to_cc("ra_dx_to_cc.csv", content).unwrap();
        assert!(mapping[&ModelVariant::V28].contains_key("E119"));
    }
}
