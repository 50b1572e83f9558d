//! Table sources: embedded defaults and per-file path overrides
//!
//! The default tables ship inside the crate (`data/`), so scoring works with
//! no filesystem access. `TableSources` lets a deployment replace individual
//! files with newer model-year publications; a `None` path always selects the
//! embedded default.

use crate::error::{Error, Result};
use crate::loader::{self, InteractionDef};
use rafter_models::ModelVariant;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Per-table path overrides. Unknown keys are rejected at deserialization,
/// making an unrecognized option a fatal configuration error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TableSources {
    pub dx_cc_table: Option<PathBuf>,
    pub hierarchy_table: Option<PathBuf>,
    pub coefficient_table: Option<PathBuf>,
    pub procedure_table: Option<PathBuf>,
    pub chronic_flags_table: Option<PathBuf>,
    pub interaction_table: Option<PathBuf>,
}

const DX_TO_CC: &str = include_str!("../data/ra_dx_to_cc_2026.csv");
const COEFFICIENTS: &str = include_str!("../data/ra_coefficients_2026.csv");
const PROCEDURES: &str = include_str!("../data/ra_eligible_cpt_hcpcs_2026.csv");
const CHRONIC: &str = include_str!("../data/hcc_is_chronic.csv");

fn embedded_hierarchy(variant: ModelVariant) -> &'static str {
    match variant {
        ModelVariant::V22 => include_str!("../data/ra_hierarchies_v22.csv"),
        ModelVariant::V24 => include_str!("../data/ra_hierarchies_v24.csv"),
        ModelVariant::V28 => include_str!("../data/ra_hierarchies_v28.csv"),
        ModelVariant::EsrdV21 => include_str!("../data/ra_hierarchies_esrd_v21.csv"),
        ModelVariant::EsrdV24 => include_str!("../data/ra_hierarchies_esrd_v24.csv"),
        ModelVariant::RxHccV08 => include_str!("../data/ra_hierarchies_rxhcc_v08.csv"),
    }
}

fn embedded_interactions(variant: ModelVariant) -> &'static str {
    match variant {
        ModelVariant::V22 => include_str!("../data/ra_interactions_v22.csv"),
        ModelVariant::V24 => include_str!("../data/ra_interactions_v24.csv"),
        ModelVariant::V28 => include_str!("../data/ra_interactions_v28.csv"),
        ModelVariant::EsrdV21 => include_str!("../data/ra_interactions_esrd_v21.csv"),
        ModelVariant::EsrdV24 => include_str!("../data/ra_interactions_esrd_v24.csv"),
        ModelVariant::RxHccV08 => include_str!("../data/ra_interactions_rxhcc_v08.csv"),
    }
}

/// Read an override path, or fall back to the embedded content.
fn read_source(
    path: Option<&Path>,
    embedded: &'static str,
    table: &str,
) -> Result<(Cow<'static, str>, String)> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| Error::TableUnreadable {
                table: path.display().to_string(),
                source,
            })?;
            Ok((Cow::Owned(content), path.display().to_string()))
        }
        None => Ok((Cow::Borrowed(embedded), table.to_string())),
    }
}

pub(crate) fn load_dx_to_cc(
    sources: &TableSources,
) -> Result<HashMap<ModelVariant, HashMap<String, Vec<u32>>>> {
    let (content, label) = read_source(
        sources.dx_cc_table.as_deref(),
        DX_TO_CC,
        "ra_dx_to_cc_2026.csv",
    )?;
    loader::load_dx_to_cc(&label, &content)
}

pub(crate) fn load_coefficients(
    sources: &TableSources,
) -> Result<HashMap<ModelVariant, HashMap<String, HashMap<String, f64>>>> {
    let (content, label) = read_source(
        sources.coefficient_table.as_deref(),
        COEFFICIENTS,
        "ra_coefficients_2026.csv",
    )?;
    loader::load_coefficients(&label, &content)
}

pub(crate) fn load_procedures(sources: &TableSources) -> Result<HashSet<String>> {
    let (content, label) = read_source(
        sources.procedure_table.as_deref(),
        PROCEDURES,
        "ra_eligible_cpt_hcpcs_2026.csv",
    )?;
    loader::load_procedures(&label, &content)
}

pub(crate) fn load_chronic(sources: &TableSources) -> Result<HashMap<u32, bool>> {
    let (content, label) = read_source(
        sources.chronic_flags_table.as_deref(),
        CHRONIC,
        "hcc_is_chronic.csv",
    )?;
    loader::load_chronic(&label, &content)
}

pub(crate) fn load_hierarchies(
    sources: &TableSources,
    override_variant: Option<ModelVariant>,
) -> Result<HashMap<ModelVariant, HashMap<u32, Vec<u32>>>> {
    let mut hierarchies = HashMap::new();
    for variant in ModelVariant::ALL {
        let path = match override_variant {
            Some(target) if target == variant => sources.hierarchy_table.as_deref(),
            _ => None,
        };
        let (content, label) = read_source(
            path,
            embedded_hierarchy(variant),
            &format!("ra_hierarchies_{}.csv", variant.table_stem()),
        )?;
        hierarchies.insert(variant, loader::load_hierarchy(&label, &content)?);
    }
    Ok(hierarchies)
}

pub(crate) fn load_interactions(
    sources: &TableSources,
    override_variant: Option<ModelVariant>,
) -> Result<HashMap<ModelVariant, Vec<InteractionDef>>> {
    let mut interactions = HashMap::new();
    for variant in ModelVariant::ALL {
        let path = match override_variant {
            Some(target) if target == variant => sources.interaction_table.as_deref(),
            _ => None,
        };
        let (content, label) = read_source(
            path,
            embedded_interactions(variant),
            &format!("ra_interactions_{}.csv", variant.table_stem()),
        )?;
        interactions.insert(variant, loader::load_interactions(&label, &content)?);
    }
    Ok(interactions)
}
