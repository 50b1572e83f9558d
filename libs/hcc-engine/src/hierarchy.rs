//! Hierarchy engine
//!
//! A CC present in the input suppresses its children as published in the
//! variant's hierarchy table. The table is expected to carry the transitive
//! closure the model authors intend; computing a closure here would change
//! results for some variants, so membership is tested against the original
//! input set only.

use rafter_models::ModelVariant;
use rafter_tables::ReferenceTables;
use std::collections::BTreeSet;
use tracing::debug;

/// `S' = S \ { c : exists p in S with (p, c) in edges(variant) }`.
pub fn apply_hierarchies(
    ccs: &BTreeSet<u32>,
    variant: ModelVariant,
    tables: &ReferenceTables,
) -> BTreeSet<u32> {
    let Some(edges) = tables.hierarchy(variant) else {
        return ccs.clone();
    };

    let mut suppressed: BTreeSet<u32> = BTreeSet::new();
    for parent in ccs {
        if let Some(children) = edges.get(parent) {
            suppressed.extend(children.iter().copied());
        }
    }

    let surviving: BTreeSet<u32> = ccs.difference(&suppressed).copied().collect();
    if surviving.len() != ccs.len() {
        debug!(
            input = ccs.len(),
            surviving = surviving.len(),
            "applied hierarchy suppression"
        );
    }
    surviving
}
