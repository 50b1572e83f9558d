//! Interaction engine
//!
//! Interaction variables are table-driven: each `ra_interactions_<variant>`
//! row names a variable and gives its predicate in a closed mini-language
//! (`HCC<n>`, `AND`, `OR`, `NOT`, `ANY(list)`, `COUNT(list|*) OP n`,
//! `AGE OP n`, demographic flags). The rows are compiled once at pipeline
//! construction; evaluation walks the compiled predicates against the
//! surviving CC set and the classified demographics.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

use crate::error::{Error, Result};
use ast::Expr;
use parser::Parser;
use rafter_models::DemographicProfile;
use rafter_tables::InteractionDef;
use std::collections::BTreeSet;
use tracing::debug;

/// One compiled interaction variable.
#[derive(Debug, Clone)]
pub struct CompiledInteraction {
    pub name: String,
    expr: Expr,
    /// Predicates that never read the CC set are demographic interactions:
    /// they count into the demographic score component, and they are the
    /// only interactions evaluated for new-enrollee segments.
    pub demographic: bool,
}

/// An interaction variable that fired for a beneficiary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredInteraction {
    pub name: String,
    pub demographic: bool,
}

/// The compiled interaction table for one model variant.
#[derive(Debug, Clone, Default)]
pub struct InteractionSet {
    interactions: Vec<CompiledInteraction>,
}

impl InteractionSet {
    /// Compile the raw table rows. An unparseable expression is a fatal
    /// configuration problem.
    pub fn compile(defs: &[InteractionDef]) -> Result<Self> {
        let mut interactions = Vec::with_capacity(defs.len());
        for def in defs {
            let expr = Parser::new(&def.expression)
                .and_then(Parser::parse)
                .map_err(|message| Error::InvalidInteraction {
                    name: def.name.clone(),
                    message,
                })?;
            let demographic = !expr.references_ccs();
            interactions.push(CompiledInteraction {
                name: def.name.clone(),
                expr,
                demographic,
            });
        }
        Ok(InteractionSet { interactions })
    }

    /// Evaluate every applicable predicate and return the variables that
    /// fired, in table order. New-enrollee segments evaluate only the
    /// demographic interactions; disease interactions never fire for them.
    pub fn evaluate(
        &self,
        ccs: &BTreeSet<u32>,
        profile: &DemographicProfile,
    ) -> Vec<FiredInteraction> {
        let new_enrollee_segment = matches!(profile.segment.as_str(), "NE" | "DNE");
        let fired: Vec<FiredInteraction> = self
            .interactions
            .iter()
            .filter(|interaction| !(new_enrollee_segment && !interaction.demographic))
            .filter(|interaction| interaction.expr.evaluate(ccs, profile))
            .map(|interaction| FiredInteraction {
                name: interaction.name.clone(),
                demographic: interaction.demographic,
            })
            .collect();
        debug!(
            segment = %profile.segment,
            fired = fired.len(),
            "evaluated interactions"
        );
        fired
    }
}
