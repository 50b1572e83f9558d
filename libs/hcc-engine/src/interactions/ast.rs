//! AST and evaluation for interaction predicates
//!
//! Predicates are boolean expressions over the surviving CC set and the
//! classified demographics. Evaluation is side-effect-free.

use rafter_models::{DemographicProfile, DualEligibility, Sex};
use std::collections::BTreeSet;

/// Comparison operator in `COUNT` and `AGE` atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl Comparison {
    fn holds(&self, left: u64, right: u64) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Ge => left >= right,
            Comparison::Gt => left > right,
            Comparison::Le => left <= right,
            Comparison::Lt => left < right,
        }
    }
}

/// Demographic flag atoms available to predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Female,
    Male,
    Disabled,
    Aged,
    OrigDisabled,
    /// Any Medicaid dual status (partial or full).
    Mcaid,
    FullDual,
    PartialDual,
    NonDual,
    NewEnrollee,
    LowIncome,
    Snp,
    Institutional,
    Esrd,
}

impl Flag {
    pub fn from_name(name: &str) -> Option<Flag> {
        match name.to_ascii_uppercase().as_str() {
            "FEMALE" => Some(Flag::Female),
            "MALE" => Some(Flag::Male),
            "DISABLED" => Some(Flag::Disabled),
            "AGED" => Some(Flag::Aged),
            "ORIG_DISABLED" | "ORIGDIS" => Some(Flag::OrigDisabled),
            "MCAID" => Some(Flag::Mcaid),
            "FULL_DUAL" => Some(Flag::FullDual),
            "PARTIAL_DUAL" => Some(Flag::PartialDual),
            "NON_DUAL" => Some(Flag::NonDual),
            "NEW_ENROLLEE" => Some(Flag::NewEnrollee),
            "LOW_INCOME" => Some(Flag::LowIncome),
            "SNP" => Some(Flag::Snp),
            "INSTITUTIONAL" | "LTI" => Some(Flag::Institutional),
            "ESRD" => Some(Flag::Esrd),
            _ => None,
        }
    }
}

/// Which CCs a `COUNT` atom counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountScope {
    /// `COUNT(*)`: every surviving CC.
    All,
    /// `COUNT(list)`: surviving CCs within the list.
    List(Vec<u32>),
}

/// A parsed interaction predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// `HCC<n>`: membership of one CC.
    Cc(u32),
    /// `ANY(list)`: at least one listed CC present.
    Any(Vec<u32>),
    /// `COUNT(scope) OP n`.
    Count {
        scope: CountScope,
        op: Comparison,
        value: u64,
    },
    /// `AGE OP n`.
    Age { op: Comparison, value: u64 },
    Flag(Flag),
}

impl Expr {
    /// Evaluate against the surviving CC set and the classified profile.
    pub fn evaluate(&self, ccs: &BTreeSet<u32>, profile: &DemographicProfile) -> bool {
        match self {
            Expr::And(left, right) => {
                left.evaluate(ccs, profile) && right.evaluate(ccs, profile)
            }
            Expr::Or(left, right) => {
                left.evaluate(ccs, profile) || right.evaluate(ccs, profile)
            }
            Expr::Not(inner) => !inner.evaluate(ccs, profile),
            Expr::Cc(cc) => ccs.contains(cc),
            Expr::Any(list) => list.iter().any(|cc| ccs.contains(cc)),
            Expr::Count { scope, op, value } => {
                let count = match scope {
                    CountScope::All => ccs.len(),
                    CountScope::List(list) => {
                        list.iter().filter(|cc| ccs.contains(cc)).count()
                    }
                } as u64;
                op.holds(count, *value)
            }
            Expr::Age { op, value } => op.holds(u64::from(profile.age), *value),
            Expr::Flag(flag) => evaluate_flag(*flag, profile),
        }
    }

    /// Whether the predicate reads the CC set at all. Predicates that do not
    /// are demographic interactions: they count into the demographic score
    /// component and are the only ones evaluated for new-enrollee segments.
    pub fn references_ccs(&self) -> bool {
        match self {
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.references_ccs() || right.references_ccs()
            }
            Expr::Not(inner) => inner.references_ccs(),
            Expr::Cc(_) | Expr::Any(_) | Expr::Count { .. } => true,
            Expr::Age { .. } | Expr::Flag(_) => false,
        }
    }
}

fn evaluate_flag(flag: Flag, profile: &DemographicProfile) -> bool {
    match flag {
        Flag::Female => profile.sex == Sex::F,
        Flag::Male => profile.sex == Sex::M,
        Flag::Disabled => profile.disabled,
        Flag::Aged => !profile.disabled,
        Flag::OrigDisabled => profile.orig_disabled,
        Flag::Mcaid => profile.dual_eligibility.is_dual(),
        Flag::FullDual => profile.dual_eligibility == DualEligibility::Full,
        Flag::PartialDual => profile.dual_eligibility == DualEligibility::Partial,
        Flag::NonDual => profile.dual_eligibility == DualEligibility::NonDual,
        // New-enrollee interactions key off the segment so they stay inert
        // under an explicit category override.
        Flag::NewEnrollee => matches!(profile.segment.as_str(), "NE" | "DNE"),
        Flag::LowIncome => profile.low_income,
        Flag::Snp => profile.snp,
        Flag::Institutional => profile.segment == "INS",
        Flag::Esrd => profile.esrd,
    }
}
