//! Terminal outcomes of a composition run.

use std::fmt;

use serde::Serialize;
use wsc_core::{ConstraintAwarePlan, Parameter};

/// Why a valid request admits no composition over a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unsolvable {
    /// No service is runnable from the request inputs.
    EmptyGraph,
    /// Exactly one service was admitted, so no composition is needed.
    SingleServiceSufficient { service: String },
    /// Some requested outputs can never be produced.
    OutputsUnreachable { missing: Vec<Parameter> },
    /// Backward search found no service set covering the outputs.
    NoPlanSets,
    /// Every plan set collapsed to a single service after pruning.
    NoPlans,
}

impl fmt::Display for Unsolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsolvable::EmptyGraph => {
                write!(f, "no service can run on the request inputs")
            }
            Unsolvable::SingleServiceSufficient { service } => {
                write!(f, "service '{service}' alone satisfies the request; no composition needed")
            }
            Unsolvable::OutputsUnreachable { missing } => {
                let names: Vec<&str> = missing.iter().map(Parameter::as_str).collect();
                write!(f, "requested outputs unreachable: {}", names.join(", "))
            }
            Unsolvable::NoPlanSets => {
                write!(f, "no combination of services produces every requested output")
            }
            Unsolvable::NoPlans => {
                write!(f, "no plan with more than one service survived pruning")
            }
        }
    }
}

/// The result of a composition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionOutcome {
    Solved(Vec<ConstraintAwarePlan>),
    Unsolvable(Unsolvable),
}

impl CompositionOutcome {
    /// The plans, or an empty slice when unsolvable.
    pub fn plans(&self) -> &[ConstraintAwarePlan] {
        match self {
            CompositionOutcome::Solved(plans) => plans,
            CompositionOutcome::Unsolvable(_) => &[],
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, CompositionOutcome::Solved(_))
    }

    pub fn unsolvable(&self) -> Option<&Unsolvable> {
        match self {
            CompositionOutcome::Unsolvable(reason) => Some(reason),
            CompositionOutcome::Solved(_) => None,
        }
    }
}
