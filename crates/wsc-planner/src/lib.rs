//! Automated composition planning over a service repository.
//!
//! The pipeline runs in four stages:
//! 1. [`forward_expansion`] layers the services reachable from the request inputs.
//! 2. [`backward_search`] enumerates service sets that produce the requested outputs.
//! 3. [`construct_plans`] prunes each set to the services that contribute.
//! 4. [`construct_ca_plans`] links the survivors into constraint-aware plans and
//!    moves every constraint to where its parameter first becomes available.
//!
//! [`compose`] runs all four and reports on the run.

pub mod adjust;
pub mod backward;
pub mod constraint_aware;
pub mod error;
pub mod forward;
pub mod outcome;
pub mod pipeline;
pub mod prune;
pub mod report;

#[cfg(test)]
mod fixtures;

pub use adjust::{adjust_constraints, place_constraint, AdjustmentStats, Resolution};
pub use backward::{backward_search, non_empty_subsets, PlanSet, MAX_POWER_SET_WIDTH};
pub use constraint_aware::{build_ca_plan, construct_ca_plans, construct_ca_plans_with};
pub use error::PlannerError;
pub use forward::{forward_expansion, Expansion};
pub use outcome::{CompositionOutcome, Unsolvable};
pub use pipeline::{compose, Composition, PlannerConfig};
pub use prune::{construct_plans, construct_plans_with_stats, is_feasible, prune, PruneStats};
pub use report::{CompositionReport, StageTiming};
