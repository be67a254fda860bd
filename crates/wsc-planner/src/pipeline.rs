//! Composition pipeline orchestrator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use wsc_core::{digest, CompositionRequest, Service};

use crate::backward::{backward_search, MAX_POWER_SET_WIDTH};
use crate::constraint_aware::construct_ca_plans_with;
use crate::error::PlannerError;
use crate::forward::{forward_expansion, Expansion};
use crate::outcome::{CompositionOutcome, Unsolvable};
use crate::prune::{construct_plans_with_stats, is_feasible};
use crate::report::CompositionReport;

/// Configuration for the composition pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Widest search-graph layer the backward search will enumerate.
    pub max_layer_width: usize,
    /// Whether to move constraints to where their parameter is produced.
    pub adjust_constraints: bool,
    /// Drop plans in which some service's inputs are never provided.
    pub discard_infeasible: bool,
    /// Drop plans whose service-name set repeats an earlier plan's.
    pub dedupe_plans: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_layer_width: 16,
            adjust_constraints: true,
            discard_infeasible: false,
            dedupe_plans: false,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.max_layer_width == 0 || self.max_layer_width > MAX_POWER_SET_WIDTH {
            return Err(PlannerError::InvalidConfig {
                message: format!(
                    "max_layer_width must be between 1 and {MAX_POWER_SET_WIDTH}, got {}",
                    self.max_layer_width
                ),
            });
        }
        Ok(())
    }
}

/// Output of a composition run.
#[derive(Debug, Clone)]
pub struct Composition {
    pub outcome: CompositionOutcome,
    pub report: CompositionReport,
}

fn elapsed_ms(since: Instant) -> u64 {
    saturating_ms(since.elapsed())
}

fn saturating_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Run the full composition pipeline:
/// forward expansion -> backward search -> pruning -> constraint-aware plans -> report.
pub fn compose(
    request: &CompositionRequest,
    repository: &[Arc<Service>],
    config: &PlannerConfig,
) -> Result<Composition, PlannerError> {
    config.validate()?;
    let _span = info_span!("compose", services = repository.len()).entered();
    let start = Instant::now();

    let mut report = CompositionReport {
        repository_digest: digest(repository).ok(),
        repository_size: repository.len(),
        ..CompositionReport::default()
    };

    let outcome = run_stages(request, repository, config, &mut report)?;

    report.duration_ms = elapsed_ms(start);
    report.outcome = match &outcome {
        CompositionOutcome::Solved(plans) => {
            report.plans = plans.len();
            "solved".to_string()
        }
        CompositionOutcome::Unsolvable(reason) => reason.to_string(),
    };
    info!(
        plans = report.plans,
        duration_ms = report.duration_ms,
        outcome = %report.outcome,
        "composition finished"
    );
    Ok(Composition { outcome, report })
}

fn run_stages(
    request: &CompositionRequest,
    repository: &[Arc<Service>],
    config: &PlannerConfig,
    report: &mut CompositionReport,
) -> Result<CompositionOutcome, PlannerError> {
    // Stage 1: Forward expansion
    let stage = Instant::now();
    let expansion = forward_expansion(request, repository)?;
    report.record_stage("forward expansion", elapsed_ms(stage));
    let graph = match expansion {
        Expansion::Reachable(graph) => graph,
        Expansion::Unsolvable(reason) => return Ok(CompositionOutcome::Unsolvable(reason)),
    };
    report.graph_layers = graph.layer_count();
    report.graph_nodes = graph.node_count();
    report.max_layer_width = graph.max_layer_width();

    if let Some((layer, width)) = graph
        .layers()
        .map(<[_]>::len)
        .enumerate()
        .find(|(_, width)| *width > config.max_layer_width)
    {
        warn!(layer, width, limit = config.max_layer_width, "search graph layer too wide");
        return Err(PlannerError::LayerTooWide {
            layer,
            width,
            limit: config.max_layer_width,
        });
    }

    // Stage 2: Backward search
    let stage = Instant::now();
    let sets = backward_search(request, &graph)?;
    report.record_stage("backward search", elapsed_ms(stage));
    report.plan_sets = sets.len();
    if sets.is_empty() {
        return Ok(CompositionOutcome::Unsolvable(Unsolvable::NoPlanSets));
    }

    // Stage 3: Pruning
    let stage = Instant::now();
    let (mut plans, stats) = construct_plans_with_stats(request, &graph, &sets, config.dedupe_plans);
    report.plans_discarded = stats.discarded;
    report.plans_duplicated = stats.duplicates;
    if config.discard_infeasible {
        let before = plans.len();
        plans.retain(|plan| is_feasible(request, plan));
        report.plans_infeasible = before - plans.len();
        debug!(infeasible = report.plans_infeasible, "filtered infeasible plans");
    }
    report.record_stage("plan construction", elapsed_ms(stage));
    if plans.is_empty() {
        return Ok(CompositionOutcome::Unsolvable(Unsolvable::NoPlans));
    }

    // Stage 4: Constraint-aware plans
    let stage = Instant::now();
    let (ca_plans, adjustment) = construct_ca_plans_with(&plans, config.adjust_constraints)?;
    report.record_stage("constraint-aware construction", elapsed_ms(stage));
    report.constraints_adjusted = adjustment.adjusted;
    report.constraints_hoisted = adjustment.hoisted;

    Ok(CompositionOutcome::Solved(ca_plans))
}
