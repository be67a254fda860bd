//! Constraint-aware plan construction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use wsc_core::{CompositionPlan, ConstraintAwarePlan, NodeRef, PlanError, ServiceNode};

use crate::adjust::{adjust_constraints, AdjustmentStats};

/// Turn a composition plan into an unadjusted constraint-aware plan.
///
/// One [`ServiceNode`] is created per plan node, keeping its layer and its
/// position in the name-sorted layer, and carrying a copy of the service's
/// constraints. Edges are re-derived from the search graph, restricted to
/// predecessors that are in the plan and in the adjacent layer. Empty layers
/// are then removed and the result validated.
pub fn build_ca_plan(plan: &CompositionPlan) -> Result<ConstraintAwarePlan, PlanError> {
    let mut addresses: HashMap<NodeRef, NodeRef> = HashMap::new();
    let mut layers: Vec<Vec<ServiceNode>> = Vec::with_capacity(plan.layer_count());
    for (l, layer) in plan.layers().iter().enumerate() {
        let mut nodes = Vec::with_capacity(layer.len());
        for (i, node) in layer.iter().enumerate() {
            let id = NodeRef::new(l, i);
            addresses.insert(node.id, id);
            nodes.push(ServiceNode::new(id, Arc::clone(&node.service)));
        }
        layers.push(nodes);
    }

    let mut ca = ConstraintAwarePlan::from_nodes(layers);
    for node in plan.nodes() {
        let Some(&to) = addresses.get(&node.id) else {
            continue;
        };
        for pred in &node.predecessors {
            if pred.layer + 1 != node.id.layer {
                continue;
            }
            if let Some(&from) = addresses.get(pred) {
                ca.link(from, to);
            }
        }
    }

    let removed = ca.remove_empty_layers();
    if removed > 0 {
        debug!(removed, "compacted empty plan layers");
    }
    ca.validate()?;
    Ok(ca)
}

/// Build and adjust a constraint-aware plan for every composition plan.
pub fn construct_ca_plans(plans: &[CompositionPlan]) -> Result<Vec<ConstraintAwarePlan>, PlanError> {
    construct_ca_plans_with(plans, true).map(|(plans, _)| plans)
}

/// [`construct_ca_plans`] with constraint adjustment optional.
pub fn construct_ca_plans_with(
    plans: &[CompositionPlan],
    adjust: bool,
) -> Result<(Vec<ConstraintAwarePlan>, AdjustmentStats), PlanError> {
    let mut stats = AdjustmentStats::default();
    let mut built = Vec::with_capacity(plans.len());
    for plan in plans {
        let mut ca = build_ca_plan(plan)?;
        if adjust {
            stats += adjust_constraints(&mut ca);
            ca.validate()?;
        }
        built.push(ca);
    }
    Ok((built, stats))
}
