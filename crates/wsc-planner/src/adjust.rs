//! Constraint adjustment: move each constraint to the earliest node at which
//! its parameter is known.
//!
//! For a node X with constraint C on parameter P, the search walks X's
//! ancestors one layer at a time. The first layer holding a node whose
//! effects include P decides: C is copied to every successor of every such
//! node (the points where P has just been produced) and removed from X
//! unless X is one of them. When no ancestor affects P, C is hoisted to all
//! layer-0 nodes and removed from X.

use std::collections::BTreeSet;

use tracing::trace;
use wsc_core::{Constraint, ConstraintAwarePlan, NodeRef};

/// Where a constraint ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Copied to the successors of the affecting nodes found at `layer`.
    Adjusted { layer: usize },
    /// No ancestor affects the parameter; copied to every layer-0 node.
    HoistedToStart,
}

/// Counters from one adjustment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustmentStats {
    pub adjusted: usize,
    pub hoisted: usize,
}

impl std::ops::AddAssign for AdjustmentStats {
    fn add_assign(&mut self, other: Self) {
        self.adjusted += other.adjusted;
        self.hoisted += other.hoisted;
    }
}

/// Adjust every constraint of every node in layers 1 and above.
///
/// Only the constraints each node holds when the pass starts are placed;
/// copies added by the pass are final. Layers are visited in ascending
/// order and nodes by position. Layer-0 constraints are already at the
/// earliest point and stay put.
pub fn adjust_constraints(plan: &mut ConstraintAwarePlan) -> AdjustmentStats {
    let held: Vec<(NodeRef, Vec<Constraint>)> = plan
        .nodes()
        .filter(|n| n.id.layer > 0 && !n.constraints.is_empty())
        .map(|n| (n.id, n.constraints.clone()))
        .collect();

    let mut stats = AdjustmentStats::default();
    for (id, constraints) in &held {
        for constraint in constraints {
            match place_constraint(plan, *id, constraint) {
                Resolution::Adjusted { .. } => stats.adjusted += 1,
                Resolution::HoistedToStart => stats.hoisted += 1,
            }
        }
    }
    stats
}

/// Relocate one constraint held by node `id`.
pub fn place_constraint(
    plan: &mut ConstraintAwarePlan,
    id: NodeRef,
    constraint: &Constraint,
) -> Resolution {
    let mut frontier: BTreeSet<NodeRef> = plan
        .node(id)
        .map(|n| n.predecessors.clone())
        .unwrap_or_default();

    while !frontier.is_empty() {
        let matches: Vec<NodeRef> = frontier
            .iter()
            .copied()
            .filter(|r| {
                plan.node(*r)
                    .is_some_and(|n| n.service.affects(&constraint.parameter))
            })
            .collect();

        if let Some(first) = matches.first() {
            let layer = first.layer;
            let targets: BTreeSet<NodeRef> = matches
                .iter()
                .filter_map(|r| plan.node(*r))
                .flat_map(|n| n.successors.iter().copied())
                .collect();
            for target in &targets {
                plan.add_constraint(*target, constraint);
            }
            if !targets.contains(&id) {
                plan.remove_constraint(id, constraint);
            }
            trace!(%constraint, from = %id, layer, "constraint adjusted");
            return Resolution::Adjusted { layer };
        }

        frontier = frontier
            .iter()
            .filter_map(|r| plan.node(*r))
            .flat_map(|n| n.predecessors.iter().copied())
            .collect();
    }

    let starts: Vec<NodeRef> = plan.layer(0).iter().map(|n| n.id).collect();
    for start in starts {
        plan.add_constraint(start, constraint);
    }
    if id.layer != 0 {
        plan.remove_constraint(id, constraint);
    }
    trace!(%constraint, from = %id, "constraint hoisted");
    Resolution::HoistedToStart
}
