//! Backward search: enumerate candidate service sets over the search graph.
//!
//! Every layer is tried as a starting point, last layer first. At the
//! starting layer each non-empty subset that produces at least one requested
//! output opens a branch; below it, every non-empty subset of the union of
//! the selected nodes' predecessors extends the branch one layer down. A
//! branch that reaches layer 0 is kept when its nodes jointly produce every
//! requested output and it holds more than one service.
//!
//! The enumeration is exhaustive, so it is exponential in layer width.
//! Subsets are indexed by a `u64` bitmask, which caps any enumerated node
//! set at [`MAX_POWER_SET_WIDTH`].

use std::collections::BTreeSet;

use tracing::debug;
use wsc_core::{CompositionRequest, NodeRef, Parameter, SearchGraph};

use crate::error::PlannerError;

/// Candidate plan: node addresses in one search graph.
pub type PlanSet = BTreeSet<NodeRef>;

/// Largest node set whose subsets can be enumerated.
pub const MAX_POWER_SET_WIDTH: usize = 63;

/// Iterate over the non-empty subsets of `items`, in bitmask order.
pub fn non_empty_subsets<T: Copy>(items: &[T]) -> impl Iterator<Item = Vec<T>> + '_ {
    debug_assert!(items.len() <= MAX_POWER_SET_WIDTH);
    let count: u64 = 1u64 << items.len();
    (1..count).map(move |mask| {
        items
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1u64 << bit) != 0)
            .map(|(_, item)| *item)
            .collect()
    })
}

/// Enumerate the plan sets of `graph` for `request`.
///
/// Plan sets are returned grouped by starting layer, deepest first.
pub fn backward_search(
    request: &CompositionRequest,
    graph: &SearchGraph,
) -> Result<Vec<PlanSet>, PlannerError> {
    for (layer, nodes) in graph.layers().enumerate() {
        if nodes.len() > MAX_POWER_SET_WIDTH {
            return Err(PlannerError::LayerTooWide {
                layer,
                width: nodes.len(),
                limit: MAX_POWER_SET_WIDTH,
            });
        }
    }

    let search = Search {
        graph,
        wanted: request.output_set(),
    };
    let mut found = Vec::new();
    for start in (0..graph.layer_count()).rev() {
        let before = found.len();
        let layer: Vec<NodeRef> = graph.layer(start).iter().map(|n| n.id).collect();
        for subset in non_empty_subsets(&layer) {
            if !search.produces_any(&subset) {
                continue;
            }
            let branch: PlanSet = subset.iter().copied().collect();
            search.descend(start, &subset, branch, &mut found)?;
        }
        debug!(start, plan_sets = found.len() - before, "searched starting layer");
    }
    Ok(found)
}

struct Search<'a> {
    graph: &'a SearchGraph,
    wanted: BTreeSet<&'a Parameter>,
}

impl Search<'_> {
    fn produces_any(&self, nodes: &[NodeRef]) -> bool {
        nodes
            .iter()
            .filter_map(|r| self.graph.node(*r))
            .any(|n| n.service.outputs.iter().any(|o| self.wanted.contains(o)))
    }

    fn covers(&self, branch: &PlanSet) -> bool {
        let produced: BTreeSet<&Parameter> = branch
            .iter()
            .filter_map(|r| self.graph.node(*r))
            .flat_map(|n| n.service.outputs.iter())
            .collect();
        self.wanted.is_subset(&produced)
    }

    fn descend(
        &self,
        layer: usize,
        selected: &[NodeRef],
        branch: PlanSet,
        found: &mut Vec<PlanSet>,
    ) -> Result<(), PlannerError> {
        if layer == 0 {
            if branch.len() > 1 && self.covers(&branch) {
                found.push(branch);
            }
            return Ok(());
        }

        let predecessors: Vec<NodeRef> = selected
            .iter()
            .filter_map(|r| self.graph.node(*r))
            .flat_map(|n| n.predecessors.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if predecessors.len() > MAX_POWER_SET_WIDTH {
            return Err(PlannerError::LayerTooWide {
                layer: layer - 1,
                width: predecessors.len(),
                limit: MAX_POWER_SET_WIDTH,
            });
        }

        for subset in non_empty_subsets(&predecessors) {
            let mut next = branch.clone();
            next.extend(subset.iter().copied());
            self.descend(layer - 1, &subset, next, found)?;
        }
        Ok(())
    }
}
