//! Plan construction: prune plan sets down to the services that matter.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace};
use wsc_core::{CompositionPlan, CompositionRequest, NodeRef, Parameter, SearchGraph};

use crate::backward::PlanSet;

/// Counters from one plan-construction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Plans left with at most one service after pruning.
    pub discarded: usize,
    /// Plans whose service names repeat an earlier plan.
    pub duplicates: usize,
}

/// Reduce one plan set to a composition plan.
///
/// Layers are walked from the last to the first. A node survives when one
/// of its outputs is a requested output or an input of a surviving node in
/// a later layer. Consumers in the same layer do not count, since services
/// of one layer run side by side.
///
/// Emptied layers are left in place; the constraint-aware builder compacts
/// them.
pub fn prune(request: &CompositionRequest, graph: &SearchGraph, set: &PlanSet) -> CompositionPlan {
    let mut plan = CompositionPlan::from_nodes(set.iter().filter_map(|r| graph.node(*r)).cloned());
    let wanted = request.output_set();
    let mut required: BTreeSet<&Parameter> = BTreeSet::new();
    let mut keep: BTreeSet<NodeRef> = BTreeSet::new();

    for layer in plan.layers().iter().rev() {
        let mut consumed = Vec::new();
        for node in layer {
            let useful = node
                .service
                .outputs
                .iter()
                .any(|o| wanted.contains(o) || required.contains(o));
            if useful {
                keep.insert(node.id);
                consumed.extend(node.service.inputs.iter());
            } else {
                trace!(service = node.name(), "pruned");
            }
        }
        required.extend(consumed);
    }

    plan.retain(|n| keep.contains(&n.id));
    plan
}

/// Prune every plan set, dropping plans left with at most one service.
pub fn construct_plans(
    request: &CompositionRequest,
    graph: &SearchGraph,
    sets: &[PlanSet],
) -> Vec<CompositionPlan> {
    construct_plans_with_stats(request, graph, sets, false).0
}

/// [`construct_plans`], also reporting what was dropped.
///
/// With `dedupe`, a plan holding the same service names as an earlier one
/// is dropped too; the first one found is kept.
pub fn construct_plans_with_stats(
    request: &CompositionRequest,
    graph: &SearchGraph,
    sets: &[PlanSet],
    dedupe: bool,
) -> (Vec<CompositionPlan>, PruneStats) {
    let mut stats = PruneStats::default();
    let mut seen: HashSet<BTreeSet<String>> = HashSet::new();
    let mut plans = Vec::new();

    for set in sets {
        let plan = prune(request, graph, set);
        if plan.node_count() <= 1 {
            stats.discarded += 1;
            continue;
        }
        if dedupe {
            let key: BTreeSet<String> =
                plan.service_names().into_iter().map(str::to_string).collect();
            if !seen.insert(key) {
                stats.duplicates += 1;
                continue;
            }
        }
        plans.push(plan);
    }

    debug!(
        plan_sets = sets.len(),
        plans = plans.len(),
        discarded = stats.discarded,
        duplicates = stats.duplicates,
        "constructed plans"
    );
    (plans, stats)
}

/// Whether every service in the plan can run: each input must be a request
/// input or an output of a plan service in an earlier layer.
pub fn is_feasible(request: &CompositionRequest, plan: &CompositionPlan) -> bool {
    let mut available: BTreeSet<&Parameter> = request.inputs().iter().collect();
    for layer in plan.layers() {
        if layer
            .iter()
            .any(|n| !n.service.inputs.iter().all(|i| available.contains(i)))
        {
            return false;
        }
        available.extend(layer.iter().flat_map(|n| n.service.outputs.iter()));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backward::backward_search;
    use crate::fixtures::{
        request, starting_layers, starting_layers_request, student, student_request, svc,
    };
    use crate::forward::{forward_expansion, Expansion};

    fn expand(req: &CompositionRequest, repo: &[std::sync::Arc<wsc_core::Service>]) -> SearchGraph {
        match forward_expansion(req, repo).unwrap() {
            Expansion::Reachable(g) => g,
            Expansion::Unsolvable(reason) => panic!("unexpectedly unsolvable: {reason}"),
        }
    }

    fn names(plan: &CompositionPlan) -> Vec<&str> {
        plan.service_names().into_iter().collect()
    }

    #[test]
    fn student_chain_survives_pruning() {
        let req = student_request();
        let graph = expand(&req, &student());
        let sets = backward_search(&req, &graph).unwrap();
        let plans = construct_plans(&req, &graph, &sets);
        assert_eq!(plans.len(), 1);
        assert_eq!(names(&plans[0]), vec!["W10", "W8", "W9"]);
        assert!(is_feasible(&req, &plans[0]));
    }

    #[test]
    fn pruning_to_the_same_services_keeps_every_plan() {
        let repo = vec![
            svc("A", &["in"], &["a"]),
            svc("N", &["in"], &["n"]),
            svc("X", &["a"], &["out"]),
            svc("Y", &["n"], &["y"]),
        ];
        let req = request(&["in"], &["out"]);
        let graph = expand(&req, &repo);
        let sets = backward_search(&req, &graph).unwrap();
        assert_eq!(sets.len(), 4);

        let (plans, stats) = construct_plans_with_stats(&req, &graph, &sets, false);
        assert_eq!(plans.len(), 3);
        assert!(plans.iter().all(|p| names(p) == vec!["A", "X"]));
        assert_eq!(stats, PruneStats { discarded: 1, duplicates: 0 });

        let (deduped, stats) = construct_plans_with_stats(&req, &graph, &sets, true);
        assert_eq!(deduped.len(), 1);
        assert_eq!(stats, PruneStats { discarded: 1, duplicates: 2 });
    }

    #[test]
    fn same_layer_consumers_do_not_keep_a_node() {
        // P and Q share layer 0; Q consumes P's output, but that only
        // matters for nodes in later layers.
        let req = request(&["in", "p"], &["out"]);
        let mut graph = SearchGraph::new();
        graph
            .push_layer(vec![svc("P", &["in"], &["p"]), svc("Q", &["p"], &["q"])])
            .unwrap();
        graph.push_layer(vec![svc("R", &["q"], &["out"])]).unwrap();

        let set: PlanSet = graph.nodes().map(|n| n.id).collect();
        let plan = prune(&req, &graph, &set);
        assert_eq!(names(&plan), vec!["Q", "R"]);
    }

    #[test]
    fn pruning_keeps_layer_positions() {
        let req = starting_layers_request();
        let graph = expand(&req, &starting_layers());
        let sets = backward_search(&req, &graph).unwrap();
        let plans = construct_plans(&req, &graph, &sets);
        assert_eq!(plans.len(), 3);
        for plan in &plans {
            for (i, layer) in plan.layers().iter().enumerate() {
                assert!(layer.iter().all(|n| n.layer() == i));
            }
        }
    }

    #[test]
    fn infeasible_plans_are_detected() {
        let repo = vec![
            svc("A", &["in"], &["a"]),
            svc("B", &["in"], &["b"]),
            svc("X", &["a", "b"], &["out"]),
        ];
        let req = request(&["in"], &["out"]);
        let graph = expand(&req, &repo);
        let sets = backward_search(&req, &graph).unwrap();
        let plans = construct_plans(&req, &graph, &sets);
        assert_eq!(plans.len(), 3);

        let feasible: Vec<Vec<&str>> = plans
            .iter()
            .filter(|p| is_feasible(&req, p))
            .map(names)
            .collect();
        assert_eq!(feasible, vec![vec!["A", "B", "X"]]);
    }
}
