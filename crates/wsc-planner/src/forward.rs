//! Forward expansion: build the layered search graph from the request inputs.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::debug;
use wsc_core::{CompositionRequest, Parameter, SearchGraph, Service};

use crate::error::PlannerError;
use crate::outcome::Unsolvable;

/// Result of forward expansion.
#[derive(Debug, Clone)]
pub enum Expansion {
    /// Every requested output is reachable through at least two services.
    Reachable(SearchGraph),
    /// The repository cannot serve the request by composition.
    Unsolvable(Unsolvable),
}

/// Expand the repository into a layered search graph.
///
/// Starting from the request inputs, each full pass over the repository
/// admits every service whose inputs are all reachable and which adds at
/// least one output not yet reachable. The services admitted in one pass
/// form one layer; their outputs only become reachable once the pass is
/// over. Expansion stops at the first pass that admits nothing.
///
/// A service name is admitted at most once, so repositories with repeated
/// names keep the first entry.
pub fn forward_expansion(
    request: &CompositionRequest,
    repository: &[Arc<Service>],
) -> Result<Expansion, PlannerError> {
    let mut reachable: BTreeSet<Parameter> = request.inputs().iter().cloned().collect();
    let mut admitted: HashSet<&str> = HashSet::new();
    let mut graph = SearchGraph::new();

    loop {
        let mut layer: Vec<Arc<Service>> = Vec::new();
        for service in repository {
            if admitted.contains(service.name.as_str()) {
                continue;
            }
            if service.inputs_satisfied_by(&reachable) && service.adds_outputs_to(&reachable) {
                admitted.insert(service.name.as_str());
                layer.push(Arc::clone(service));
            }
        }
        if layer.is_empty() {
            break;
        }

        let produced: Vec<Parameter> = layer
            .iter()
            .flat_map(|s| s.outputs.iter().cloned())
            .collect();
        let width = layer.len();
        let index = graph.push_layer(layer)?;
        debug!(layer = index, width, "admitted service layer");
        reachable.extend(produced);
    }

    if graph.is_empty() {
        return Ok(Expansion::Unsolvable(Unsolvable::EmptyGraph));
    }

    let missing: Vec<Parameter> = request
        .outputs()
        .iter()
        .filter(|o| !reachable.contains(*o))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Ok(Expansion::Unsolvable(Unsolvable::OutputsUnreachable { missing }));
    }

    if graph.node_count() == 1 {
        let service = graph
            .nodes()
            .next()
            .map(|n| n.name().to_string())
            .unwrap_or_default();
        return Ok(Expansion::Unsolvable(Unsolvable::SingleServiceSufficient { service }));
    }

    Ok(Expansion::Reachable(graph))
}
