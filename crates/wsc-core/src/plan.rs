//! Composition plans.
//!
//! A [`CompositionPlan`] is the layered set of search nodes selected for one
//! candidate solution. A [`ConstraintAwarePlan`] is the final artifact: a DAG
//! of [`ServiceNode`]s whose edges are restricted to the plan and whose
//! constraints have been moved to where they can first be evaluated.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::PlanError;
use crate::graph::{NodeRef, SearchNode};
use crate::service::Service;

/// The search nodes of one candidate solution, grouped by graph layer.
///
/// Nodes keep their [`NodeRef`] from the search graph, so the layer of every
/// node equals its index in `layers` and edges can be re-derived without the
/// graph itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionPlan {
    layers: Vec<Vec<SearchNode>>,
}

impl CompositionPlan {
    /// Group nodes by their graph layer, sorted by service name within a layer.
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = SearchNode>,
    {
        let mut layers: Vec<Vec<SearchNode>> = Vec::new();
        for node in nodes {
            let layer = node.id.layer;
            if layers.len() <= layer {
                layers.resize_with(layer + 1, Vec::new);
            }
            layers[layer].push(node);
        }
        for layer in &mut layers {
            layer.sort_by(|a, b| a.name().cmp(b.name()));
        }
        Self { layers }
    }

    pub fn layers(&self) -> &[Vec<SearchNode>] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn node_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Iterate over all nodes, layer by layer.
    pub fn nodes(&self) -> impl Iterator<Item = &SearchNode> {
        self.layers.iter().flatten()
    }

    /// Whether the graph node `id` is part of this plan.
    pub fn contains(&self, id: NodeRef) -> bool {
        self.layers
            .get(id.layer)
            .is_some_and(|l| l.iter().any(|n| n.id == id))
    }

    /// Keep only the nodes for which `keep` returns true.
    ///
    /// Layers are left in place, possibly empty, so node layers keep
    /// matching their graph layer.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&SearchNode) -> bool,
    {
        for layer in &mut self.layers {
            layer.retain(|n| keep(n));
        }
    }

    /// Names of every service in the plan.
    pub fn service_names(&self) -> BTreeSet<&str> {
        self.nodes().map(SearchNode::name).collect()
    }
}

/// A node of a constraint-aware plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNode {
    /// Address in the owning plan; `id.layer` is the node's layer index.
    pub id: NodeRef,
    pub service: Arc<Service>,
    /// Constraints evaluated at this node. Owned per node.
    pub constraints: Vec<Constraint>,
    pub predecessors: BTreeSet<NodeRef>,
    pub successors: BTreeSet<NodeRef>,
}

impl ServiceNode {
    /// Create an unlinked node carrying a copy of the service's constraints.
    pub fn new(id: NodeRef, service: Arc<Service>) -> Self {
        let constraints = service.constraints.clone();
        Self {
            id,
            service,
            constraints,
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.service.name
    }

    pub fn layer_index(&self) -> usize {
        self.id.layer
    }
}

/// The final layered DAG of service nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintAwarePlan {
    layers: Vec<Vec<ServiceNode>>,
}

impl ConstraintAwarePlan {
    /// Wrap already-linked layers. Call [`validate`](Self::validate) to check them.
    pub fn from_nodes(layers: Vec<Vec<ServiceNode>>) -> Self {
        Self { layers }
    }

    /// Build a plan from layers of services, linking each node to the nodes
    /// of the previous layer whose outputs it consumes.
    pub fn from_layers(layers: Vec<Vec<Arc<Service>>>) -> Self {
        let mut plan = Self {
            layers: layers
                .into_iter()
                .enumerate()
                .map(|(l, services)| {
                    services
                        .into_iter()
                        .enumerate()
                        .map(|(i, s)| ServiceNode::new(NodeRef::new(l, i), s))
                        .collect()
                })
                .collect(),
        };
        for l in 1..plan.layers.len() {
            for i in 0..plan.layers[l].len() {
                for p in 0..plan.layers[l - 1].len() {
                    if plan.layers[l - 1][p].service.feeds(&plan.layers[l][i].service) {
                        plan.link(NodeRef::new(l - 1, p), NodeRef::new(l, i));
                    }
                }
            }
        }
        plan
    }

    /// Record `from -> to` on both endpoints.
    pub fn link(&mut self, from: NodeRef, to: NodeRef) {
        if let Some(node) = self.node_mut(from) {
            node.successors.insert(to);
        }
        if let Some(node) = self.node_mut(to) {
            node.predecessors.insert(from);
        }
    }

    pub fn node(&self, id: NodeRef) -> Option<&ServiceNode> {
        self.layers.get(id.layer).and_then(|l| l.get(id.index))
    }

    pub fn node_mut(&mut self, id: NodeRef) -> Option<&mut ServiceNode> {
        self.layers.get_mut(id.layer).and_then(|l| l.get_mut(id.index))
    }

    /// Look up a node by service name.
    pub fn find(&self, name: &str) -> Option<&ServiceNode> {
        self.nodes().find(|n| n.name() == name)
    }

    pub fn layer(&self, index: usize) -> &[ServiceNode] {
        self.layers.get(index).map(|l| l.as_slice()).unwrap_or(&[])
    }

    pub fn layers(&self) -> &[Vec<ServiceNode>] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn node_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Iterate over all nodes, layer by layer.
    pub fn nodes(&self) -> impl Iterator<Item = &ServiceNode> {
        self.layers.iter().flatten()
    }

    /// Addresses of all nodes, layer by layer.
    pub fn node_refs(&self) -> Vec<NodeRef> {
        self.nodes().map(|n| n.id).collect()
    }

    /// Add `constraint` to a node unless an equal one is already there.
    /// Returns whether the node changed.
    pub fn add_constraint(&mut self, id: NodeRef, constraint: &Constraint) -> bool {
        match self.node_mut(id) {
            Some(node) if !node.constraints.contains(constraint) => {
                node.constraints.push(constraint.clone());
                true
            }
            _ => false,
        }
    }

    /// Remove every copy of `constraint` from a node. Returns whether the node changed.
    pub fn remove_constraint(&mut self, id: NodeRef, constraint: &Constraint) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                let before = node.constraints.len();
                node.constraints.retain(|c| c != constraint);
                node.constraints.len() != before
            }
            None => false,
        }
    }

    /// Drop empty layers and renumber the remaining ones from 0.
    ///
    /// Every node address and edge endpoint is rewritten. Returns the number
    /// of layers removed.
    pub fn remove_empty_layers(&mut self) -> usize {
        let remap: BTreeMap<usize, usize> = self
            .layers
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .enumerate()
            .map(|(new, (old, _))| (old, new))
            .collect();
        let removed = self.layers.len() - remap.len();
        if removed == 0 {
            return 0;
        }

        let shift = |r: &NodeRef| {
            NodeRef::new(remap.get(&r.layer).copied().unwrap_or(r.layer), r.index)
        };
        self.layers.retain(|l| !l.is_empty());
        for node in self.layers.iter_mut().flatten() {
            node.id = shift(&node.id);
            node.predecessors = node.predecessors.iter().map(shift).collect();
            node.successors = node.successors.iter().map(shift).collect();
        }
        removed
    }

    /// Check the plan invariants: no empty layers, addresses match storage,
    /// layer 0 has no predecessors, and every edge joins adjacent layers and
    /// is recorded on both ends.
    pub fn validate(&self) -> Result<(), PlanError> {
        for (layer_idx, layer) in self.layers.iter().enumerate() {
            if layer.is_empty() {
                return Err(PlanError::EmptyLayer(layer_idx));
            }
            for (idx, node) in layer.iter().enumerate() {
                if node.id != NodeRef::new(layer_idx, idx) {
                    return Err(PlanError::LayerIndexMismatch {
                        node: node.name().to_string(),
                        recorded: node.id.layer,
                        actual: layer_idx,
                    });
                }
                for pred in &node.predecessors {
                    let target = self.node(*pred).ok_or_else(|| PlanError::DanglingEdge {
                        node: node.name().to_string(),
                        target: *pred,
                    })?;
                    if pred.layer + 1 != layer_idx {
                        return Err(PlanError::NonAdjacentEdge {
                            from: *pred,
                            to: node.id,
                        });
                    }
                    if !target.successors.contains(&node.id) {
                        return Err(PlanError::AsymmetricEdge {
                            from: *pred,
                            to: node.id,
                        });
                    }
                }
                for succ in &node.successors {
                    let target = self.node(*succ).ok_or_else(|| PlanError::DanglingEdge {
                        node: node.name().to_string(),
                        target: *succ,
                    })?;
                    if succ.layer != layer_idx + 1 {
                        return Err(PlanError::NonAdjacentEdge {
                            from: node.id,
                            to: *succ,
                        });
                    }
                    if !target.predecessors.contains(&node.id) {
                        return Err(PlanError::AsymmetricEdge {
                            from: node.id,
                            to: *succ,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Sorted service names of the given nodes.
    pub fn names_of<'a>(&'a self, refs: impl IntoIterator<Item = &'a NodeRef>) -> Vec<&'a str> {
        let mut names: Vec<&str> = refs
            .into_iter()
            .filter_map(|r| self.node(*r))
            .map(ServiceNode::name)
            .collect();
        names.sort_unstable();
        names
    }

    fn render_node(&self, node: &ServiceNode) -> String {
        let constraints: Vec<String> = node.constraints.iter().map(ToString::to_string).collect();
        format!(
            "{{{}}} [{}] {} {{{}}}",
            self.names_of(&node.predecessors).join(", "),
            constraints.join(", "),
            node.name(),
            self.names_of(&node.successors).join(", ")
        )
    }
}

/// Canonical rendering used for plan equivalence:
/// `Layer i: {preds} [constraints] name {succs}, ...`, nodes sorted by name
/// within a layer, layers separated by newlines.
impl fmt::Display for ConstraintAwarePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let mut nodes: Vec<&ServiceNode> = layer.iter().collect();
            nodes.sort_by(|a, b| a.name().cmp(b.name()));
            let rendered: Vec<String> = nodes.iter().map(|n| self.render_node(n)).collect();
            write!(f, "Layer {i}: {}", rendered.join(", "))?;
        }
        Ok(())
    }
}
