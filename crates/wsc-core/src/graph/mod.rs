//! The layered search graph built by forward expansion.
//!
//! Layer 0 holds the services that are runnable from the request inputs
//! alone; layer k holds the services that only become runnable once the
//! outputs of layer k-1 are available. Nodes live in an arena addressed by
//! [`NodeRef`] (layer, position) and edges are stored as `NodeRef` pairs,
//! so the predecessor/successor cycle needs no shared ownership.
//!
//! Edges only ever connect adjacent layers: a node's predecessors are in the
//! layer directly before it and its successors in the layer directly after.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::parameter::Parameter;
use crate::service::Service;

/// Arena address of a node: layer index and position within the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub layer: usize,
    pub index: usize,
}

impl NodeRef {
    pub fn new(layer: usize, index: usize) -> Self {
        Self { layer, index }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.layer, self.index)
    }
}

/// A service admitted into the search graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchNode {
    /// Address of this node in the graph that created it.
    pub id: NodeRef,
    pub service: Arc<Service>,
    /// Nodes in layer `id.layer - 1` whose outputs feed this node.
    pub predecessors: BTreeSet<NodeRef>,
    /// Nodes in layer `id.layer + 1` this node feeds.
    pub successors: BTreeSet<NodeRef>,
}

impl SearchNode {
    pub fn name(&self) -> &str {
        &self.service.name
    }

    pub fn layer(&self) -> usize {
        self.id.layer
    }
}

/// The layered reachability graph of services.
///
/// Only the layers are serialized; the name index is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphLayers")]
pub struct SearchGraph {
    layers: Vec<Vec<SearchNode>>,
    /// Index: service name -> node
    #[serde(skip)]
    names: HashMap<String, NodeRef>,
}

#[derive(Deserialize)]
struct GraphLayers {
    layers: Vec<Vec<SearchNode>>,
}

impl From<GraphLayers> for SearchGraph {
    fn from(raw: GraphLayers) -> Self {
        let names = raw
            .layers
            .iter()
            .flatten()
            .map(|node| (node.service.name.clone(), node.id))
            .collect();
        Self {
            layers: raw.layers,
            names,
        }
    }
}

impl SearchGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer of services and wire it to the current last layer.
    ///
    /// Each new node becomes a successor of every node in the previous layer
    /// whose outputs intersect its inputs. Returns the index of the new layer.
    pub fn push_layer(&mut self, services: Vec<Arc<Service>>) -> Result<usize, PlanError> {
        let layer = self.layers.len();
        let mut seen = BTreeSet::new();
        for service in &services {
            if self.names.contains_key(&service.name) || !seen.insert(service.name.as_str()) {
                return Err(PlanError::DuplicateService(service.name.clone()));
            }
        }

        let mut nodes: Vec<SearchNode> = services
            .into_iter()
            .enumerate()
            .map(|(index, service)| SearchNode {
                id: NodeRef::new(layer, index),
                service,
                predecessors: BTreeSet::new(),
                successors: BTreeSet::new(),
            })
            .collect();

        if let Some(previous) = layer.checked_sub(1).and_then(|l| self.layers.get_mut(l)) {
            for node in &mut nodes {
                for pred in previous.iter_mut() {
                    if pred.service.feeds(&node.service) {
                        node.predecessors.insert(pred.id);
                        pred.successors.insert(node.id);
                    }
                }
            }
        }

        for node in &nodes {
            self.names.insert(node.service.name.clone(), node.id);
        }
        self.layers.push(nodes);
        Ok(layer)
    }

    /// Look up a node by address.
    pub fn node(&self, id: NodeRef) -> Option<&SearchNode> {
        self.layers.get(id.layer).and_then(|l| l.get(id.index))
    }

    /// Look up a node by service name.
    pub fn find(&self, name: &str) -> Option<&SearchNode> {
        self.names.get(name).and_then(|id| self.node(*id))
    }

    /// Whether a service with this name has been admitted.
    pub fn contains_service(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// The nodes of one layer.
    pub fn layer(&self, index: usize) -> &[SearchNode] {
        self.layers.get(index).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// Iterate over the layers in order.
    pub fn layers(&self) -> impl Iterator<Item = &[SearchNode]> {
        self.layers.iter().map(|l| l.as_slice())
    }

    /// Iterate over all nodes, layer by layer.
    pub fn nodes(&self) -> impl Iterator<Item = &SearchNode> {
        self.layers.iter().flatten()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of nodes in the widest layer.
    pub fn max_layer_width(&self) -> usize {
        self.layers.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Union of the outputs of every node in the graph.
    pub fn reachable_outputs(&self) -> BTreeSet<&Parameter> {
        self.nodes().flat_map(|n| n.service.outputs.iter()).collect()
    }

    /// Check the structural invariants: addresses match storage, edges
    /// connect adjacent layers, and every edge has its back-reference.
    pub fn validate(&self) -> Result<(), PlanError> {
        for (layer_idx, layer) in self.layers.iter().enumerate() {
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

    fn names_of(&self, refs: &BTreeSet<NodeRef>) -> Vec<&str> {
        let mut names: Vec<&str> = refs
            .iter()
            .filter_map(|r| self.node(*r))
            .map(SearchNode::name)
            .collect();
        names.sort_unstable();
        names
    }
}

/// Renders `Layer i: {preds} name {succs}, ...` per layer, nodes sorted by name.
impl fmt::Display for SearchGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let mut nodes: Vec<&SearchNode> = layer.iter().collect();
            nodes.sort_by(|a, b| a.name().cmp(b.name()));
            let rendered: Vec<String> = nodes
                .iter()
                .map(|n| {
                    format!(
                        "{{{}}} {} {{{}}}",
                        self.names_of(&n.predecessors).join(", "),
                        n.name(),
                        self.names_of(&n.successors).join(", ")
                    )
                })
                .collect();
            write!(f, "Layer {i}: {}", rendered.join(", "))?;
        }
        Ok(())
    }
}
