//! Error types for the service model and plan structures.

use thiserror::Error;

use crate::graph::NodeRef;

/// A composition request that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("at least 1 input required")]
    NoInputs,

    #[error("at least 1 output required")]
    NoOutputs,

    #[error("unknown QoS feature: '{value}'. Expected one of COST, RESPONSE_TIME, RELIABILITY, AVAILABILITY")]
    UnknownQos { value: String },

    #[error("malformed constraint '{constraint}': expected 3 tokens, found {tokens}")]
    MalformedConstraint { constraint: String, tokens: usize },

    #[error("unknown constraint operator: '{symbol}'")]
    UnknownOperator { symbol: String },

    #[error("constraint type '{parameter}' is not a declared input, output, or QoS feature of the request")]
    UndeclaredConstraintType { parameter: String },
}

/// A structural invariant of a search graph or plan does not hold.
///
/// These indicate a defect in graph or plan construction rather than a
/// user-facing condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("node {node} records layer {recorded} but is stored in layer {actual}")]
    LayerIndexMismatch {
        node: String,
        recorded: usize,
        actual: usize,
    },

    #[error("node {node} refers to {target} outside the plan")]
    DanglingEdge { node: String, target: NodeRef },

    #[error("edge {from} -> {to} does not connect adjacent layers")]
    NonAdjacentEdge { from: NodeRef, to: NodeRef },

    #[error("edge {from} -> {to} has no matching back-reference")]
    AsymmetricEdge { from: NodeRef, to: NodeRef },

    #[error("layer {0} is empty")]
    EmptyLayer(usize),

    #[error("service '{0}' appears more than once")]
    DuplicateService(String),
}
