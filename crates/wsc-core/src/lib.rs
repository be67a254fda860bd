//! Core data model for automated web-service composition.
//!
//! Services consume and produce ontology-qualified [`Parameter`]s. Given a
//! [`CompositionRequest`], the planner arranges services into a layered
//! [`SearchGraph`], selects candidate [`CompositionPlan`]s from it, and turns
//! each into a [`ConstraintAwarePlan`]: a DAG of [`ServiceNode`]s whose
//! constraints sit at the earliest point they can be evaluated.

pub mod constraint;
pub mod error;
pub mod graph;
pub mod hash;
pub mod parameter;
pub mod plan;
pub mod request;
pub mod service;

pub use constraint::{Constraint, Operator};
pub use error::{PlanError, RequestError};
pub use graph::{NodeRef, SearchGraph, SearchNode};
pub use hash::{content_hash, digest, hash_hex, ContentHash};
pub use parameter::Parameter;
pub use plan::{CompositionPlan, ConstraintAwarePlan, ServiceNode};
pub use request::{CompositionRequest, QosFeature};
pub use service::Service;
