//! The Service entity.
//!
//! A service is an immutable description of one operation in a repository:
//! what it consumes, what it produces, which parameters it influences
//! (effects), and the constraints it places on parameters. Services are
//! shared as `Arc<Service>` between the repository, search graphs, and plans.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::parameter::Parameter;
use crate::plan::ConstraintAwarePlan;
use crate::request::CompositionRequest;

/// A service available for composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unique name within a repository.
    pub name: String,
    /// Parameters that must all be available before the service can run.
    #[serde(default)]
    pub inputs: BTreeSet<Parameter>,
    /// Parameters produced by the service.
    #[serde(default)]
    pub outputs: BTreeSet<Parameter>,
    /// Parameters the service is the authoritative producer of, for
    /// constraint placement. Not necessarily a subset of `outputs`.
    #[serde(default)]
    pub effects: BTreeSet<Parameter>,
    /// Constraints declared by this service.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Sub-plan of a composite service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<Box<ConstraintAwarePlan>>,
}

impl Service {
    /// Create an atomic service with no parameters.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            effects: BTreeSet::new(),
            constraints: Vec::new(),
            composition: None,
        }
    }

    pub fn with_inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Parameter>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn with_outputs<I>(mut self, outputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Parameter>,
    {
        self.outputs.extend(outputs.into_iter().map(Into::into));
        self
    }

    pub fn with_effects<I>(mut self, effects: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Parameter>,
    {
        self.effects.extend(effects.into_iter().map(Into::into));
        self
    }

    /// Attach a constraint, recording this service as its subject.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        let constraint = constraint.with_subject(&self.name);
        self.constraints.push(constraint);
        self
    }

    /// Wrap a constraint-aware plan as a composite service.
    ///
    /// The composite consumes the request's inputs and produces its outputs.
    /// Its effects are the union of the effects of every service in the plan,
    /// and the request's constraints become the composite's own.
    pub fn composite(name: &str, request: &CompositionRequest, plan: ConstraintAwarePlan) -> Self {
        let effects: BTreeSet<Parameter> = plan
            .nodes()
            .flat_map(|node| node.service.effects.iter().cloned())
            .collect();
        let constraints = request
            .constraints()
            .iter()
            .cloned()
            .map(|c| c.with_subject(name))
            .collect();
        Self {
            name: name.to_string(),
            inputs: request.inputs().iter().cloned().collect(),
            outputs: request.outputs().iter().cloned().collect(),
            effects,
            constraints,
            composition: Some(Box::new(plan)),
        }
    }

    /// Whether this service wraps a sub-plan.
    pub fn is_composite(&self) -> bool {
        self.composition.is_some()
    }

    /// Whether every input is contained in `available`.
    pub fn inputs_satisfied_by(&self, available: &BTreeSet<Parameter>) -> bool {
        self.inputs.is_subset(available)
    }

    /// Whether at least one output is missing from `available`.
    pub fn adds_outputs_to(&self, available: &BTreeSet<Parameter>) -> bool {
        self.outputs.iter().any(|o| !available.contains(o))
    }

    /// Whether any output of this service is an input of `other`.
    pub fn feeds(&self, other: &Service) -> bool {
        !self.outputs.is_disjoint(&other.inputs)
    }

    /// Whether `parameter` is one of this service's effects.
    pub fn affects(&self, parameter: &Parameter) -> bool {
        self.effects.contains(parameter)
    }

    /// Convenience for sharing.
    pub fn into_shared(self) -> Arc<Service> {
        Arc::new(self)
    }
}
