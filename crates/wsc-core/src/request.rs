//! Composition requests and QoS features.
//!
//! A request is validated once, at construction, and is immutable afterwards.
//! Everything downstream can assume a non-empty input list, a non-empty
//! output list, known QoS features, and constraints on declared names only.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::RequestError;
use crate::parameter::Parameter;

/// Quality-of-service features a request may ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QosFeature {
    Cost,
    ResponseTime,
    Reliability,
    Availability,
}

impl QosFeature {
    /// All features in declaration order.
    pub const ALL: [QosFeature; 4] = [
        QosFeature::Cost,
        QosFeature::ResponseTime,
        QosFeature::Reliability,
        QosFeature::Availability,
    ];

    /// Canonical upper-case name, as used in request files and constraints.
    pub fn name(&self) -> &'static str {
        match self {
            QosFeature::Cost => "COST",
            QosFeature::ResponseTime => "RESPONSE_TIME",
            QosFeature::Reliability => "RELIABILITY",
            QosFeature::Availability => "AVAILABILITY",
        }
    }
}

impl fmt::Display for QosFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QosFeature {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        QosFeature::ALL
            .into_iter()
            .find(|q| q.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RequestError::UnknownQos {
                value: s.to_string(),
            })
    }
}

/// A validated composition request.
///
/// Only serializable: deserializing would bypass validation, so loaders go
/// through [`CompositionRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionRequest {
    inputs: Vec<Parameter>,
    outputs: Vec<Parameter>,
    qos: Vec<QosFeature>,
    constraints: Vec<Constraint>,
}

impl CompositionRequest {
    /// Build and validate a request from its raw textual parts.
    ///
    /// `constraints` are `<type> <operator> <literal>` strings; each type must
    /// be one of the request's own inputs, outputs, or QoS names.
    pub fn new<I, O, Q, C>(inputs: I, outputs: O, qos: Q, constraints: C) -> Result<Self, RequestError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        O: IntoIterator,
        O::Item: AsRef<str>,
        Q: IntoIterator,
        Q::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let inputs: Vec<Parameter> = inputs.into_iter().map(Parameter::new).collect();
        if inputs.is_empty() {
            return Err(RequestError::NoInputs);
        }
        let outputs: Vec<Parameter> = outputs.into_iter().map(Parameter::new).collect();
        if outputs.is_empty() {
            return Err(RequestError::NoOutputs);
        }
        let qos = qos
            .into_iter()
            .map(|q| q.as_ref().parse::<QosFeature>())
            .collect::<Result<Vec<_>, _>>()?;
        let constraints = constraints
            .into_iter()
            .map(|c| Constraint::parse(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_parts(inputs, outputs, qos, constraints)
    }

    /// Build and validate a request from already-typed parts.
    pub fn from_parts(
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
        qos: Vec<QosFeature>,
        constraints: Vec<Constraint>,
    ) -> Result<Self, RequestError> {
        if inputs.is_empty() {
            return Err(RequestError::NoInputs);
        }
        if outputs.is_empty() {
            return Err(RequestError::NoOutputs);
        }

        let request = Self {
            inputs,
            outputs,
            qos,
            constraints,
        };
        for constraint in &request.constraints {
            if !request.declares(&constraint.parameter) {
                return Err(RequestError::UndeclaredConstraintType {
                    parameter: constraint.parameter.to_string(),
                });
            }
        }
        Ok(request)
    }

    /// Whether `parameter` names one of this request's inputs, outputs, or QoS features.
    pub fn declares(&self, parameter: &Parameter) -> bool {
        self.inputs.contains(parameter)
            || self.outputs.contains(parameter)
            || self
                .qos
                .iter()
                .any(|q| q.name().eq_ignore_ascii_case(parameter.as_str()))
    }

    pub fn inputs(&self) -> &[Parameter] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Parameter] {
        &self.outputs
    }

    pub fn qos(&self) -> &[QosFeature] {
        &self.qos
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The requested outputs as a set, for coverage checks.
    pub fn output_set(&self) -> BTreeSet<&Parameter> {
        self.outputs.iter().collect()
    }
}
