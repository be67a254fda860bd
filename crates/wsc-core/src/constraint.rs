//! Constraints attached to services and requests.
//!
//! A constraint compares a parameter against a literal value, e.g.
//! `float:Price < 100`. Services declare constraints on the parameters they
//! care about; the constraint-adjustment pass later moves each constraint to
//! the earliest point in a plan where the parameter becomes available.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::parameter::Parameter;

/// Comparison operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    LessThan,
    GreaterThan,
    Equals,
    LessThanOrEqualTo,
    GreaterThanOrEqualTo,
}

impl Operator {
    /// The textual symbol used in constraint strings.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::Equals => "=",
            Operator::LessThanOrEqualTo => "<=",
            Operator::GreaterThanOrEqualTo => ">=",
        }
    }

    /// Parse an operator symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(Operator::LessThan),
            ">" => Some(Operator::GreaterThan),
            "=" => Some(Operator::Equals),
            "<=" => Some(Operator::LessThanOrEqualTo),
            ">=" => Some(Operator::GreaterThanOrEqualTo),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_symbol(s).ok_or_else(|| RequestError::UnknownOperator {
            symbol: s.to_string(),
        })
    }
}

/// A constraint on a parameter.
///
/// `subject` names the service that declared the constraint; it is `None`
/// for constraints that come from a composition request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub parameter: Parameter,
    pub operator: Operator,
    pub literal: String,
}

impl Constraint {
    /// Create a request-level constraint (no subject service).
    pub fn new(parameter: impl Into<Parameter>, operator: Operator, literal: &str) -> Self {
        Self {
            subject: None,
            parameter: parameter.into(),
            operator,
            literal: literal.trim().to_string(),
        }
    }

    /// Attach the name of the service that declares this constraint.
    pub fn with_subject(mut self, service: &str) -> Self {
        self.subject = Some(service.to_string());
        self
    }

    /// Parse a `<parameter> <operator> <literal>` string.
    ///
    /// The string must split into exactly three whitespace-separated tokens.
    pub fn parse(text: &str) -> Result<Self, RequestError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(RequestError::MalformedConstraint {
                constraint: text.to_string(),
                tokens: tokens.len(),
            });
        }
        let operator: Operator = tokens[1].parse()?;
        Ok(Constraint::new(tokens[0], operator, tokens[2]))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.parameter, self.operator, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_symbols_round_trip() {
        for op in [
            Operator::LessThan,
            Operator::GreaterThan,
            Operator::Equals,
            Operator::LessThanOrEqualTo,
            Operator::GreaterThanOrEqualTo,
        ] {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol("!="), None);
    }

    #[test]
    fn parse_constraint() {
        let c = Constraint::parse("float:Price <= 100").unwrap();
        assert_eq!(c.parameter, Parameter::new("float:Price"));
        assert_eq!(c.operator, Operator::LessThanOrEqualTo);
        assert_eq!(c.literal, "100");
        assert_eq!(c.subject, None);
        assert_eq!(c.to_string(), "float:Price <= 100");
    }

    #[test]
    fn parse_rejects_wrong_token_count() {
        let err = Constraint::parse("COST <").unwrap_err();
        assert!(matches!(
            err,
            RequestError::MalformedConstraint { tokens: 2, .. }
        ));
        assert!(Constraint::parse("COST < 10 extra").is_err());
    }

    #[test]
    fn parse_rejects_unknown_operator() {
        let err = Constraint::parse("COST != 10").unwrap_err();
        assert!(matches!(err, RequestError::UnknownOperator { ref symbol } if symbol == "!="));
    }

    #[test]
    fn structural_equality_includes_subject() {
        let a = Constraint::new("int:Age", Operator::GreaterThan, "18");
        let b = Constraint::new("int:Age", Operator::GreaterThan, "18");
        assert_eq!(a, b);
        assert_ne!(a.clone().with_subject("W1"), b);
    }
}
