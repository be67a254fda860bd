//! Ontology-qualified parameters.
//!
//! A parameter is the semantic tag that links one service's outputs to
//! another service's inputs. It is written either bare (`"StudentID"`) or
//! qualified with a data type (`"string : StudentID"`, `"string:StudentID"`).
//! Matching is plain string equality on the trimmed text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the type qualifier and the name.
const QUALIFIER_SEPARATOR: char = ':';

/// A typed identifier used as an input, output, or effect tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameter(String);

impl Parameter {
    /// Create a parameter from its textual form. Surrounding whitespace is trimmed.
    pub fn new(text: impl AsRef<str>) -> Self {
        Parameter(text.as_ref().trim().to_string())
    }

    /// Create a type-qualified parameter, rendered as `type:name`.
    pub fn qualified(data_type: &str, name: &str) -> Self {
        Parameter(format!(
            "{}{QUALIFIER_SEPARATOR}{}",
            data_type.trim(),
            name.trim()
        ))
    }

    /// The full textual form, which is also the matching key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type qualifier, if the parameter carries one.
    pub fn data_type(&self) -> Option<&str> {
        self.0
            .split_once(QUALIFIER_SEPARATOR)
            .map(|(ty, _)| ty.trim())
    }

    /// The name without its type qualifier.
    pub fn name(&self) -> &str {
        match self.0.split_once(QUALIFIER_SEPARATOR) {
            Some((_, name)) => name.trim(),
            None => &self.0,
        }
    }

    /// Whether the parameter has a type qualifier.
    pub fn is_qualified(&self) -> bool {
        self.data_type().is_some()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Parameter {
    fn from(s: &str) -> Self {
        Parameter::new(s)
    }
}

impl From<String> for Parameter {
    fn from(s: String) -> Self {
        Parameter::new(s)
    }
}

impl AsRef<str> for Parameter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
