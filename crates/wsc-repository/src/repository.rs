//! In-memory service repository.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use wsc_core::{digest, Service};

use crate::error::{RepositoryError, Result};

/// An ordered collection of uniquely named services.
///
/// Order is kept as loaded; forward expansion scans services in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceRepository {
    services: Vec<Arc<Service>>,
}

impl ServiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository, rejecting duplicate names.
    pub fn from_services<I>(services: I) -> Result<Self>
    where
        I: IntoIterator<Item = Service>,
    {
        let mut repo = Self::new();
        for service in services {
            repo.push(service)?;
        }
        Ok(repo)
    }

    /// Append a service. Fails if the name is already taken.
    pub fn push(&mut self, service: Service) -> Result<()> {
        self.push_shared(service.into_shared())
    }

    pub fn push_shared(&mut self, service: Arc<Service>) -> Result<()> {
        if self.get(&service.name).is_some() {
            return Err(RepositoryError::Validation {
                detail: format!("duplicate service name '{}'", service.name),
            });
        }
        self.services.push(service);
        Ok(())
    }

    /// Append every service of `other`, stopping at the first duplicate name.
    pub fn merge(&mut self, other: ServiceRepository) -> Result<()> {
        for service in other.services {
            self.push_shared(service)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Service>> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn services(&self) -> &[Arc<Service>] {
        &self.services
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Service>> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Hex SHA-256 of the repository's canonical JSON form.
    pub fn digest(&self) -> Result<String> {
        Ok(digest(&self.services)?)
    }
}

/// A validation issue found in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: String) -> Self {
        Self {
            severity: "error",
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            severity: "warning",
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }
}

/// Check a list of services for structural problems.
///
/// Errors: empty or duplicate names, services without outputs. Warnings:
/// services without inputs, and constraints on parameters the service
/// neither consumes, produces nor affects.
pub fn validate_services(services: &[Arc<Service>]) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (position, service) in services.iter().enumerate() {
        let name = service.name.trim();
        if name.is_empty() {
            issues.push(ValidationIssue::error(format!(
                "service #{position} has an empty name"
            )));
        } else if !seen.insert(name) {
            issues.push(ValidationIssue::error(format!(
                "duplicate service name '{name}'"
            )));
        }

        if service.outputs.is_empty() {
            issues.push(ValidationIssue::error(format!(
                "service '{name}' produces no outputs"
            )));
        }
        if service.inputs.is_empty() {
            issues.push(ValidationIssue::warning(format!(
                "service '{name}' has no inputs and is always runnable"
            )));
        }

        for constraint in &service.constraints {
            let p = &constraint.parameter;
            if !service.inputs.contains(p)
                && !service.outputs.contains(p)
                && !service.affects(p)
            {
                issues.push(ValidationIssue::warning(format!(
                    "service '{name}' constrains '{p}', which it does not use"
                )));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Validate a repository, see [`validate_services`].
pub fn validate_repository(repo: &ServiceRepository) -> std::result::Result<(), Vec<ValidationIssue>> {
    validate_services(repo.services())
}
