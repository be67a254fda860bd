//! Service repositories and composition requests on disk.
//!
//! Repositories are lists of services in TOML or JSON; requests name the
//! inputs a caller has, the outputs it wants, and optional QoS features and
//! constraints. Everything loaded here is validated before it reaches the
//! planner.

pub mod error;
pub mod parse;
pub mod repository;

pub use error::{RepositoryError, Result};
pub use parse::{
    discover_repositories, load_repositories, load_repository, load_request, parse_repository,
    parse_request, repository_template, repository_to_toml, request_template, request_to_toml,
    Format,
};
pub use repository::{validate_repository, validate_services, ServiceRepository, ValidationIssue};
