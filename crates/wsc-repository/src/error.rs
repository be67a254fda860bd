//! Error types for repository and request loading.

use std::path::PathBuf;

use wsc_core::RequestError;

/// Errors that can occur while loading repositories and requests.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading or writing repository files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Repository or request file not found.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// A constraint declared by a service could not be parsed.
    #[error("service '{service}': {source}")]
    InvalidConstraint {
        service: String,
        #[source]
        source: RequestError,
    },

    /// The request file describes an invalid request.
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    /// Structural problem in a repository.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
