//! Error type definitions

use thiserror::Error;

/// Result type alias for the RBAC crate
pub type Result<T> = std::result::Result<T, RbacError>;

/// Main error type for the RBAC engine and its REST client
#[derive(Error, Debug)]
pub enum RbacError {
    /// Malformed or conflicting input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity is absent
    #[error("Not found: {entity} {id}")]
    NotFound { entity: String, id: String },

    /// Referential integrity violation, entity still in use, or stale version
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Mutation attempted on a frozen or system entity
    #[error("Immutable: {0}")]
    Immutable(String),

    /// Illegal state-machine transition
    #[error("Invalid state: cannot {action} from {from}")]
    InvalidState { from: String, action: String },

    /// Role hierarchy is not a tree
    #[error("Cycle detected in role hierarchy: {0}")]
    Cycle(String),

    /// Missing, invalid or expired credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Authenticated but not allowed by the remote service
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Network call exceeded its deadline
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Transport failure before a response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response that fits no other category
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
