//! Helper functions for creating and classifying errors

use super::types::RbacError;

impl RbacError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<E: Into<String>, I: ToString>(entity: E, id: I) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn immutable<S: Into<String>>(message: S) -> Self {
        Self::Immutable(message.into())
    }

    pub fn invalid_state<F: ToString, A: Into<String>>(from: F, action: A) -> Self {
        Self::InvalidState {
            from: from.to_string(),
            action: action.into(),
        }
    }

    pub fn cycle<S: Into<String>>(message: S) -> Self {
        Self::Cycle(message.into())
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status class associated with this error
    pub fn status_code(&self) -> u16 {
        match self {
            RbacError::Validation(_) => 400,
            RbacError::Auth(_) => 401,
            RbacError::Forbidden(_) => 403,
            RbacError::NotFound { .. } => 404,
            RbacError::Timeout(_) => 408,
            RbacError::Conflict(_) | RbacError::InvalidState { .. } | RbacError::Cycle(_) => 409,
            RbacError::Immutable(_) => 423,
            RbacError::Api { status, .. } => *status,
            RbacError::Network(_) => 502,
            RbacError::Serialization(_)
            | RbacError::Config(_)
            | RbacError::Yaml(_)
            | RbacError::Io(_) => 500,
        }
    }

    /// Whether a caller may reasonably retry the same request.
    ///
    /// The registries never retry on their own; this only informs callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            RbacError::Timeout(_) | RbacError::Network(_) => true,
            RbacError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether the error was caused by the caller's input or state
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code()) && !matches!(self, RbacError::Timeout(_))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, RbacError::Auth(_))
    }
}
