//! Explicit caller credentials and per-call options

use std::fmt;
use std::time::Duration;

use crate::utils::error::{RbacError, Result};

/// Bearer credential passed into every client call
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// No token; every call made with it fails with an auth error before reaching the network
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Read the token from an environment variable, anonymous when unset
    pub fn from_env(var: &str) -> Self {
        Self {
            token: std::env::var(var).ok(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub(crate) fn token(&self) -> Result<&str> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(RbacError::auth("No bearer token; the caller is unauthenticated")),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Per-call overrides of the client defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}
