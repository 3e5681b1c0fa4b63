//! Conversions from transport errors and HTTP error responses

use super::types::RbacError;
use reqwest::StatusCode;
use serde::Deserialize;

impl From<reqwest::Error> for RbacError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RbacError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            RbacError::Network(err.to_string())
        } else if err.is_decode() {
            RbacError::Api {
                status: 502,
                message: format!("undecodable response body: {}", err),
            }
        } else if let Some(status) = err.status() {
            RbacError::from_status(status, err.to_string())
        } else {
            RbacError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RbacError {
    /// Map a non-2xx status and a human-readable reason onto the taxonomy
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 | 422 => RbacError::Validation(message),
            401 => RbacError::Auth(message),
            403 => RbacError::Forbidden(message),
            404 => RbacError::NotFound {
                entity: "resource".to_string(),
                id: message,
            },
            408 | 504 => RbacError::Timeout(message),
            409 => RbacError::Conflict(message),
            423 => RbacError::Immutable(message),
            code => RbacError::Api {
                status: code,
                message,
            },
        }
    }

    /// Build an error from a raw response body, preferring its `message` field
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body.trim().to_string()
                }
            });
        Self::from_status(status, message)
    }
}
