//! Core REST client implementation

use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::utils::error::{RbacError, Result};

/// HTTP/JSON client for the RBAC REST contract
#[derive(Debug, Clone)]
pub struct RbacApiClient {
    pub(crate) config: ClientConfig,
    pub(crate) base_url: Url,
    pub(crate) http_client: reqwest::Client,
}

impl RbacApiClient {
    /// Create a new client; the configured timeout is the default deadline of every call
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(RbacError::config)?;

        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| RbacError::config(format!("Invalid base_url '{}': {}", base, e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RbacError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "RBAC API client created");

        Ok(Self {
            config,
            base_url,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RbacError::config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    /// Authenticated request builder; fails before any I/O when no token is present
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
        options: &RequestOptions,
    ) -> Result<RequestBuilder> {
        let token = credentials.token()?;
        let url = self.endpoint(path)?;
        debug!(method = %method, url = %url, "RBAC API request");

        let mut builder = self.http_client.request(method, url).bearer_auth(token);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder)
    }

    /// Send and parse a JSON body; an empty body reads as `null`
    pub(crate) async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
        let response = self.dispatch(builder).await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.dispatch(builder).await?;
        Ok(())
    }

    pub(crate) async fn send_bytes(&self, builder: RequestBuilder) -> Result<Bytes> {
        let response = self.dispatch(builder).await?;
        Ok(response.bytes().await?)
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = RbacError::from_response_body(status, &body);
        warn!(status = status.as_u16(), "RBAC API request failed: {}", err);
        Err(err)
    }
}
