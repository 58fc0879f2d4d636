//! REST gateway to the Services API
//!
//! The rest of the crate only sees [`RestGateway`]: one authenticated
//! request that yields parsed JSON or a typed [`RequestError`].
//! [`HttpGateway`] is the reqwest-backed implementation.

pub mod endpoints;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use url::Url;

use crate::config::ApiConfig;
use crate::utils::error::RequestError;

pub use endpoints::Endpoints;

/// HTTP methods used by the Services API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Authenticated access to the Services API
#[async_trait]
pub trait RestGateway: Send + Sync {
    /// Perform one request and parse the body as JSON
    async fn request(&self, method: Method, url: &Url) -> Result<Value, RequestError>;
}

/// reqwest-backed gateway using HTTP basic auth
pub struct HttpGateway {
    client: Client,
    application_id: String,
    secret_key: String,
}

impl HttpGateway {
    /// Create a new gateway from the API configuration
    ///
    /// Missing credentials are accepted here and refused on each request.
    pub fn new(config: &ApiConfig) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(format!("pco-live/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            application_id: config.application_id.trim().to_string(),
            secret_key: config.secret_key.trim().to_string(),
        })
    }

    fn has_credentials(&self) -> bool {
        !self.application_id.is_empty() && !self.secret_key.is_empty()
    }
}

#[async_trait]
impl RestGateway for HttpGateway {
    async fn request(&self, method: Method, url: &Url) -> Result<Value, RequestError> {
        if !self.has_credentials() {
            return Err(RequestError::InvalidCredentials);
        }

        let builder = match method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        };

        tracing::debug!(method = %method, url = %url, "Services API request");

        let response = builder
            .basic_auth(&self.application_id, Some(&self.secret_key))
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            tracing::debug!(method = %method, url = %url, status = %status, "Services API failure");
            return Err(status_error(status, url));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        parse_body(&body)
    }
}

/// Map a non-success status onto a request error
fn status_error(status: StatusCode, url: &Url) -> RequestError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RequestError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => RequestError::NotFound {
            url: url.to_string(),
        },
        other => RequestError::Status {
            status: other.as_u16(),
            message: other.canonical_reason().unwrap_or("Unknown error").to_string(),
        },
    }
}

/// Parse a response body; an empty body is an empty object
fn parse_body(body: &[u8]) -> Result<Value, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| RequestError::MalformedBody(e.to_string()))
}
