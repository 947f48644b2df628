//! Workflow backend client.
//!
//! This crate provides a lightweight client for the workflow backend's HTTP
//! interface. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating the configured base URL
//! - Building the five endpoint requests the viewer needs
//! - Reporting POST outcomes by status instead of failing on them
//!
//! The primary entry point is [`WorkflowClient`], which implements the
//! [`WorkflowBackend`] trait consumed by the viewer engine.
//!
//! # Example
//!
//! ```ignore
//! use flowdeck_api::{ClientConfig, WorkflowBackend, WorkflowClient};
//!
//! async fn show() -> Result<(), flowdeck_api::ApiError> {
//!     let client = WorkflowClient::new(ClientConfig::new("http://localhost:8080", "pizza")?)?;
//!     let instance = client.get_workflow("42").await?;
//!     println!("{} waits on {:?}", instance.meta.workflow, instance.pending_events());
//!     Ok(())
//! }
//! ```

mod backend;
mod error;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use flowdeck_types::{Definition, WorkflowInstance};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub use backend::{CreateResponse, SUBMIT_ACCEPTED, SubmitResponse, WorkflowBackend};
pub use error::ApiError;

/// Environment variable holding the backend base URL.
pub const API_BASE_ENV: &str = "FLOWDECK_API_BASE";
/// Environment variable holding the workflow kind used in `/wf/{kind}/...` paths.
pub const WORKFLOW_KIND_ENV: &str = "FLOWDECK_WORKFLOW_KIND";
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_WORKFLOW_KIND: &str = "pizza";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters left unescaped in a path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Where the backend lives and which workflow kind the viewer drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    workflow_kind: String,
}

impl ClientConfig {
    /// Validates and normalizes a base URL and workflow kind.
    pub fn new(base_url: impl AsRef<str>, workflow_kind: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;
        let workflow_kind = workflow_kind.into();
        if workflow_kind.trim().is_empty() {
            return Err(ApiError::InvalidConfig("workflow kind must not be empty".into()));
        }
        Ok(Self { base_url, workflow_kind })
    }

    /// Builds a config from `FLOWDECK_API_BASE` and `FLOWDECK_WORKFLOW_KIND`,
    /// falling back to `fallback_base` and then the defaults.
    pub fn from_env(fallback_base: Option<&str>) -> Result<Self, ApiError> {
        let base_url = env::var(API_BASE_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| fallback_base.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let workflow_kind = env::var(WORKFLOW_KIND_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WORKFLOW_KIND.to_string());
        Self::new(base_url, workflow_kind)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn workflow_kind(&self) -> &str {
        &self.workflow_kind
    }

    /// `/wf/{kind}/{id}`
    pub fn workflow_path(&self, id: &str) -> String {
        format!("/wf/{}/{}", encode_segment(&self.workflow_kind), encode_segment(id))
    }

    /// `/wf/{kind}/{id}/{handler}`
    pub fn event_path(&self, id: &str, handler: &str) -> String {
        format!("{}/{}", self.workflow_path(id), encode_segment(handler))
    }

    /// `/graph/{name}`; the `format=svg` query is added by the request.
    pub fn graph_path(&self, workflow_name: &str) -> String {
        format!("/graph/{}", encode_segment(workflow_name))
    }

    /// `/definition/{name}`
    pub fn definition_path(&self, workflow_name: &str) -> String {
        format!("/definition/{}", encode_segment(workflow_name))
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Thin wrapper around a configured `reqwest::Client` for the workflow backend.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    config: ClientConfig,
    http: Client,
    user_agent: String,
}

impl WorkflowClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json, image/svg+xml;q=0.9, */*;q=0.5"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            config,
            http,
            user_agent: format!("flowdeck/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a `reqwest::RequestBuilder` for a method and backend-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(%method, %url, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<(u16, String), ApiError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = builder.send().await.map_err(|source| ApiError::Transport { url: url.clone(), source })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| ApiError::Transport { url, source })?;
        Ok((status, body))
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut builder = self.request(Method::GET, path);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let (status, body) = self.send(builder, path).await?;
        if !(200..300).contains(&status) {
            return Err(ApiError::Status {
                url: format!("{}{}", self.config.base_url, path),
                status,
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.get_text(path, &[]).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: format!("{}{}", self.config.base_url, path),
            source,
        })
    }
}

#[async_trait]
impl WorkflowBackend for WorkflowClient {
    async fn get_workflow(&self, id: &str) -> Result<WorkflowInstance, ApiError> {
        self.get_json(&self.config.workflow_path(id)).await
    }

    async fn get_diagram(&self, workflow_name: &str) -> Result<String, ApiError> {
        self.get_text(&self.config.graph_path(workflow_name), &[("format", "svg")]).await
    }

    async fn get_definition(&self, workflow_name: &str) -> Result<Definition, ApiError> {
        self.get_json(&self.config.definition_path(workflow_name)).await
    }

    async fn submit_event(&self, id: &str, handler: &str, form_data: &Value) -> Result<SubmitResponse, ApiError> {
        let path = self.config.event_path(id, handler);
        let builder = self.request(Method::POST, &path).json(form_data);
        let (status, body) = self.send(builder, &path).await?;
        Ok(SubmitResponse { status, body })
    }

    async fn create_workflow(&self, id: &str) -> Result<CreateResponse, ApiError> {
        let path = self.config.workflow_path(id);
        let builder = self
            .request(Method::POST, &path)
            .header(header::CONTENT_TYPE, "application/json");
        let (status, body) = self.send(builder, &path).await?;
        Ok(CreateResponse { status, body })
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - must parse as an absolute URL with an `http` or `https` scheme
/// - must include a host
/// - must not carry a query string or fragment
fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base).map_err(|error| invalid(error.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("scheme must be http or https; got '{}://'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("must include a host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not include a query or fragment".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8080/", "pizza").expect("config");
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn keeps_path_prefix() {
        let config = ClientConfig::new("https://pizza.example.com/api", "pizza").expect("config");
        assert_eq!(config.base_url(), "https://pizza.example.com/api");
    }

    #[test]
    fn rejects_bad_base_urls() {
        for base in ["localhost:8080", "ftp://example.com", "http://example.com/?x=1", "not a url"] {
            assert!(
                matches!(ClientConfig::new(base, "pizza"), Err(ApiError::InvalidBaseUrl { .. })),
                "{base} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_kind() {
        assert!(matches!(ClientConfig::new("http://localhost", " "), Err(ApiError::InvalidConfig(_))));
    }

    #[test]
    fn builds_endpoint_paths() {
        let config = ClientConfig::new("http://localhost:8080", "pizza").expect("config");
        assert_eq!(config.workflow_path("123"), "/wf/pizza/123");
        assert_eq!(config.event_path("123", "PlaceOrder"), "/wf/pizza/123/PlaceOrder");
        assert_eq!(config.graph_path("pizzaOrder"), "/graph/pizzaOrder");
        assert_eq!(config.definition_path("pizzaOrder"), "/definition/pizzaOrder");
    }

    #[test]
    fn encodes_path_segments() {
        let config = ClientConfig::new("http://localhost:8080", "pizza").expect("config");
        assert_eq!(config.workflow_path("a/b c"), "/wf/pizza/a%2Fb%20c");
        assert_eq!(config.event_path("1", "confirm_payment"), "/wf/pizza/1/confirm_payment");
    }
}
