//! Backend abstraction consumed by the viewer engine.

use async_trait::async_trait;
use flowdeck_types::{Definition, WorkflowInstance};
use serde::Serialize;
use serde_json::Value;

use crate::ApiError;

/// HTTP status the backend uses to acknowledge a submitted event.
pub const SUBMIT_ACCEPTED: u16 = 200;

/// Outcome of `POST /wf/{kind}/{id}/{handler}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: String,
}

impl SubmitResponse {
    /// Only a plain `200 OK` counts as accepted; every other status is a rejection.
    pub fn is_accepted(&self) -> bool {
        self.status == SUBMIT_ACCEPTED
    }
}

/// Outcome of `POST /wf/{kind}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateResponse {
    pub status: u16,
    pub body: String,
}

impl CreateResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The five backend operations the viewer relies on.
///
/// GET operations fail on non-success statuses and malformed payloads. POST
/// operations only fail on transport errors; their status is returned so the
/// caller decides what counts as success.
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// `GET /wf/{kind}/{id}`
    async fn get_workflow(&self, id: &str) -> Result<WorkflowInstance, ApiError>;

    /// `GET /graph/{name}?format=svg`
    async fn get_diagram(&self, workflow_name: &str) -> Result<String, ApiError>;

    /// `GET /definition/{name}`
    async fn get_definition(&self, workflow_name: &str) -> Result<Definition, ApiError>;

    /// `POST /wf/{kind}/{id}/{handler}` with the form data as JSON body.
    async fn submit_event(&self, id: &str, handler: &str, form_data: &Value) -> Result<SubmitResponse, ApiError>;

    /// `POST /wf/{kind}/{id}` with an empty body.
    async fn create_workflow(&self, id: &str) -> Result<CreateResponse, ApiError>;
}
