//! In-memory backend that records every call.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use flowdeck_api::{ApiError, CreateResponse, SubmitResponse, WorkflowBackend};
use flowdeck_types::{Definition, WorkflowInstance};
use serde_json::{Value, json};

pub struct FakeBackend {
    instance: Value,
    definition: Value,
    submit_status: u16,
    create_status: u16,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<Value>>,
}

impl FakeBackend {
    /// A `pizzaOrder` instance waiting on `PlaceOrder`.
    pub fn pizza() -> Self {
        Self {
            instance: json!({
                "Meta": {
                    "Workflow": "pizzaOrder",
                    "ID": "42",
                    "Threads": [{ "WaitEvents": [{ "Req": { "Name": "PlaceOrder" } }] }]
                },
                "State": { "Status": "new" }
            }),
            definition: json!({
                "Stmts": [
                    { "Type": "event", "Name": "PlaceOrder", "Handler": { "Type": "handler", "Input": { "type": "object" } } },
                    { "Type": "event", "Name": "Bake", "Handler": { "Type": "handler" } }
                ],
                "State": { "type": "object" }
            }),
            submit_status: 200,
            create_status: 200,
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Overrides the `Meta.ID` the instance reports.
    pub fn with_instance_id(mut self, id: &str) -> Self {
        self.instance["Meta"]["ID"] = Value::String(id.to_string());
        self
    }

    pub fn with_submit_status(mut self, status: u16) -> Self {
        self.submit_status = status;
        self
    }

    pub fn with_create_status(mut self, status: u16) -> Self {
        self.create_status = status;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub fn submitted(&self) -> Vec<Value> {
        self.submitted.lock().expect("submitted lock").clone()
    }

    fn record(&self, operation: &'static str, detail: &str) -> Result<(), ApiError> {
        self.calls.lock().expect("calls lock").push(format!("{operation}:{detail}"));
        if self.failing.contains(operation) {
            return Err(ApiError::Status {
                url: format!("fake://{operation}"),
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowBackend for FakeBackend {
    async fn get_workflow(&self, id: &str) -> Result<WorkflowInstance, ApiError> {
        self.record("get_workflow", id)?;
        Ok(serde_json::from_value(self.instance.clone()).expect("fake instance"))
    }

    async fn get_diagram(&self, workflow_name: &str) -> Result<String, ApiError> {
        self.record("get_diagram", workflow_name)?;
        Ok("<svg/>".into())
    }

    async fn get_definition(&self, workflow_name: &str) -> Result<Definition, ApiError> {
        self.record("get_definition", workflow_name)?;
        Ok(serde_json::from_value(self.definition.clone()).expect("fake definition"))
    }

    async fn submit_event(&self, id: &str, handler: &str, form_data: &Value) -> Result<SubmitResponse, ApiError> {
        self.record("submit_event", &format!("{id}/{handler}"))?;
        self.submitted.lock().expect("submitted lock").push(form_data.clone());
        Ok(SubmitResponse {
            status: self.submit_status,
            body: String::new(),
        })
    }

    async fn create_workflow(&self, id: &str) -> Result<CreateResponse, ApiError> {
        self.record("create_workflow", id)?;
        Ok(CreateResponse {
            status: self.create_status,
            body: String::new(),
        })
    }
}
