//! Workflow instance documents returned by `GET /wf/{kind}/{id}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One running execution of a backend-defined workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    /// Engine metadata: definition name, instance id and threads.
    #[serde(rename = "Meta")]
    pub meta: Meta,
    /// Schema-less workflow state, kept verbatim.
    #[serde(rename = "State", default)]
    pub state: Value,
}

/// Metadata describing where an instance is in its definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Name of the workflow definition (used for the graph and definition endpoints).
    #[serde(rename = "Workflow", default)]
    pub workflow: String,
    /// Identifier of this instance.
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Execution branches; the backend sends `null` when there are none.
    #[serde(rename = "Threads", default)]
    pub threads: Option<Vec<Thread>>,
    /// Any further metadata the backend reports (status, timestamps, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A backend execution branch that may be blocked on named events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "WaitEvents", default)]
    pub wait_events: Option<Vec<Option<WaitEvent>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An event a thread is waiting for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitEvent {
    #[serde(rename = "Req", default)]
    pub req: Option<WaitRequest>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitRequest {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    /// Threads as a slice, treating `null` as empty.
    pub fn threads(&self) -> &[Thread] {
        self.threads.as_deref().unwrap_or_default()
    }
}

impl Thread {
    /// Names of the events this thread waits on, skipping `null` entries and
    /// entries without a request name.
    pub fn waiting_on(&self) -> impl Iterator<Item = &str> {
        self.wait_events
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|event| event.as_ref())
            .filter_map(|event| event.req.as_ref())
            .filter_map(|req| req.name.as_deref())
    }
}

impl WorkflowInstance {
    /// Every pending event name across all threads, in thread order.
    pub fn pending_events(&self) -> Vec<&str> {
        self.meta.threads().iter().flat_map(Thread::waiting_on).collect()
    }
}
