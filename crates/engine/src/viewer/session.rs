use std::sync::Arc;

use flowdeck_api::{ApiError, WorkflowBackend};
use flowdeck_types::{Definition, ViewerLocation};
use flowdeck_util::single_line;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{LoadReport, LoadSequencer, ViewerSnapshot};

/// What happened to a submitted form.
#[derive(Debug, Clone)]
pub enum SubmitReport {
    /// The backend answered `200`; the viewer reloaded once.
    Accepted { reload: LoadReport },
    /// The backend answered with any other status. Nothing was reloaded.
    Rejected { status: u16, body: String },
    /// The request never produced a response. Nothing was reloaded.
    Failed { error: String },
}

impl SubmitReport {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Loads and drives one workflow instance against a backend.
#[derive(Clone)]
pub struct WorkflowSession {
    backend: Arc<dyn WorkflowBackend>,
    location: ViewerLocation,
    sequencer: Arc<LoadSequencer>,
}

impl std::fmt::Debug for WorkflowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowSession").field("location", &self.location).finish_non_exhaustive()
    }
}

impl WorkflowSession {
    pub fn new(backend: Arc<dyn WorkflowBackend>, location: ViewerLocation) -> Self {
        Self::with_sequencer(backend, location, Arc::new(LoadSequencer::new()))
    }

    /// Builds a session that draws generations from a shared sequencer.
    pub fn with_sequencer(backend: Arc<dyn WorkflowBackend>, location: ViewerLocation, sequencer: Arc<LoadSequencer>) -> Self {
        Self {
            backend,
            location,
            sequencer,
        }
    }

    /// Fetches the instance, then its diagram and definition.
    ///
    /// An instance failure ends the cycle without a snapshot. A diagram or
    /// definition failure is logged and the snapshot is built without it.
    pub async fn load(&self) -> LoadReport {
        let generation = self.sequencer.next_generation();
        let id = self.location.id();
        let mut errors = Vec::new();
        debug!(generation = generation.value(), id, "loading workflow");

        let instance = match self.backend.get_workflow(id).await {
            Ok(instance) => instance,
            Err(error) => {
                warn!(id, error = %error, "failed to load workflow instance");
                errors.push(describe("workflow", &error));
                return LoadReport {
                    generation,
                    location: self.location.clone(),
                    snapshot: None,
                    errors,
                };
            }
        };

        let workflow_name = instance.meta.workflow.clone();
        let diagram = match self.backend.get_diagram(&workflow_name).await {
            Ok(markup) => Some(markup),
            Err(error) => {
                warn!(workflow = %workflow_name, error = %error, "failed to load diagram");
                errors.push(describe("diagram", &error));
                None
            }
        };

        let definition = match self.backend.get_definition(&workflow_name).await {
            Ok(definition) => definition,
            Err(error) => {
                warn!(workflow = %workflow_name, error = %error, "failed to load definition");
                errors.push(describe("definition", &error));
                Definition::default()
            }
        };

        let snapshot = ViewerSnapshot::new(self.location.clone(), instance, definition, diagram);
        debug!(
            generation = generation.value(),
            handlers = snapshot.handlers().len(),
            active = snapshot.active_handlers().len(),
            "workflow loaded"
        );
        LoadReport {
            generation,
            location: self.location.clone(),
            snapshot: Some(Arc::new(snapshot)),
            errors,
        }
    }

    /// Posts `form_data` to the handler's endpoint under `instance_id`, the
    /// loaded instance's [`ViewerSnapshot::submit_id`]. Without one the
    /// location id is used.
    ///
    /// Only a `200` answer triggers the reload; failures are logged and
    /// reported, never raised.
    pub async fn submit(&self, instance_id: Option<&str>, handler: &str, form_data: &Value) -> SubmitReport {
        let id = instance_id.filter(|id| !id.is_empty()).unwrap_or(self.location.id());
        match self.backend.submit_event(id, handler, form_data).await {
            Ok(response) if response.is_accepted() => {
                info!(id, handler, "event accepted");
                SubmitReport::Accepted { reload: self.load().await }
            }
            Ok(response) => {
                warn!(id, handler, status = response.status, body = %single_line(&response.body), "event rejected");
                SubmitReport::Rejected {
                    status: response.status,
                    body: response.body,
                }
            }
            Err(error) => {
                warn!(id, handler, error = %error, "event submission failed");
                SubmitReport::Failed { error: error.to_string() }
            }
        }
    }
}

fn describe(what: &str, error: &ApiError) -> String {
    format!("{what}: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use serde_json::json;

    fn session(backend: &Arc<FakeBackend>) -> WorkflowSession {
        WorkflowSession::new(backend.clone(), ViewerLocation::new("42"))
    }

    #[tokio::test]
    async fn load_issues_three_reads_in_order() {
        let backend = Arc::new(FakeBackend::pizza());
        let report = session(&backend).load().await;

        assert_eq!(backend.calls(), vec!["get_workflow:42", "get_diagram:pizzaOrder", "get_definition:pizzaOrder"]);
        let snapshot = report.snapshot.expect("snapshot");
        assert_eq!(snapshot.active_handlers().len(), 1);
        assert_eq!(snapshot.diagram(), Some("<svg/>"));
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn instance_failure_stops_the_cycle() {
        let backend = Arc::new(FakeBackend::pizza().failing("get_workflow"));
        let report = session(&backend).load().await;

        assert!(report.snapshot.is_none());
        assert_eq!(backend.call_count(), 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[tokio::test]
    async fn diagram_and_definition_failures_degrade() {
        let backend = Arc::new(FakeBackend::pizza().failing("get_diagram").failing("get_definition"));
        let report = session(&backend).load().await;

        let snapshot = report.snapshot.expect("snapshot");
        assert!(snapshot.diagram().is_none());
        assert!(snapshot.handlers().is_empty());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn accepted_submit_reloads_exactly_once() {
        let backend = Arc::new(FakeBackend::pizza().with_submit_status(200));
        let report = session(&backend).submit(None, "PlaceOrder", &json!({ "Qty": 1 })).await;

        assert!(report.is_accepted());
        assert_eq!(
            backend.calls(),
            vec![
                "submit_event:42/PlaceOrder",
                "get_workflow:42",
                "get_diagram:pizzaOrder",
                "get_definition:pizzaOrder"
            ]
        );
        assert_eq!(backend.submitted(), vec![json!({ "Qty": 1 })]);
    }

    #[tokio::test]
    async fn rejected_submit_never_reloads() {
        for status in [201, 204, 400, 500] {
            let backend = Arc::new(FakeBackend::pizza().with_submit_status(status));
            let report = session(&backend).submit(None, "PlaceOrder", &json!({})).await;

            assert!(matches!(report, SubmitReport::Rejected { status: got, .. } if got == status));
            assert_eq!(backend.call_count(), 1, "status {status} should not reload");
        }
    }

    #[tokio::test]
    async fn transport_failure_never_reloads() {
        let backend = Arc::new(FakeBackend::pizza().failing("submit_event"));
        let report = session(&backend).submit(None, "PlaceOrder", &json!({})).await;

        assert!(matches!(report, SubmitReport::Failed { .. }));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn submit_posts_under_the_loaded_instance_id() {
        let backend = Arc::new(FakeBackend::pizza().with_instance_id("canonical-7"));
        let session = WorkflowSession::new(backend.clone(), ViewerLocation::new("7"));
        let snapshot = session.load().await.snapshot.expect("snapshot");
        assert_eq!(snapshot.submit_id(), "canonical-7");

        let report = session.submit(Some(snapshot.submit_id()), "PlaceOrder", &json!({})).await;

        assert!(report.is_accepted());
        let calls = backend.calls();
        assert_eq!(calls[3], "submit_event:canonical-7/PlaceOrder");
        assert_eq!(calls[4], "get_workflow:7");
    }

    #[tokio::test]
    async fn empty_instance_id_falls_back_to_location() {
        let backend = Arc::new(FakeBackend::pizza().with_instance_id(""));
        let session = WorkflowSession::new(backend.clone(), ViewerLocation::new("7"));
        let snapshot = session.load().await.snapshot.expect("snapshot");

        session.submit(Some(snapshot.submit_id()), "PlaceOrder", &json!({})).await;

        assert_eq!(backend.calls()[3], "submit_event:7/PlaceOrder");
    }

    #[tokio::test]
    async fn sessions_sharing_a_sequencer_order_their_loads() {
        let backend = Arc::new(FakeBackend::pizza());
        let sequencer = Arc::new(LoadSequencer::new());
        let first = WorkflowSession::with_sequencer(backend.clone(), ViewerLocation::new("42"), sequencer.clone());
        let second = WorkflowSession::with_sequencer(backend.clone(), ViewerLocation::new("42"), sequencer);

        let a = first.load().await;
        let b = second.load().await;
        assert!(b.generation > a.generation);
    }
}
