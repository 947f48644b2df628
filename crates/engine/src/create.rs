//! The new-workflow action.

use flowdeck_api::WorkflowBackend;
use flowdeck_types::ViewerLocation;
use rand::Rng;
use tracing::{info, warn};

/// Exclusive upper bound of generated workflow ids.
const WORKFLOW_ID_LIMIT: u64 = 100_000_000_000_000_000;

/// How a create request went. The location is valid either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub location: ViewerLocation,
    /// Response status, absent when the request failed in transport.
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl CreateOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|status| (200..300).contains(&status))
    }
}

/// Draws a decimal id in `[0, 10^17)`. No uniqueness is guaranteed.
fn new_workflow_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(0..WORKFLOW_ID_LIMIT).to_string()
}

/// Generates an id and creates the instance.
pub async fn create_workflow<R: Rng + ?Sized>(backend: &dyn WorkflowBackend, rng: &mut R) -> CreateOutcome {
    let id = new_workflow_id(rng);
    create_workflow_with_id(backend, id).await
}

/// Creates an instance under `id` and returns where to navigate.
///
/// Creation failures are logged; the navigation target does not depend on them.
async fn create_workflow_with_id(backend: &dyn WorkflowBackend, id: String) -> CreateOutcome {
    let location = ViewerLocation::new(id.clone());
    match backend.create_workflow(&id).await {
        Ok(response) => {
            if response.is_success() {
                info!(id = %id, status = response.status, "workflow created");
            } else {
                warn!(id = %id, status = response.status, "create request returned a non-success status");
            }
            CreateOutcome {
                location,
                status: Some(response.status),
                error: None,
            }
        }
        Err(error) => {
            warn!(id = %id, error = %error, "create request failed");
            CreateOutcome {
                location,
                status: error.status(),
                error: Some(error.to_string()),
            }
        }
    }
}
