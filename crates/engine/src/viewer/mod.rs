//! Loading, snapshotting and submitting against one workflow instance.

mod sequence;
mod session;
mod snapshot;

pub use sequence::{Generation, LoadReport, LoadSequencer, SnapshotSlot};
pub use session::{SubmitReport, WorkflowSession};
pub use snapshot::{HandlerSummary, SnapshotSummary, ViewerSnapshot};
