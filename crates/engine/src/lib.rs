//! # Flowdeck Engine
//!
//! The engine turns the raw backend operations exposed by `flowdeck-api` into
//! the viewer's behavior: loading an instance together with its definition and
//! diagram, deciding which handlers are active, submitting handler input, and
//! creating new instances.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use flowdeck_api::{ClientConfig, WorkflowClient};
//! use flowdeck_engine::{SnapshotSlot, WorkflowSession};
//! use flowdeck_types::ViewerLocation;
//!
//! let client = WorkflowClient::new(ClientConfig::from_env(None)?)?;
//! let location = ViewerLocation::new("42");
//! let session = WorkflowSession::new(Arc::new(client), location.clone());
//! let mut slot = SnapshotSlot::new(Some(location));
//! slot.accept(session.load().await);
//! ```
//!
//! ## Architecture
//!
//! - **`viewer`**: immutable [`ViewerSnapshot`]s, the [`WorkflowSession`] that
//!   produces them, and the generation tokens that discard stale loads
//! - **`create`**: random id generation and the create request
//! - **`forms`**: a flat form model derived from handler input schemas

pub mod create;
pub mod forms;
pub mod viewer;

#[cfg(test)]
mod testing;

pub use create::{CreateOutcome, create_workflow};
pub use forms::{FieldKind, FormError, FormSchema, FormState, HandlerForm, handler_forms, state_form};
pub use viewer::{
    Generation, HandlerSummary, LoadReport, LoadSequencer, SnapshotSlot, SnapshotSummary, SubmitReport, ViewerSnapshot, WorkflowSession,
};
