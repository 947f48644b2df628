//! Shared type definitions for Flowdeck.
//!
//! These types model the JSON documents served by the workflow backend:
//!
//! - [`WorkflowInstance`]: one running execution, its metadata and its state
//! - [`Definition`]: the statement tree of a workflow type plus its state schema
//! - [`ViewerLocation`]: the `/ui/?id=...` address of a viewed instance
//!
//! Deserialization is lenient: missing or
//! `null` fields fall back to empty values instead of failing, so a partially
//! populated document still renders.

pub mod active;
pub mod definition;
pub mod instance;
pub mod location;

pub use active::active_handlers;
pub use definition::{Definition, HandlerNode, Stmt, extract_handlers};
pub use instance::{Meta, Thread, WaitEvent, WaitRequest, WorkflowInstance};
pub use location::{LocationError, ViewerLocation};
