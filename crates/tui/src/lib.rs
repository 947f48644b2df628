//! # Flowdeck TUI Library
//!
//! Terminal viewer for a single workflow instance. It shows the instance
//! state, renders one input form for every handler the workflow is waiting
//! on, submits events, and creates new instances.
//!
//! ## Architecture
//!
//! - `app`: the `App` state and its `update(Msg) -> Vec<Effect>` reducer
//! - `cmd`: turns effects into spawned backend calls and local side effects
//! - `ui`: components, the root view, and the event loop
//! - `log_persistence`: background JSONL writer for the log panel

mod app;
mod cmd;
mod log_persistence;
mod theme;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use flowdeck_api::WorkflowBackend;
use flowdeck_types::ViewerLocation;
use flowdeck_util::UserPreferences;

/// Runs the viewer until the user quits.
///
/// With no `location` the viewer starts empty; `Ctrl+N` creates a new
/// instance and navigates to it.
///
/// # Errors
///
/// Returns an error when the terminal cannot be put into raw mode or drawn.
pub async fn run(backend: Arc<dyn WorkflowBackend>, location: Option<ViewerLocation>, preferences: Arc<UserPreferences>) -> Result<()> {
    ui::runtime::run_app(backend, location, preferences).await
}
