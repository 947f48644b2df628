//! # Command Execution Layer
//!
//! Translates [`Effect`]s into side effects: backend calls and file writes
//! run as spawned tasks whose [`ExecOutcome`] flows back into the event loop,
//! while clipboard and preference updates run inline.
//!
//! State updates stay pure in `App::update`; everything that touches the
//! outside world happens here.

use std::path::Path;

use arboard::Clipboard;
use flowdeck_engine::create_workflow;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::{JoinHandle, spawn};

use crate::app::{App, Effect, ExecOutcome};
use crate::ui::components::logs::state::LogEntry;

/// Outcomes produced by one batch of effects.
#[derive(Default)]
pub struct CommandBatch {
    /// Results available right away.
    pub immediate: Vec<ExecOutcome>,
    /// Background tasks that will produce results later.
    pub pending: Vec<JoinHandle<ExecOutcome>>,
}

pub fn run_from_effects(app: &mut App, effects: Vec<Effect>) -> CommandBatch {
    let mut batch = CommandBatch::default();

    for effect in effects {
        match effect {
            Effect::LoadRequested => match app.session().cloned() {
                Some(session) => batch.pending.push(spawn(async move { ExecOutcome::Loaded(session.load().await) })),
                None => batch.immediate.push(ExecOutcome::Log(LogEntry::warn("No workflow selected."))),
            },
            Effect::SubmitRequested { instance_id, handler, data } => match app.session().cloned() {
                Some(session) => batch.pending.push(spawn(async move {
                    let report = session.submit(instance_id.as_deref(), &handler, &data).await;
                    ExecOutcome::Submitted { handler, report }
                })),
                None => batch.immediate.push(ExecOutcome::Log(LogEntry::warn("No workflow selected."))),
            },
            Effect::CreateRequested => {
                let backend = app.backend().clone();
                batch.pending.push(spawn(async move {
                    let mut rng = StdRng::from_entropy();
                    ExecOutcome::Created(create_workflow(backend.as_ref(), &mut rng).await)
                }));
            }
            Effect::CopyToClipboard(text) => batch.immediate.push(ExecOutcome::Log(copy_to_clipboard(&text))),
            Effect::SaveDiagram { path, markup } => {
                batch.pending.push(spawn(async move { ExecOutcome::Log(save_diagram(&path, markup).await) }));
            }
            Effect::RememberWorkflow(id) => {
                if let Err(error) = app.preferences.set_last_workflow_id(Some(id)) {
                    tracing::warn!(error = %error, "failed to persist last workflow id");
                }
            }
        }
    }

    batch
}

async fn save_diagram(path: &Path, markup: String) -> LogEntry {
    match tokio::fs::write(path, markup).await {
        Ok(()) => LogEntry::info(format!("Diagram written to {}", path.display())),
        Err(error) => LogEntry::error(format!("Could not write {}: {error}", path.display())),
    }
}

fn copy_to_clipboard(text: &str) -> LogEntry {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => LogEntry::info("Workflow state copied to clipboard"),
        Err(error) => LogEntry::error(format!("Clipboard error: {error}")),
    }
}
