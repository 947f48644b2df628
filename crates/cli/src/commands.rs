//! Non-interactive subcommands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use flowdeck_api::WorkflowBackend;
use flowdeck_engine::{CreateOutcome, SubmitReport, ViewerSnapshot, WorkflowSession, create_workflow};
use flowdeck_types::ViewerLocation;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;

pub fn print_document<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Loads a snapshot; partial failures are reported on stderr through tracing.
async fn load_snapshot(backend: Arc<dyn WorkflowBackend>, id: String) -> Result<Arc<ViewerSnapshot>> {
    let report = WorkflowSession::new(backend, ViewerLocation::new(id.clone())).load().await;
    match report.snapshot {
        Some(snapshot) => {
            for error in &report.errors {
                tracing::warn!(workflow_id = %id, "{error}");
            }
            Ok(snapshot)
        }
        None => bail!("failed to load workflow {id}: {}", report.errors.join("; ")),
    }
}

pub async fn show(backend: Arc<dyn WorkflowBackend>, id: String, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(backend, id).await?;
    print_document(&snapshot.summary(), format)
}

pub async fn handlers(backend: Arc<dyn WorkflowBackend>, id: String, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(backend, id).await?;
    print_document(&snapshot.summary().active_handlers, format)
}

pub async fn definition(backend: &dyn WorkflowBackend, name: &str, format: OutputFormat) -> Result<()> {
    let definition = backend
        .get_definition(name)
        .await
        .with_context(|| format!("failed to fetch definition {name}"))?;
    let handlers: Vec<Value> = definition
        .handlers()
        .into_iter()
        .map(|handler| {
            json!({
                "name": handler.name,
                "role": handler.role,
                "input_schema": handler.input_schema,
                "output_schema": handler.output_schema,
            })
        })
        .collect();
    print_document(&json!({ "workflow": name, "handlers": handlers, "state_schema": definition.state_schema }), format)
}

pub async fn diagram(backend: &dyn WorkflowBackend, name: &str, file: Option<&Path>) -> Result<()> {
    let markup = backend
        .get_diagram(name)
        .await
        .with_context(|| format!("failed to fetch diagram for {name}"))?;
    match file {
        Some(path) => {
            std::fs::write(path, markup).with_context(|| format!("could not write {}", path.display()))?;
            tracing::info!(path = %path.display(), "diagram written");
        }
        None => println!("{markup}"),
    }
    Ok(())
}

/// Parses `--data`; the backend expects a JSON object.
pub fn parse_form_data(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("--data is not valid JSON")?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(value)
}

/// Loads the instance first so the event goes to its `Meta.ID`; when the
/// load fails the given id is used as is.
pub async fn submit(backend: Arc<dyn WorkflowBackend>, id: String, handler: &str, data: &Value, format: OutputFormat) -> Result<()> {
    let session = WorkflowSession::new(backend, ViewerLocation::new(id.clone()));
    let loaded = session.load().await;
    if loaded.snapshot.is_none() {
        tracing::warn!(workflow_id = %id, "submitting without a loaded instance: {}", loaded.errors.join("; "));
    }
    let instance_id = loaded.snapshot.as_ref().map(|snapshot| snapshot.submit_id());
    match session.submit(instance_id, handler, data).await {
        SubmitReport::Accepted { reload } => {
            let snapshot = reload.snapshot.as_ref().map(|snapshot| snapshot.summary());
            print_document(&json!({ "status": 200, "errors": reload.errors, "snapshot": snapshot }), format)
        }
        SubmitReport::Rejected { status, body } => {
            print_document(&json!({ "status": status, "body": body }), format)?;
            bail!("{handler} was rejected with status {status}")
        }
        SubmitReport::Failed { error } => bail!("submitting {handler} failed: {error}"),
    }
}

/// Creates an instance with a fresh random id. The outcome is returned even
/// when the backend refused it, so callers can still navigate there.
pub async fn create(backend: &dyn WorkflowBackend) -> CreateOutcome {
    create_workflow(backend, &mut rand::thread_rng()).await
}

pub fn print_created(outcome: &CreateOutcome) {
    match (&outcome.error, outcome.status) {
        (Some(error), _) => tracing::warn!("create request failed: {error}"),
        (None, Some(status)) if !outcome.is_success() => tracing::warn!(status, "backend did not confirm the new workflow"),
        _ => {}
    }
    println!("{}", outcome.location);
}
