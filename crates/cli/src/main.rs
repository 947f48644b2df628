mod cli;
mod commands;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use flowdeck_api::{WorkflowBackend, WorkflowClient};
use flowdeck_types::ViewerLocation;
use flowdeck_util::UserPreferences;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Command::New { open: true }));
    init_tracing(interactive);

    let preferences = Arc::new(UserPreferences::new().unwrap_or_else(|error| {
        tracing::warn!("Preferences unavailable, using in-memory defaults: {error}");
        UserPreferences::ephemeral()
    }));
    let client = WorkflowClient::new(cli.global.client_config(&preferences)?)?;
    let backend: Arc<dyn WorkflowBackend> = Arc::new(client);
    let format = cli.global.output;

    let Some(command) = cli.command else {
        // No subcommand => TUI on the requested or last viewed instance
        let location = cli
            .global
            .explicit_location()?
            .or_else(|| preferences.last_workflow_id().map(ViewerLocation::new));
        return flowdeck_tui::run(backend, location, preferences).await;
    };

    match command {
        Command::Show { id } => commands::show(backend, cli.global.require_id(id.as_deref())?, format).await,
        Command::Handlers { id } => commands::handlers(backend, cli.global.require_id(id.as_deref())?, format).await,
        Command::Definition { name } => commands::definition(backend.as_ref(), &name, format).await,
        Command::Diagram { name, file } => commands::diagram(backend.as_ref(), &name, file.as_deref()).await,
        Command::Submit { id, handler, data } => {
            let data = commands::parse_form_data(&data)?;
            commands::submit(backend, id, &handler, &data, format).await
        }
        Command::New { open } => {
            let outcome = commands::create(backend.as_ref()).await;
            if open {
                return flowdeck_tui::run(backend, Some(outcome.location), preferences).await;
            }
            commands::print_created(&outcome);
            if let Err(error) = preferences.set_last_workflow_id(Some(outcome.location.id().to_string())) {
                tracing::warn!("Could not remember the new workflow: {error}");
            }
            Ok(())
        }
    }
}

/// Commands log to stderr. The viewer owns the terminal, so its diagnostics
/// go to a file instead.
fn init_tracing(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if !interactive {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
        return;
    }
    let Some(path) = tracing_log_path() else {
        return;
    };
    if let Some(parent) = path.parent()
        && fs::create_dir_all(parent).is_err()
    {
        return;
    }
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }
}

fn tracing_log_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("flowdeck").join("logs").join("flowdeck.log"))
}
