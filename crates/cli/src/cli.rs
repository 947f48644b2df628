//! Command-line surface and configuration resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flowdeck_api::{API_BASE_ENV, ClientConfig, DEFAULT_API_BASE, DEFAULT_WORKFLOW_KIND, WORKFLOW_KIND_ENV};
use flowdeck_types::ViewerLocation;
use flowdeck_util::UserPreferences;

#[derive(Debug, Parser)]
#[command(name = "flowdeck", version, about = "View and drive workflow instances from the terminal")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Without a command the interactive viewer starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Backend base URL
    #[arg(long, global = true, env = API_BASE_ENV)]
    pub base_url: Option<String>,

    /// Workflow kind used in `/wf/{kind}/...` paths
    #[arg(long, global = true, env = WORKFLOW_KIND_ENV)]
    pub kind: Option<String>,

    /// Workflow instance id to open
    #[arg(long, global = true, conflicts_with = "location")]
    pub id: Option<String>,

    /// Viewer location such as `/ui/?id=42`
    #[arg(long, global = true)]
    pub location: Option<String>,

    /// Output format for printed documents
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load an instance and print its snapshot summary
    Show {
        id: Option<String>,
    },
    /// Print the handlers the instance is waiting on, with their input schemas
    Handlers {
        id: Option<String>,
    },
    /// Print every handler node of a workflow definition
    Definition {
        name: String,
    },
    /// Fetch the diagram of a workflow definition
    Diagram {
        name: String,
        /// Write the markup to a file instead of stdout
        #[arg(long = "file", short = 'f')]
        file: Option<PathBuf>,
    },
    /// Submit an event to a handler
    Submit {
        id: String,
        handler: String,
        /// Form data as a JSON object
        #[arg(long, default_value = "{}")]
        data: String,
    },
    /// Create a new instance with a random id
    New {
        /// Open the viewer on the new instance
        #[arg(long)]
        open: bool,
    },
}

impl GlobalArgs {
    /// Base URL from the flag or environment, then preferences, then the default.
    pub fn base_url(&self, preferences: &UserPreferences) -> String {
        self.base_url
            .clone()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| preferences.api_base())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    pub fn kind(&self) -> String {
        self.kind
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WORKFLOW_KIND.to_string())
    }

    pub fn client_config(&self, preferences: &UserPreferences) -> Result<ClientConfig> {
        let base_url = self.base_url(preferences);
        ClientConfig::new(&base_url, self.kind()).with_context(|| format!("invalid backend configuration for {base_url}"))
    }

    /// Location named by `--id` or `--location`, if any.
    pub fn explicit_location(&self) -> Result<Option<ViewerLocation>> {
        if let Some(id) = &self.id {
            return Ok(Some(ViewerLocation::new(id.trim())));
        }
        match &self.location {
            Some(raw) => ViewerLocation::parse(raw).map(Some).with_context(|| format!("invalid location `{raw}`")),
            None => Ok(None),
        }
    }

    /// Instance id for a subcommand: the positional argument, then the global
    /// flags.
    pub fn require_id(&self, positional: Option<&str>) -> Result<String> {
        if let Some(id) = positional {
            return Ok(id.trim().to_string());
        }
        self.explicit_location()?
            .map(|location| location.id().to_string())
            .context("no workflow id given; pass it as an argument or with --id")
    }
}
