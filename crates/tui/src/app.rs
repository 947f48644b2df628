//! Application state and logic for the Flowdeck TUI.
//!
//! `App` owns everything the viewer shows: the snapshot slot, the forms built
//! from the current snapshot, and the log tail. State changes go through
//! [`App::update`], which returns [`Effect`]s for the command layer to run.

use std::path::PathBuf;
use std::sync::Arc;

use flowdeck_api::WorkflowBackend;
use flowdeck_engine::{
    CreateOutcome, FormError, FormState, HandlerForm, LoadReport, LoadSequencer, SnapshotSlot, SubmitReport, ViewerSnapshot, WorkflowSession,
    handler_forms, state_form,
};
use flowdeck_types::ViewerLocation;
use flowdeck_util::{UserPreferences, single_line};
use serde_json::Value;

use crate::ui::components::logs::state::{LogEntry, LogsState};

/// Messages that can be sent to update the application state.
#[derive(Debug)]
pub enum Msg {
    /// Periodic animation tick
    Tick,
    Resize(u16, u16),
    Reload,
    NewWorkflow,
    /// Copy the instance state JSON to the clipboard
    CopyState,
    /// Write the fetched diagram next to the working directory
    SaveDiagram,
    Quit,
    NextForm,
    PreviousForm,
    NextField,
    PreviousField,
    Input(char),
    Backspace,
    Toggle,
    CycleLeft,
    CycleRight,
    Submit,
    ExecCompleted(Box<ExecOutcome>),
}

/// Side effects requested by state updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadRequested,
    /// `instance_id` is the loaded instance's `Meta.ID`, if any.
    SubmitRequested {
        instance_id: Option<String>,
        handler: String,
        data: Value,
    },
    CreateRequested,
    CopyToClipboard(String),
    SaveDiagram { path: PathBuf, markup: String },
    RememberWorkflow(String),
}

/// Results of effects, fed back through `Msg::ExecCompleted`.
#[derive(Debug)]
pub enum ExecOutcome {
    Loaded(LoadReport),
    Submitted { handler: String, report: SubmitReport },
    Created(CreateOutcome),
    Log(LogEntry),
}

pub struct App {
    backend: Arc<dyn WorkflowBackend>,
    sequencer: Arc<LoadSequencer>,
    session: Option<WorkflowSession>,
    pub preferences: Arc<UserPreferences>,
    pub slot: SnapshotSlot,
    pub state_form: Option<FormState>,
    pub forms: Vec<HandlerForm>,
    /// Index into `forms` of the form receiving keys
    pub selected_form: usize,
    pub logs: LogsState,
    /// Background tasks still running
    pub in_flight: usize,
    pub throbber_idx: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(backend: Arc<dyn WorkflowBackend>, location: Option<ViewerLocation>, preferences: Arc<UserPreferences>, logs: LogsState) -> Self {
        let sequencer = Arc::new(LoadSequencer::new());
        let session = location
            .clone()
            .map(|location| WorkflowSession::with_sequencer(backend.clone(), location, sequencer.clone()));
        Self {
            backend,
            sequencer,
            session,
            preferences,
            slot: SnapshotSlot::new(location),
            state_form: None,
            forms: Vec::new(),
            selected_form: 0,
            logs,
            in_flight: 0,
            throbber_idx: 0,
            should_quit: false,
        }
    }

    pub fn backend(&self) -> &Arc<dyn WorkflowBackend> {
        &self.backend
    }

    pub fn session(&self) -> Option<&WorkflowSession> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Arc<ViewerSnapshot>> {
        self.slot.current()
    }

    pub fn location(&self) -> Option<&ViewerLocation> {
        self.slot.location()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn selected_form(&self) -> Option<&HandlerForm> {
        self.forms.get(self.selected_form)
    }

    fn selected_form_mut(&mut self) -> Option<&mut FormState> {
        self.forms.get_mut(self.selected_form).map(|form| &mut form.state)
    }

    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }

    /// Effects to run once the event loop starts.
    pub fn startup_effects(&mut self) -> Vec<Effect> {
        match self.location() {
            Some(location) => vec![Effect::RememberWorkflow(location.id().to_string()), Effect::LoadRequested],
            None => {
                self.log(LogEntry::info("No workflow selected. Press Ctrl+N to create one."));
                Vec::new()
            }
        }
    }

    /// Switches the viewer to another instance and requests its load.
    pub fn navigate(&mut self, location: ViewerLocation) -> Vec<Effect> {
        self.slot.navigate(location.clone());
        self.session = Some(WorkflowSession::with_sequencer(self.backend.clone(), location.clone(), self.sequencer.clone()));
        self.state_form = None;
        self.forms.clear();
        self.selected_form = 0;
        vec![Effect::RememberWorkflow(location.id().to_string()), Effect::LoadRequested]
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.is_busy() {
                    self.throbber_idx = (self.throbber_idx + 1) % 10;
                }
                Vec::new()
            }
            Msg::Resize(_, _) => Vec::new(),
            Msg::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Msg::Reload => {
                if self.session.is_none() {
                    self.log(LogEntry::warn("Nothing to reload: no workflow selected."));
                    return Vec::new();
                }
                vec![Effect::LoadRequested]
            }
            Msg::NewWorkflow => vec![Effect::CreateRequested],
            Msg::CopyState => self.copy_state(),
            Msg::SaveDiagram => self.save_diagram(),
            Msg::NextForm => {
                if !self.forms.is_empty() {
                    self.selected_form = (self.selected_form + 1) % self.forms.len();
                }
                Vec::new()
            }
            Msg::PreviousForm => {
                if !self.forms.is_empty() {
                    self.selected_form = (self.selected_form + self.forms.len() - 1) % self.forms.len();
                }
                Vec::new()
            }
            Msg::NextField => self.edit(FormState::select_next),
            Msg::PreviousField => self.edit(FormState::select_previous),
            Msg::Input(ch) => self.edit(|form| form.insert_char(ch)),
            Msg::Backspace => self.edit(FormState::backspace),
            Msg::Toggle => self.edit(FormState::toggle),
            Msg::CycleLeft => self.edit(FormState::move_left),
            Msg::CycleRight => self.edit(FormState::move_right),
            Msg::Submit => self.submit_selected(),
            Msg::ExecCompleted(outcome) => self.apply_outcome(*outcome),
        }
    }

    fn edit(&mut self, apply: impl FnOnce(&mut FormState)) -> Vec<Effect> {
        if let Some(form) = self.selected_form_mut() {
            apply(form);
        }
        Vec::new()
    }

    fn submit_selected(&mut self) -> Vec<Effect> {
        let Some(form) = self.selected_form() else {
            return Vec::new();
        };
        let handler = form.handler.clone();
        match form.state.to_json() {
            Ok(data) => vec![Effect::SubmitRequested {
                instance_id: self.snapshot().map(|snapshot| snapshot.submit_id().to_string()),
                handler,
                data,
            }],
            Err(FormError::MissingRequired(fields)) => {
                self.log(LogEntry::warn(format!("{handler}: fill in required fields: {}", fields.join(", "))));
                Vec::new()
            }
            Err(error) => {
                self.log(LogEntry::warn(format!("{handler}: {error}")));
                Vec::new()
            }
        }
    }

    fn copy_state(&mut self) -> Vec<Effect> {
        let Some(snapshot) = self.snapshot() else {
            self.log(LogEntry::warn("Nothing to copy: no workflow loaded."));
            return Vec::new();
        };
        match serde_json::to_string_pretty(&snapshot.instance().state) {
            Ok(text) => vec![Effect::CopyToClipboard(text)],
            Err(error) => {
                self.log(LogEntry::error(format!("Could not serialize state: {error}")));
                Vec::new()
            }
        }
    }

    fn save_diagram(&mut self) -> Vec<Effect> {
        let Some(snapshot) = self.snapshot() else {
            self.log(LogEntry::warn("No workflow loaded."));
            return Vec::new();
        };
        match snapshot.diagram() {
            Some(markup) => vec![Effect::SaveDiagram {
                path: PathBuf::from(format!("{}.svg", sanitize_file_stem(snapshot.location().id()))),
                markup: markup.to_string(),
            }],
            None => {
                self.log(LogEntry::warn("The diagram could not be fetched for this workflow."));
                Vec::new()
            }
        }
    }

    fn apply_outcome(&mut self, outcome: ExecOutcome) -> Vec<Effect> {
        match outcome {
            ExecOutcome::Loaded(report) => {
                self.apply_load(report);
                Vec::new()
            }
            ExecOutcome::Submitted { handler, report } => match report {
                SubmitReport::Accepted { reload } => {
                    self.log(LogEntry::info(format!("{handler}: accepted")));
                    self.apply_load(reload);
                    Vec::new()
                }
                SubmitReport::Rejected { status, body } => {
                    self.log(LogEntry::warn(format!("{handler}: rejected with HTTP {status}")));
                    if !body.trim().is_empty() {
                        self.log(LogEntry::api(status, body));
                    }
                    Vec::new()
                }
                SubmitReport::Failed { error } => {
                    self.log(LogEntry::error(format!("{handler}: {}", single_line(&error))));
                    Vec::new()
                }
            },
            ExecOutcome::Created(outcome) => {
                match (&outcome.error, outcome.status) {
                    (Some(error), _) => self.log(LogEntry::error(format!("Create request failed: {}", single_line(error)))),
                    (None, Some(status)) if !outcome.is_success() => {
                        self.log(LogEntry::warn(format!("Create request returned HTTP {status}")))
                    }
                    _ => self.log(LogEntry::info(format!("Created workflow {}", outcome.location.id()))),
                }
                self.navigate(outcome.location)
            }
            ExecOutcome::Log(entry) => {
                self.log(entry);
                Vec::new()
            }
        }
    }

    fn apply_load(&mut self, report: LoadReport) {
        for error in &report.errors {
            self.log(LogEntry::warn(single_line(error)));
        }
        let loaded = report.snapshot.is_some();
        if !self.slot.accept(report) {
            if loaded {
                tracing::debug!("ignored a superseded load");
            }
            return;
        }
        let Some(snapshot) = self.slot.current().cloned() else {
            return;
        };
        self.state_form = Some(state_form(&snapshot));
        self.forms = handler_forms(&snapshot);
        if self.selected_form >= self.forms.len() {
            self.selected_form = 0;
        }
        self.log(LogEntry::info(format!(
            "Loaded {} #{} ({} waiting)",
            snapshot.workflow_name(),
            snapshot.location().id(),
            self.forms.len()
        )));
    }
}

/// Keeps ids usable as file names.
fn sanitize_file_stem(id: &str) -> String {
    id.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}
