//! Runtime: event loop and input routing for the viewer.
//!
//! - Owns the terminal lifecycle (alternate screen, raw mode) and restores it
//!   even when the loop fails.
//! - A dedicated input thread blocks on `crossterm::event::read()` and
//!   forwards events over a channel.
//! - Ticks fast (100 ms) only while backend calls are in flight, otherwise
//!   every 5 s.
//! - Effects returned by components are handed to `cmd::run_from_effects`;
//!   spawned work joins back through a `FuturesUnordered`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use flowdeck_api::WorkflowBackend;
use flowdeck_types::ViewerLocation;
use flowdeck_util::UserPreferences;
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

use crate::app::{App, Effect, ExecOutcome, Msg};
use crate::cmd;
use crate::log_persistence::PersistentLogWorker;
use crate::ui::components::Component;
use crate::ui::components::logs::state::{LogEntry, LogsState};
use crate::ui::main_component::MainView;

type Tui = Terminal<CrosstermBackend<std::io::Stdout>>;

/// Spawn a blocking OS thread that reads terminal input and forwards it.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    let spawned = std::thread::Builder::new()
        .name("flowdeck-tui-input".to_string())
        .spawn(move || {
            loop {
                match event::read() {
                    Ok(event) => {
                        if sender.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::warn!("Failed to read terminal event: {}", error);
                        break;
                    }
                }
            }
        });
    if let Err(error) = spawned {
        tracing::error!("Failed to spawn input thread: {}", error);
    }
    receiver
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn cleanup_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Tui, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => main_view.handle_key_events(app, key_event),
        Event::Resize(width, height) => main_view.handle_message(app, Msg::Resize(width, height)),
        _ => Vec::new(),
    }
}

/// Runs effects to completion: immediate outcomes are fed back as messages
/// until no new effects are produced, spawned work joins `pending`.
fn process_effects(app: &mut App, main_view: &mut MainView, mut effects: Vec<Effect>, pending: &mut FuturesUnordered<JoinHandle<ExecOutcome>>) {
    while !effects.is_empty() {
        let batch = cmd::run_from_effects(app, std::mem::take(&mut effects));
        if !batch.pending.is_empty() && pending.is_empty() {
            app.throbber_idx = 0;
        }
        pending.extend(batch.pending);
        app.in_flight = pending.len();
        for outcome in batch.immediate {
            effects.extend(main_view.handle_message(app, Msg::ExecCompleted(Box::new(outcome))));
        }
    }
}

fn open_log_worker() -> Option<PersistentLogWorker> {
    match PersistentLogWorker::from_environment() {
        Ok(worker) => Some(worker),
        Err(error) => {
            tracing::warn!("Persistent TUI logs disabled: {:#}", error);
            None
        }
    }
}

/// Entry point for the viewer runtime: sets up the terminal, runs the event
/// loop, and restores the terminal on exit.
pub async fn run_app(backend: Arc<dyn WorkflowBackend>, location: Option<ViewerLocation>, preferences: Arc<UserPreferences>) -> Result<()> {
    let logs = LogsState::with_persistence(open_log_worker());
    let mut app = App::new(backend, location, preferences, logs);
    let mut main_view = MainView::new();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &mut main_view).await;
    let cleanup = cleanup_terminal(&mut terminal);
    result.and(cleanup)
}

async fn event_loop(terminal: &mut Tui, app: &mut App, main_view: &mut MainView) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut pending: FuturesUnordered<JoinHandle<ExecOutcome>> = FuturesUnordered::new();

    let startup = app.startup_effects();
    process_effects(app, main_view, startup, &mut pending);

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(terminal, app, main_view)?;

    loop {
        let target_interval = if app.is_busy() { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut effects = Vec::new();
        let mut needs_render = false;
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                if let Event::Key(key_event) = event
                    && key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }
                effects.extend(handle_input_event(app, main_view, event));
                needs_render = true;
            }

            _ = ticker.tick() => {
                needs_render = app.is_busy();
                effects.extend(main_view.handle_message(app, Msg::Tick));
            }

            Some(joined) = pending.next(), if !pending.is_empty() => {
                let outcome = joined.unwrap_or_else(|error| ExecOutcome::Log(LogEntry::error(format!("Background task failed: {error}"))));
                app.in_flight = pending.len();
                effects.extend(main_view.handle_message(app, Msg::ExecCompleted(Box::new(outcome))));
                needs_render = true;
            }

            _ = signal::ctrl_c() => { break; }
        }

        if !effects.is_empty() {
            process_effects(app, main_view, effects, &mut pending);
            needs_render = true;
        }
        if app.should_quit {
            break;
        }
        if needs_render {
            render(terminal, app, main_view)?;
        }
    }

    for handle in pending.iter() {
        handle.abort();
    }
    Ok(())
}
