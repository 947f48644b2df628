use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::Block;

use super::components::{Component, HandlersComponent, HeaderComponent, HintBarComponent, LogsComponent, StatePanelComponent};
use crate::app::{App, Effect, Msg};
use crate::theme;

/// Root view: owns every panel and routes keys between global shortcuts and
/// the handler forms.
#[derive(Debug, Default)]
pub struct MainView {
    header: HeaderComponent,
    state_panel: StatePanelComponent,
    handlers: HandlersComponent,
    logs: LogsComponent,
    hint_bar: HintBarComponent,
}

impl MainView {
    pub fn new() -> Self {
        Self::default()
    }

    fn global_message(key: &KeyEvent) -> Option<Msg> {
        if key.code == KeyCode::Esc {
            return Some(Msg::Quit);
        }
        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        match key.code {
            KeyCode::Char('n') => Some(Msg::NewWorkflow),
            KeyCode::Char('r') => Some(Msg::Reload),
            KeyCode::Char('y') => Some(Msg::CopyState),
            KeyCode::Char('d') => Some(Msg::SaveDiagram),
            _ => None,
        }
    }
}

impl Component for MainView {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match Self::global_message(&key) {
            Some(msg) => self.handle_message(app, msg),
            None => self.handlers.handle_key_events(app, key),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        frame.render_widget(Block::default().style(Style::default().bg(theme::BG_PANEL)), rect);

        let [header, body, logs, hints] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .areas(rect);
        let [state, handlers] = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(body);

        self.header.render(frame, header, app);
        self.state_panel.render(frame, state, app);
        self.handlers.render(frame, handlers, app);
        self.logs.render(frame, logs, app);
        self.hint_bar.render(frame, hints, app);
    }
}
