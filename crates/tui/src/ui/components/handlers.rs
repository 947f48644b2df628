//! One editable form per handler the workflow is waiting on.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use super::Component;
use super::form_view::{form_lines, label_width, selected_description};
use crate::app::{App, Effect, Msg};
use crate::theme;

#[derive(Debug, Default)]
pub struct HandlersComponent;

impl Component for HandlersComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let msg = match key.code {
            KeyCode::Tab => Msg::NextForm,
            KeyCode::BackTab => Msg::PreviousForm,
            KeyCode::Down => Msg::NextField,
            KeyCode::Up => Msg::PreviousField,
            KeyCode::Left => Msg::CycleLeft,
            KeyCode::Right => Msg::CycleRight,
            KeyCode::Enter => Msg::Submit,
            KeyCode::Backspace => Msg::Backspace,
            KeyCode::Char(' ') if selected_is_boolean(app) => Msg::Toggle,
            KeyCode::Char(ch) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Msg::Input(ch),
            _ => return Vec::new(),
        };
        self.handle_message(app, msg)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let outer = Block::default()
            .title(Span::styled(" Waiting on ", theme::title_style()))
            .borders(Borders::ALL)
            .border_style(theme::border_style(false));

        if app.forms.is_empty() {
            let message = match (app.location(), app.snapshot()) {
                (None, _) => "No workflow selected. Press Ctrl+N to create one.",
                (Some(_), None) if app.is_busy() => "Loading...",
                (Some(_), None) => "Workflow not loaded. Press Ctrl+R to retry.",
                (Some(_), Some(_)) => "The workflow is not waiting on any event.",
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, theme::text_muted())).block(outer).wrap(Wrap { trim: true }),
                rect,
            );
            return;
        }

        let inner = outer.inner(rect);
        frame.render_widget(outer, rect);

        let heights: Vec<Constraint> = app
            .forms
            .iter()
            .enumerate()
            .map(|(index, form)| {
                let description = usize::from(index == app.selected_form && form.state.selected_field().is_some_and(|f| f.description.is_some()));
                let rows = form.state.fields().len().max(1) + description + 1;
                Constraint::Length(u16::try_from(rows + 2).unwrap_or(u16::MAX))
            })
            .chain(std::iter::once(Constraint::Min(0)))
            .collect();
        let areas = Layout::vertical(heights).split(inner);

        for (index, form) in app.forms.iter().enumerate() {
            let Some(area) = areas.get(index).copied() else {
                break;
            };
            if area.height < 3 {
                continue;
            }
            let focused = index == app.selected_form;
            let mut title = vec![Span::styled(format!(" {} ", form.title), theme::title_style())];
            if let Some(role) = &form.role {
                title.push(Span::styled(format!("({role}) "), theme::text_muted()));
            }
            let block = Block::default()
                .title(Line::from(title))
                .borders(Borders::ALL)
                .border_style(theme::border_style(focused));
            let body = block.inner(area);

            let mut lines = if form.state.is_empty() {
                vec![Line::from(Span::styled("No input required.", theme::text_muted()))]
            } else {
                form_lines(&form.state, focused, body.width, false)
            };
            if focused && let Some(description) = selected_description(&form.state) {
                lines.insert(form.state.selected() + 1, description);
            }
            lines.push(submit_line(&form.state.missing_required(), focused));

            frame.render_widget(Paragraph::new(lines).block(block), area);

            if focused && let Some(cursor) = form.state.cursor() {
                let value = form.state.display_value(form.state.selected());
                let prefix = value.get(..cursor).unwrap_or(&value);
                let x = body.x + u16::try_from(label_width(&form.state) + 2 + prefix.width()).unwrap_or(u16::MAX);
                let y = body.y + u16::try_from(form.state.selected()).unwrap_or(u16::MAX);
                if x < body.right() && y < body.bottom() {
                    frame.set_cursor_position((x, y));
                }
            }
        }
    }
}

fn selected_is_boolean(app: &App) -> bool {
    app.selected_form()
        .and_then(|form| form.state.selected_field())
        .is_some_and(|field| field.kind == flowdeck_engine::FieldKind::Boolean)
}

fn submit_line(missing: &[String], focused: bool) -> Line<'static> {
    let key_style = if focused { theme::key_style() } else { theme::text_muted() };
    let mut spans = vec![Span::styled("[Enter] ", key_style), Span::styled("Submit", theme::text_style())];
    if !missing.is_empty() {
        spans.push(Span::styled(format!("  required: {}", missing.join(", ")), Style::default().fg(theme::WARN)));
    }
    Line::from(spans)
}
