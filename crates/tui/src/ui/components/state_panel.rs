//! Read-only view of the workflow state, laid out by the state schema.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::Component;
use super::form_view::form_lines;
use crate::app::App;
use crate::theme;

#[derive(Debug, Default)]
pub struct StatePanelComponent;

impl Component for StatePanelComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let mut title = vec![Span::styled(" State ", theme::title_style())];
        if let Some(snapshot) = app.snapshot() {
            let pending = snapshot.instance().pending_events();
            if !pending.is_empty() {
                title.push(Span::styled(format!("pending: {} ", pending.join(", ")), theme::text_muted()));
            }
        }
        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(theme::border_style(false));
        let inner = block.inner(rect);

        let lines = match &app.state_form {
            Some(form) if !form.is_empty() => form_lines(form, false, inner.width, true),
            Some(_) => vec![Line::from(Span::styled("The state is empty.", theme::text_muted()))],
            None => Vec::new(),
        };
        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }
}
