//! Title strip with the current instance and a busy indicator.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::Component;
use crate::app::App;
use crate::theme;

const THROBBER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Default)]
pub struct HeaderComponent;

impl Component for HeaderComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let mut spans = vec![Span::styled(" Flowdeck ", theme::key_style())];
        match (app.snapshot(), app.location()) {
            (Some(snapshot), _) => {
                spans.push(Span::styled(snapshot.workflow_name().to_string(), theme::text_style()));
                spans.push(Span::styled(format!("  {}", snapshot.location()), theme::text_muted()));
            }
            (None, Some(location)) => spans.push(Span::styled(location.to_string(), theme::text_muted())),
            (None, None) => spans.push(Span::styled("no workflow", theme::text_muted())),
        }
        if app.is_busy() {
            spans.push(Span::styled(format!("  {}", THROBBER_FRAMES[app.throbber_idx % THROBBER_FRAMES.len()]), theme::key_style()));
        }

        let key_hints = Line::from(vec![
            Span::styled(" Ctrl+N", theme::key_style()),
            Span::styled(" new workflow  ", theme::text_muted()),
            Span::styled("Ctrl+R", theme::key_style()),
            Span::styled(" reload", theme::text_muted()),
        ]);
        frame.render_widget(Paragraph::new(vec![Line::from(spans), key_hints]), rect);
    }
}
