//! Single-line strip of key bindings.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::Component;
use crate::app::App;
use crate::theme;

const HINTS: &[(&str, &str)] = &[
    ("Tab", "form"),
    ("↑/↓", "field"),
    ("←/→", "choice"),
    ("Space", "toggle"),
    ("Enter", "submit"),
    ("Ctrl+Y", "copy state"),
    ("Ctrl+D", "save diagram"),
    ("Esc", "quit"),
];

#[derive(Debug, Default)]
pub struct HintBarComponent;

impl Component for HintBarComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, _app: &mut App) {
        let spans: Vec<Span> = HINTS
            .iter()
            .flat_map(|(key, label)| [Span::styled(format!(" {key}"), theme::key_style()), Span::styled(format!(" {label} "), theme::text_muted())])
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), rect);
    }
}
