use flowdeck_util::{single_line, truncate_for_summary};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem};

use super::state::{LogEntry, LogLine};
use crate::app::App;
use crate::theme;
use crate::ui::components::Component;

/// Tail of the log, newest entry last.
#[derive(Debug, Default)]
pub struct LogsComponent;

impl Component for LogsComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let block = Block::default()
            .title(Span::styled(format!(" Logs ({}) ", app.logs.lines().len()), theme::title_style()))
            .borders(Borders::ALL)
            .border_style(theme::border_style(false));
        let visible = usize::from(block.inner(rect).height);
        let width = usize::from(rect.width.saturating_sub(2));

        let lines = app.logs.lines();
        let items: Vec<ListItem> = lines[lines.len().saturating_sub(visible)..]
            .iter()
            .map(|line| ListItem::new(render_line(line, width)))
            .collect();
        frame.render_widget(List::new(items).block(block), rect);
    }
}

fn render_line(line: &LogLine, width: usize) -> Line<'static> {
    let level = line.entry.level();
    let time = line.at.format("%H:%M:%S").to_string();
    let message = match &line.entry {
        LogEntry::Text { msg, .. } => single_line(msg),
        LogEntry::Api { status, raw, .. } => format!("HTTP {status}: {}", single_line(raw)),
    };
    let budget = width.saturating_sub(time.len() + 8);
    Line::from(vec![
        Span::styled(format!("{time} "), theme::text_muted()),
        Span::styled(format!("{:<5} ", level.as_str()), theme::level_style(level)),
        Span::styled(truncate_for_summary(&message, budget), theme::text_style()),
    ])
}
