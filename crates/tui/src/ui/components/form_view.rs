//! Rendering of a [`FormState`] as aligned label/value rows.

use flowdeck_engine::FormState;
use flowdeck_engine::forms::{FieldKind, FieldValue};
use ratatui::prelude::*;
use unicode_width::UnicodeWidthStr;

use crate::theme;

/// Display width of the label column, including the required marker.
pub fn label_width(form: &FormState) -> usize {
    form.fields()
        .iter()
        .map(|field| field.label.width() + usize::from(field.required))
        .max()
        .unwrap_or(0)
}

/// One row per field. Long values wrap to `width` when `wrap` is set;
/// otherwise rows stay single-line so the cursor row equals the field index.
pub fn form_lines(form: &FormState, focused: bool, width: u16, wrap: bool) -> Vec<Line<'static>> {
    let label_column = label_width(form);
    let value_width = usize::from(width).saturating_sub(label_column + 2).max(8);
    let mut lines = Vec::with_capacity(form.fields().len());

    for (index, field) in form.fields().iter().enumerate() {
        let selected = focused && index == form.selected();
        let marker = if field.required { "*" } else { "" };
        let label = format!("{}{marker}", field.label);
        let padding = " ".repeat(label_column.saturating_sub(label.width()));
        let row_style = if selected { theme::highlight_style() } else { theme::text_style() };

        let value = render_value(form, index, field.kind);
        let (value, value_style) = if value.is_empty() {
            (format!("<{}>", field.kind.label()), theme::text_muted())
        } else {
            (value, row_style)
        };

        let chunks: Vec<String> = if wrap {
            textwrap::wrap(&value, value_width).into_iter().map(|chunk| chunk.into_owned()).collect()
        } else {
            vec![value]
        };
        for (position, chunk) in chunks.into_iter().enumerate() {
            let prefix = if position == 0 {
                Span::styled(format!("{label}{padding}: "), theme::title_style())
            } else {
                Span::raw(" ".repeat(label_column + 2))
            };
            lines.push(Line::from(vec![prefix, Span::styled(chunk, value_style)]).style(row_style));
        }
    }
    lines
}

/// Description of the selected field, if it has one.
pub fn selected_description(form: &FormState) -> Option<Line<'static>> {
    let description = form.selected_field()?.description.clone()?;
    Some(Line::from(Span::styled(description, theme::text_muted())))
}

fn render_value(form: &FormState, index: usize, kind: FieldKind) -> String {
    match (kind, form.value(index)) {
        (_, Some(FieldValue::Boolean(flag))) => (if *flag { "[x]" } else { "[ ]" }).to_string(),
        (FieldKind::Choice, Some(FieldValue::Choice(_))) if !form.is_read_only() => {
            let current = form.display_value(index);
            if current.is_empty() { String::new() } else { format!("< {current} >") }
        }
        _ => form.display_value(index),
    }
}
