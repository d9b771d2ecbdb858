//! Field rendering utilities for forms

use crate::state::FieldKind;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows taken by a multiline field, borders included
const MULTILINE_HEIGHT: u16 = 6;

/// Everything needed to draw one field box
pub struct FieldView<'a> {
    pub label: String,
    /// Draft or stored value as raw text
    pub value: String,
    pub kind: &'a FieldKind,
    pub is_active: bool,
    pub error: Option<String>,
}

pub fn field_height(kind: &FieldKind) -> u16 {
    match kind {
        FieldKind::Text { multiline: true } => MULTILINE_HEIGHT,
        _ => 3,
    }
}

/// Placeholder for empty fields with a fixed input format
fn placeholder(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Date => "YYYY-MM-DD",
        FieldKind::Time => "HH:MM",
        _ => "(empty)",
    }
}

/// Draw a form field; the value is shown the way its kind is edited
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FieldView) {
    let accent = match (&field.error, field.is_active) {
        (Some(_), _) => Color::Red,
        (None, true) => Color::Cyan,
        (None, false) => Color::DarkGray,
    };
    let value_style = if field.is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = Span::styled("▌", Style::default().fg(Color::Cyan));

    let content = match field.kind {
        FieldKind::Flag => {
            let mark = if field.value == "true" { "[x]" } else { "[ ]" };
            Paragraph::new(Span::styled(mark, value_style))
        }
        FieldKind::Choice { .. } if field.is_active => Paragraph::new(Line::from(vec![
            Span::styled("◀ ", Style::default().fg(Color::Cyan)),
            Span::styled(field.value.clone(), value_style.add_modifier(Modifier::BOLD)),
            Span::styled(" ▶", Style::default().fg(Color::Cyan)),
        ])),
        FieldKind::Choice { .. } => Paragraph::new(Span::styled(field.value.clone(), value_style)),
        FieldKind::Text { multiline: true } => {
            let mut lines: Vec<Line> = field
                .value
                .split('\n')
                .map(|l| Line::from(Span::styled(l.to_string(), value_style)))
                .collect();
            if field.is_active {
                if let Some(last) = lines.last_mut() {
                    last.spans.push(cursor);
                }
            }
            Paragraph::new(lines)
        }
        _ if field.value.is_empty() && !field.is_active => Paragraph::new(Span::styled(
            placeholder(field.kind),
            Style::default().fg(Color::DarkGray),
        )),
        _ => {
            let mut spans = vec![Span::styled(field.value.clone(), value_style)];
            if field.is_active {
                spans.push(cursor);
            }
            Paragraph::new(Line::from(spans))
        }
    };

    let mut block = Block::default()
        .title(format!(" {} ", field.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    if let Some(error) = &field.error {
        block = block.title_bottom(Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

/// Draw the pseudo-field that appends a row
pub fn draw_add_row(frame: &mut Frame, area: Rect, label: &str, is_active: bool) {
    let style = if is_active {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text = if is_active {
        format!(" + Add {label}  (Enter)")
    } else {
        format!(" + Add {label}")
    };
    frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
}
