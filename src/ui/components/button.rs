//! Button component for TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a bordered button; `is_active` marks the pane that owns the keyboard
pub fn render_button(frame: &mut Frame, area: Rect, content: Line, is_selected: bool, is_active: bool) {
    let accent = if is_active { Color::Cyan } else { Color::Blue };
    let border_style = if is_selected {
        Style::default().fg(accent)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text_style = if is_selected {
        Style::default().fg(accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(content).style(text_style).block(block), area);
}

/// Render a sidebar button with its number key and label
pub fn render_sidebar_button(
    frame: &mut Frame,
    area: Rect,
    key: usize,
    label: &str,
    is_selected: bool,
    is_active: bool,
) {
    let content = Line::from(vec![
        Span::styled(format!(" {key} "), Style::default().fg(Color::DarkGray)),
        Span::raw(label.to_string()),
    ]);
    render_button(frame, area, content, is_selected, is_active);
}
