//! Error dialog component

use super::base::{render_dialog, DialogConfig};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

/// Render an error dialog overlay; `queued` counts errors waiting behind this one
pub fn render_error_dialog(frame: &mut Frame, error_message: &str, queued: usize) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let hint = vec![
        Span::raw("Press "),
        Span::styled("Enter", key),
        Span::raw(" or "),
        Span::styled("Esc", key),
        Span::raw(if queued > 0 { " for the next" } else { " to dismiss" }),
    ];

    let title = match queued {
        0 => "Error".to_string(),
        n => format!("Error (+{n} more)"),
    };

    render_dialog(
        frame,
        DialogConfig {
            title: &title,
            title_color: Color::Red,
            border_color: Color::Red,
            message: error_message,
            hint: Some(hint),
            max_width: 60,
        },
    );
}
