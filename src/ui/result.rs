//! Result panel for the selected tool

use crate::state::{Derived, FormState, Outcome, ToolSession};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_result(frame: &mut Frame, area: Rect, session: &ToolSession) {
    let form = session.form();
    let mut title = vec![Span::raw(" Result ")];
    if form.is_recompute_pending() {
        title.push(Span::styled("… ", Style::default().fg(Color::DarkGray)));
    } else if form.is_live() {
        title.push(Span::styled("● live ", Style::default().fg(Color::Green)));
    }

    let lines = result_lines(form);

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

/// Result text: the outcome, plus the last good result under an error
fn result_lines(form: &FormState) -> Vec<Line<'_>> {
    match form.last_outcome() {
        Outcome::NotReady => vec![Line::from(Span::styled(
            "Fill in the required fields to see the result.",
            Style::default().fg(Color::DarkGray),
        ))],
        Outcome::Invalid(err) => {
            let mut lines = vec![Line::from(Span::styled(
                err.reason.clone(),
                Style::default().fg(Color::Red),
            ))];
            if let Some(previous) = form.last_good() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Last result:",
                    Style::default().fg(Color::DarkGray),
                )));
                lines.extend(derived_lines(previous));
            }
            lines
        }
        Outcome::Ready(derived) => derived_lines(derived),
    }
}

fn derived_lines(derived: &Derived) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    if let Some((label, value)) = derived.headline_pair() {
        let color = if derived.is_finished() {
            Color::Green
        } else {
            Color::Cyan
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    for (label, value) in derived.entries() {
        if value.contains('\n') {
            lines.push(Line::from(Span::styled(
                label,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.extend(value.lines().map(Line::from));
        } else {
            lines.push(Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ]));
        }
    }
    lines
}
