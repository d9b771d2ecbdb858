//! Layout components (sidebar, status bar)

use super::components::{render_sidebar_button, BUTTON_HEIGHT};
use super::widgets::render_scrollable_list;
use crate::app::{App, Focus};
use crate::platform::{
    COPY_SHORTCUT, EXPORT_SHORTCUT, GENERATE_SHORTCUT, REMOVE_ROW_SHORTCUT, RESET_SHORTCUT,
};
use crate::state::{Severity, ToolSession};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Sidebar width in columns
const SIDEBAR_WIDTH: u16 = 24;

/// Create the main layout with sidebar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    // Reserve bottom line for status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDEBAR_WIDTH), // Sidebar
            Constraint::Min(0),                // Main content
        ])
        .split(rows[0]);

    (chunks[0], chunks[1])
}

/// Draw the tool list: boxed buttons when they fit, a compact list otherwise
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let is_active = app.focus == Focus::Sidebar;
    let sessions = app.sessions();
    let needed = BUTTON_HEIGHT * sessions.len() as u16;

    if area.height < needed {
        let items: Vec<ListItem> = sessions
            .iter()
            .enumerate()
            .map(|(idx, s)| ListItem::new(format!("{} {}", (idx + 1) % 10, s.tool().label())))
            .collect();
        let accent = if is_active { Color::Cyan } else { Color::Blue };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");
        render_scrollable_list(frame, area, list, app.selected_index());
        return;
    }

    let mut constraints = vec![Constraint::Length(BUTTON_HEIGHT); sessions.len()];
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, session) in sessions.iter().enumerate() {
        render_sidebar_button(
            frame,
            chunks[idx],
            (idx + 1) % 10,
            session.tool().label(),
            idx == app.selected_index(),
            is_active,
        );
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", app.current().tool().label()),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    )];

    // Focus-specific hints
    let hints = get_view_hints(app.focus, app.current());
    spans.push(Span::styled(
        format!(" {hints}"),
        Style::default().fg(Color::Gray),
    ));

    if let Some(notice) = app.notices.status() {
        let color = match notice.severity {
            Severity::Success => Color::Green,
            Severity::Info => Color::Yellow,
            Severity::Error => Color::Red,
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notice.message.as_str(), Style::default().fg(color)));
    }

    // Quit hint on the right (double Ctrl+C to quit)
    let quit_hint = " ^C^C:quit ";

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    frame.render_widget(status, status_area);

    // Render quit hint on the right
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the focused pane and tool
fn get_view_hints(focus: Focus, session: &ToolSession) -> String {
    match focus {
        Focus::Sidebar => "j/k:nav  0-9:jump  Enter:open".to_string(),
        Focus::Form => {
            let tool = session.tool();
            let mut hints = vec!["Tab:next".to_string(), "←/→:change".to_string()];
            if tool.generates() {
                hints.push(format!("{GENERATE_SHORTCUT}:generate"));
            }
            hints.push(format!("{COPY_SHORTCUT}:copy"));
            if tool.exports() {
                hints.push(format!("{EXPORT_SHORTCUT}:export"));
            }
            if session.form().specs().iter().any(|s| s.is_rows()) {
                hints.push(format!("{REMOVE_ROW_SHORTCUT}:remove row"));
            }
            hints.push(format!("{RESET_SHORTCUT}:reset"));
            hints.push("Esc:back".to_string());
            hints.join("  ")
        }
    }
}
