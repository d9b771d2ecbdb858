//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;
mod result;
mod widgets;

use crate::app::{App, Focus};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Draw the main layout with sidebar
    let (sidebar_area, main_area) = layout::create_layout(area);

    // Draw sidebar
    layout::draw_sidebar(frame, sidebar_area, app);

    // Draw the selected tool: inputs on the left, result on the right
    let session = app.current();
    let has_focus = app.focus == Focus::Form;
    let block = Block::default()
        .title(format!(" {} ", session.tool().label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if has_focus {
            Color::Cyan
        } else {
            Color::DarkGray
        }));
    let inner = block.inner(main_area);
    frame.render_widget(block, main_area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);
    forms::draw_form(frame, panes[0], session, has_focus);
    result::draw_result(frame, panes[1], session);

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Errors are modal and drawn last
    if let Some(error) = app.notices.current_error() {
        components::render_error_dialog(frame, error, app.notices.queued_errors());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockClipboardService;
    use crate::state::{Notifier, Severity};
    use crate::storage::MemoryStorage;
    use crate::tools::{ToolId, ToolSettings};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        App::with_services(
            &ToolSettings::default(),
            ToolId::Attendance,
            Box::new(MemoryStorage::new()),
            Arc::new(MockClipboardService::new()),
            std::env::temp_dir(),
        )
        .unwrap()
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_draws_tool_and_result_panels() {
        let screen = render(&app(), 120, 40);
        assert!(screen.contains("Total Classes"));
        assert!(screen.contains("Result"));
        assert!(screen.contains("Word Counter"));
        assert!(screen.contains("^C^C:quit"));
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        render(&app(), 30, 8);
        render(&app(), 1, 1);
    }

    #[test]
    fn test_error_dialog_overlays() {
        let mut app = app();
        app.notices
            .notify("Could not save data".to_string(), Severity::Error);
        let screen = render(&app, 100, 30);
        assert!(screen.contains("Could not save data"));
        assert!(screen.contains("to dismiss"));
    }
}
