//! Form panel: one bordered box per field, scrolled to keep focus visible

mod field_renderer;

pub use field_renderer::{draw_add_row, draw_field, field_height, FieldView};

use crate::state::{FieldKind, FieldPath, FocusTarget, Form, Outcome, ToolSession};
use ratatui::{layout::Rect, Frame};

/// Height of the add-row line
const ADD_ROW_HEIGHT: u16 = 1;

enum Item<'a> {
    Field {
        path: FieldPath,
        label: String,
        kind: &'a FieldKind,
    },
    AddRow(&'a str),
}

impl Item<'_> {
    fn height(&self) -> u16 {
        match self {
            Item::Field { kind, .. } => field_height(kind),
            Item::AddRow(_) => ADD_ROW_HEIGHT,
        }
    }
}

fn items(session: &ToolSession) -> Vec<Item<'_>> {
    let form = session.form();
    session
        .targets()
        .into_iter()
        .filter_map(|target| match target {
            FocusTarget::Field(path) => {
                let spec = form.spec_at(&path)?;
                let label = match &path {
                    FieldPath::Field(_) => spec.label.to_string(),
                    FieldPath::RowField { rows, id, .. } => {
                        let parent = form.specs().iter().find(|s| s.key == rows.as_str())?;
                        let number = form
                            .record()
                            .rows(rows)
                            .and_then(|r| r.position(*id))
                            .map_or(0, |i| i + 1);
                        format!("{} {number}: {}", parent.label, spec.label)
                    }
                };
                Some(Item::Field {
                    path,
                    label,
                    kind: &spec.kind,
                })
            }
            FocusTarget::AddRow(rows) => {
                let parent = form.specs().iter().find(|s| s.key == rows)?;
                Some(Item::AddRow(parent.label))
            }
        })
        .collect()
}

/// First item to draw so the active one fits in `height`
fn scroll_start(heights: &[u16], active: usize, height: u16) -> usize {
    let Some(last) = heights.len().checked_sub(1) else {
        return 0;
    };
    let active = active.min(last);
    let mut start = 0;
    while start < active && heights[start..=active].iter().sum::<u16>() > height {
        start += 1;
    }
    start
}

pub fn draw_form(frame: &mut Frame, area: Rect, session: &ToolSession, has_focus: bool) {
    let form = session.form();
    let items = items(session);
    let heights: Vec<u16> = items.iter().map(Item::height).collect();
    let active = session.active_field();
    let invalid = match form.last_outcome() {
        Outcome::Invalid(err) => Some(err),
        _ => None,
    };

    let mut y = area.y;
    let bottom = area.y + area.height;
    for (index, item) in items.iter().enumerate().skip(scroll_start(&heights, active, area.height)) {
        let height = heights[index].min(bottom.saturating_sub(y));
        if height == 0 {
            break;
        }
        let rect = Rect {
            x: area.x,
            y,
            width: area.width,
            height,
        };
        let is_active = has_focus && index == active;

        match item {
            Item::Field { path, label, kind } => {
                let error = form.field_error(path).map(ToString::to_string).or_else(|| {
                    invalid
                        .filter(|err| err.field == path.to_string())
                        .map(|err| err.reason.clone())
                });
                let view = FieldView {
                    label: label.clone(),
                    value: session.display_text(path),
                    kind,
                    is_active,
                    error,
                };
                draw_field(frame, rect, &view);
            }
            Item::AddRow(label) => draw_add_row(frame, rect, label, is_active),
        }
        y += height;
    }
}
