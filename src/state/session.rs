//! Editing session for one tool: focus, raw drafts and row actions

use std::collections::HashMap;
use std::time::Instant;

use super::forms::{FieldKind, FieldPath, FieldValue, Form, FormError, FormState, RowId};
use crate::storage::{Storage, StorageError};
use crate::tools::ToolId;

/// Something the cursor can rest on inside a tool form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    Field(FieldPath),
    /// Pseudo-field that appends a row to the named rows field
    AddRow(&'static str),
}

/// A tool's form plus the text the user is typing into it.
///
/// Drafts keep the exact keystrokes (including input the field rejected) so
/// the user can see and fix what they typed; the form only ever holds
/// parsed values.
#[derive(Debug)]
pub struct ToolSession {
    tool: ToolId,
    form: FormState,
    focus: usize,
    drafts: HashMap<FieldPath, String>,
}

impl ToolSession {
    pub fn new(tool: ToolId, form: FormState) -> Self {
        Self {
            tool,
            form,
            focus: 0,
            drafts: HashMap::new(),
        }
    }

    pub fn tool(&self) -> ToolId {
        self.tool
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    /// Load saved data, discarding any drafts
    pub fn initialize(&mut self, storage: &dyn Storage) -> Result<(), StorageError> {
        self.drafts.clear();
        self.focus = 0;
        self.form.initialize(storage)
    }

    /// Focus targets in display order
    pub fn targets(&self) -> Vec<FocusTarget> {
        let mut targets = Vec::new();
        for spec in self.form.specs() {
            match (spec.row_fields(), self.form.record().rows(spec.key)) {
                (Some(fields), Some(rows)) => {
                    for row in rows.iter() {
                        targets.extend(fields.iter().map(|f| {
                            FocusTarget::Field(FieldPath::row(spec.key, row.id, f.key))
                        }));
                    }
                    targets.push(FocusTarget::AddRow(spec.key));
                }
                _ => targets.push(FocusTarget::Field(FieldPath::field(spec.key))),
            }
        }
        targets
    }

    pub fn focused(&self) -> Option<FocusTarget> {
        self.targets().into_iter().nth(self.focus)
    }

    fn focused_path(&self) -> Option<FieldPath> {
        match self.focused()? {
            FocusTarget::Field(path) => Some(path),
            FocusTarget::AddRow(_) => None,
        }
    }

    /// Text shown for a field: the draft if one exists, else the value
    pub fn display_text(&self, path: &FieldPath) -> String {
        match self.drafts.get(path) {
            Some(draft) => draft.clone(),
            None => self
                .form
                .value_at(path)
                .map(FieldValue::to_raw)
                .unwrap_or_default(),
        }
    }

    /// Whether the focused field takes free text
    pub fn is_typing_target(&self) -> bool {
        self.focused_path()
            .and_then(|path| self.form.spec_at(&path))
            .is_some_and(|spec| {
                !matches!(
                    spec.kind,
                    FieldKind::Choice { .. } | FieldKind::Flag | FieldKind::Rows { .. }
                )
            })
    }

    pub fn input_char(&mut self, c: char, now: Instant) -> Result<(), FormError> {
        if !self.is_typing_target() {
            return Ok(());
        }
        self.edit_draft(now, |draft| draft.push(c))
    }

    pub fn backspace(&mut self, now: Instant) -> Result<(), FormError> {
        if !self.is_typing_target() {
            return Ok(());
        }
        self.edit_draft(now, |draft| {
            draft.pop();
        })
    }

    /// Enter: newline in multiline fields, add a row on the add-row target,
    /// otherwise move to the next field
    pub fn activate(&mut self, now: Instant) -> Result<Option<RowId>, FormError> {
        match self.focused() {
            Some(FocusTarget::AddRow(rows)) => self.form.add_row(rows, now).map(Some),
            Some(FocusTarget::Field(path))
                if self.form.spec_at(&path).is_some_and(|s| s.is_multiline()) =>
            {
                self.edit_draft(now, |draft| draft.push('\n'))?;
                Ok(None)
            }
            _ => {
                self.next_field();
                Ok(None)
            }
        }
    }

    /// Step a choice field through its options or flip a flag
    pub fn cycle(&mut self, forward: bool, now: Instant) -> Result<(), FormError> {
        let Some(path) = self.focused_path() else {
            return Ok(());
        };
        let Some(spec) = self.form.spec_at(&path) else {
            return Ok(());
        };
        let current = self.form.value_at(&path);
        let next = match &spec.kind {
            FieldKind::Choice { options } if !options.is_empty() => {
                let index = current
                    .and_then(FieldValue::as_text)
                    .and_then(|c| options.iter().position(|o| *o == c));
                let len = options.len();
                let next = match (index, forward) {
                    (None, _) => 0,
                    (Some(i), true) => (i + 1) % len,
                    (Some(i), false) => (i + len - 1) % len,
                };
                FieldValue::Choice(options[next].to_string())
            }
            FieldKind::Flag => {
                FieldValue::Flag(!current.and_then(FieldValue::as_flag).unwrap_or(false))
            }
            _ => return Ok(()),
        };
        self.set_value(&path, next, now)
    }

    /// Set a typed value, replacing whatever draft the field had
    pub fn set_value(
        &mut self,
        path: &FieldPath,
        value: FieldValue,
        now: Instant,
    ) -> Result<(), FormError> {
        self.form.set_value(path, value, now)?;
        self.drafts.remove(path);
        Ok(())
    }

    /// Remove the row holding the focused field
    pub fn remove_focused_row(&mut self, now: Instant) -> Result<bool, FormError> {
        let Some(FieldPath::RowField { rows, id, .. }) = self.focused_path() else {
            return Ok(false);
        };
        self.form.remove_row(&rows, id, now)?;
        self.drafts.retain(|path, _| {
            !matches!(path, FieldPath::RowField { rows: r, id: i, .. } if *r == rows && *i == id)
        });
        self.clamp_focus();
        Ok(true)
    }

    /// Reset the form and forget drafts
    pub fn reset(&mut self, storage: &dyn Storage) -> Result<(), StorageError> {
        self.drafts.clear();
        self.focus = 0;
        self.form.reset(storage)
    }

    fn edit_draft(
        &mut self,
        now: Instant,
        edit: impl FnOnce(&mut String),
    ) -> Result<(), FormError> {
        let Some(path) = self.focused_path() else {
            return Ok(());
        };
        let mut draft = self.display_text(&path);
        edit(&mut draft);
        let result = self.form.update(&path, &draft, now);
        self.drafts.insert(path, draft);
        result
    }

    fn clamp_focus(&mut self) {
        let count = self.field_count();
        if self.focus >= count {
            self.focus = count.saturating_sub(1);
        }
    }
}

impl Form for ToolSession {
    fn field_count(&self) -> usize {
        self.targets().len()
    }

    fn active_field(&self) -> usize {
        self.focus
    }

    fn set_active_field(&mut self, index: usize) {
        self.focus = index;
    }
}
