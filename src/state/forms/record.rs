//! Record and repeatable row value objects

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use super::field::{FieldKind, FieldSpec, FieldValue};

/// Identifier of a row inside a [`RowSet`].
///
/// Assigned by the set, monotonically increasing and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a repeatable field
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub record: Record,
}

/// Ordered sequence of sub-records sharing one set of field declarations
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    rows: Vec<Row>,
    next_id: u64,
}

impl Default for RowSet {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a set from persisted rows. The id counter never falls behind
    /// an id already in use.
    pub fn restore(rows: Vec<Row>, next_id: u64) -> Self {
        let floor = rows.iter().map(|r| r.id.0 + 1).max().unwrap_or(1);
        Self {
            rows,
            next_id: next_id.max(floor),
        }
    }

    /// Append a row and return its freshly assigned id
    pub fn push(&mut self, record: Record) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(Row { id, record });
        id
    }

    /// Remove the row with `id`, wherever it currently sits
    pub fn remove(&mut self, id: RowId) -> Option<Row> {
        let index = self.rows.iter().position(|r| r.id == id)?;
        Some(self.rows.remove(index))
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    /// Position of a row, for display numbering
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}

/// Current values of all fields of one form, in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    entries: Vec<(String, FieldValue)>,
}

impl Record {
    /// Record holding every field's declared default
    pub fn from_specs(specs: &[FieldSpec]) -> Self {
        let entries = specs
            .iter()
            .map(|spec| {
                let value = match &spec.kind {
                    FieldKind::Rows { fields, initial } => {
                        let mut rows = RowSet::new();
                        for _ in 0..*initial {
                            rows.push(Record::from_specs(fields));
                        }
                        FieldValue::Rows(rows)
                    }
                    _ => spec.default.clone(),
                };
                (spec.key.to_string(), value)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Replace the value of an existing key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: FieldValue) -> bool {
        match self.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    /// Text or choice value; blank reads as an empty string
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(FieldValue::as_text).unwrap_or("")
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(FieldValue::as_flag).unwrap_or(false)
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        self.get(key).and_then(FieldValue::as_date)
    }

    pub fn time(&self, key: &str) -> Option<NaiveTime> {
        self.get(key).and_then(FieldValue::as_time)
    }

    pub fn rows(&self, key: &str) -> Option<&RowSet> {
        self.get(key).and_then(FieldValue::as_rows)
    }

    pub fn rows_mut(&mut self, key: &str) -> Option<&mut RowSet> {
        self.get_mut(key).and_then(FieldValue::as_rows_mut)
    }
}
