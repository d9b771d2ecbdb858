//! Durable JSON projection of a record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field::{FieldKind, FieldSpec, FieldValue};
use super::record::{Record, Row, RowId, RowSet};

const SNAPSHOT_VERSION: u32 = 1;

/// Largest magnitude below which every whole f64 is an exact i64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serialized form of a record written under a tool's storage key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub version: u32,
    /// Plain field values; blank fields are omitted
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub rows: BTreeMap<String, RowsSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsSnapshot {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub entries: Vec<RowSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSnapshot {
    pub id: u64,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl PersistedSnapshot {
    /// Project a record into its persisted form
    pub fn capture(specs: &[FieldSpec], record: &Record) -> Self {
        let mut rows = BTreeMap::new();
        for spec in specs.iter().filter(|s| s.is_rows()) {
            if let Some(set) = record.rows(spec.key) {
                let entries = set
                    .iter()
                    .map(|row| RowSnapshot {
                        id: row.id.0,
                        fields: capture_fields(&row.record),
                    })
                    .collect();
                rows.insert(
                    spec.key.to_string(),
                    RowsSnapshot {
                        next_id: set.next_id(),
                        entries,
                    },
                );
            }
        }

        Self {
            version: SNAPSHOT_VERSION,
            fields: capture_fields(record),
            rows,
        }
    }

    /// Merge recognized values into a fresh record.
    ///
    /// Unknown keys are ignored; missing or unparseable values keep the
    /// declared default.
    pub fn restore(&self, specs: &[FieldSpec]) -> Record {
        let mut record = Record::from_specs(specs);
        for spec in specs {
            match &spec.kind {
                FieldKind::Rows { fields, .. } => {
                    let Some(saved) = self.rows.get(spec.key) else {
                        continue;
                    };
                    let rows = saved
                        .entries
                        .iter()
                        .map(|entry| Row {
                            id: RowId(entry.id),
                            record: restore_fields(fields, &entry.fields),
                        })
                        .collect();
                    record.set(
                        spec.key,
                        FieldValue::Rows(RowSet::restore(rows, saved.next_id)),
                    );
                }
                _ => {
                    if let Some(value) = self.fields.get(spec.key).and_then(|v| decode(spec, v)) {
                        record.set(spec.key, value);
                    }
                }
            }
        }
        record
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

fn capture_fields(record: &Record) -> Map<String, Value> {
    record
        .iter()
        .filter_map(|(key, value)| encode(value).map(|v| (key.to_string(), v)))
        .collect()
}

fn restore_fields(specs: &[FieldSpec], saved: &Map<String, Value>) -> Record {
    let mut record = Record::from_specs(specs);
    for spec in specs {
        if let Some(value) = saved.get(spec.key).and_then(|v| decode(spec, v)) {
            record.set(spec.key, value);
        }
    }
    record
}

fn encode(value: &FieldValue) -> Option<Value> {
    match value {
        FieldValue::Blank | FieldValue::Rows(_) => None,
        // whole numbers are written without a fraction so integer fields reload
        FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
            Some(Value::from(*n as i64))
        }
        FieldValue::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
        FieldValue::Flag(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(other.to_raw())),
    }
}

/// Values written by older builds may hold numbers as strings, so every
/// scalar goes back through the field's own parser.
fn decode(spec: &FieldSpec, value: &Value) -> Option<FieldValue> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // `16.0` from older snapshots must still parse as an integer
            Some(f) if n.as_i64().is_none() => FieldValue::Number(f).to_raw(),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    spec.parse(&raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::number("amount", "Amount").min(0.0),
            FieldSpec::choice("mode", "Mode", &["add", "remove"]),
            FieldSpec::flag("upper", "Upper"),
            FieldSpec::rows(
                "subjects",
                "Subjects",
                vec![
                    FieldSpec::text("name", "Name"),
                    FieldSpec::number("credits", "Credits"),
                ],
                1,
            ),
        ]
    }

    #[test]
    fn test_capture_then_restore_preserves_record() {
        let specs = specs();
        let mut record = Record::from_specs(&specs);
        record.set("amount", FieldValue::Number(1250.5));
        record.set("mode", FieldValue::Choice("remove".to_string()));
        record.set("upper", FieldValue::Flag(true));
        let rows = record.rows_mut("subjects").unwrap();
        let mut row = Record::from_specs(specs[3].row_fields().unwrap());
        row.set("name", FieldValue::Text("Maths".to_string()));
        row.set("credits", FieldValue::Number(4.0));
        rows.push(row);

        let bytes = PersistedSnapshot::capture(&specs, &record).to_bytes().unwrap();
        let restored = PersistedSnapshot::from_bytes(&bytes)
            .unwrap()
            .restore(&specs);
        assert_eq!(restored, record);
    }

    #[test]
    fn test_restore_accepts_string_numbers_and_ignores_unknown_keys() {
        let json = r#"{"fields": {"amount": "100", "legacy": "x", "mode": "nope"}}"#;
        let snapshot = PersistedSnapshot::from_bytes(json.as_bytes()).unwrap();
        let record = snapshot.restore(&specs());
        assert_eq!(record.number("amount"), Some(100.0));
        // Unparseable value falls back to the default
        assert_eq!(record.text("mode"), "add");
        assert!(record.get("legacy").is_none());
    }

    #[test]
    fn test_restore_rejects_out_of_range_values() {
        let json = r#"{"fields": {"amount": -5}}"#;
        let record = PersistedSnapshot::from_bytes(json.as_bytes())
            .unwrap()
            .restore(&specs());
        assert_eq!(record.get("amount"), Some(&FieldValue::Blank));
    }

    #[test]
    fn test_missing_rows_take_initial_default() {
        let snapshot = PersistedSnapshot::from_bytes(b"{}").unwrap();
        let record = snapshot.restore(&specs());
        assert_eq!(record.rows("subjects").map(RowSet::len), Some(1));
    }

    #[test]
    fn test_row_counter_survives_reload() {
        let specs = specs();
        let mut record = Record::from_specs(&specs);
        let rows = record.rows_mut("subjects").unwrap();
        let second = rows.push(Record::from_specs(specs[3].row_fields().unwrap()));
        rows.remove(second);

        let snapshot = PersistedSnapshot::capture(&specs, &record);
        let mut restored = snapshot.restore(&specs);
        let next = restored
            .rows_mut("subjects")
            .unwrap()
            .push(Record::default());
        assert_eq!(next, RowId(3));
    }

    #[test]
    fn test_blank_fields_are_omitted() {
        let specs = specs();
        let record = Record::from_specs(&specs);
        let snapshot = PersistedSnapshot::capture(&specs, &record);
        assert!(!snapshot.fields.contains_key("amount"));
        assert_eq!(snapshot.fields.get("upper"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_integer_field_survives_reload() {
        let specs = vec![FieldSpec::integer("count", "Count").min(4.0).max(64.0)];
        let mut record = Record::from_specs(&specs);
        record.set("count", FieldValue::Number(16.0));

        let bytes = PersistedSnapshot::capture(&specs, &record).to_bytes().unwrap();
        let restored = PersistedSnapshot::from_bytes(&bytes)
            .unwrap()
            .restore(&specs);
        assert_eq!(restored.number("count"), Some(16.0));

        // Snapshots that stored the value as a float still load
        let legacy = r#"{"fields": {"count": 16.0}}"#;
        let restored = PersistedSnapshot::from_bytes(legacy.as_bytes())
            .unwrap()
            .restore(&specs);
        assert_eq!(restored.number("count"), Some(16.0));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(PersistedSnapshot::from_bytes(b"not json").is_err());
    }
}
