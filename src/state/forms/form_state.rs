//! Generic persisted form state
//!
//! A [`FormState`] glues a set of typed fields, a pure [`Rules`] function and
//! a [`Storage`] backend: load the snapshot, apply edits, validate, compute
//! after a debounce, persist after each successful computation, reset.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::debounce::{Debouncer, Ticker};
use super::field::{FieldError, FieldSpec, FieldValue};
use super::outcome::{Derived, Outcome, Rules, ValidationError};
use super::record::{Record, RowId};
use super::snapshot::PersistedSnapshot;
use crate::storage::{Storage, StorageError};

/// Quiet period used when a form is built without an explicit debounce
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Trait for common form focus navigation
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
}

/// Address of an editable value inside a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    Field(String),
    RowField {
        rows: String,
        id: RowId,
        key: String,
    },
}

impl FieldPath {
    pub fn field(key: &str) -> Self {
        Self::Field(key.to_string())
    }

    pub fn row(rows: &str, id: RowId, key: &str) -> Self {
        Self::RowField {
            rows: rows.to_string(),
            id,
            key: key.to_string(),
        }
    }

    /// Key of the field itself, without the row prefix
    pub fn key(&self) -> &str {
        match self {
            Self::Field(key) => key,
            Self::RowField { key, .. } => key,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(key) => write!(f, "{key}"),
            Self::RowField { rows, id, key } => write!(f, "{rows}.{id}.{key}"),
        }
    }
}

/// Record version used to recognize stale asynchronous completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Revision(u64);

/// Engine-level misuse or rejected input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("'{0}' is not a repeatable field")]
    NotRows(String),

    #[error("no row {id} in '{rows}'")]
    UnknownRow { rows: String, id: RowId },

    #[error("{path}: {source}")]
    Rejected {
        path: FieldPath,
        #[source]
        source: FieldError,
    },
}

/// Result of one evaluation pass
#[derive(Debug)]
pub struct Evaluation {
    pub outcome: Outcome,
    /// Set when the snapshot could not be written; the outcome still stands
    pub storage_error: Option<StorageError>,
}

/// Controller for one tool instance
pub struct FormState {
    specs: Vec<FieldSpec>,
    storage_key: Option<String>,
    rules: Box<dyn Rules>,
    record: Record,
    errors: BTreeMap<FieldPath, FieldError>,
    debounce: Debouncer,
    live: Option<Ticker>,
    revision: u64,
    persisted: Option<u64>,
    last_outcome: Outcome,
    /// Most recent `Ready` result, kept through later errors
    last_good: Option<Derived>,
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("storage_key", &self.storage_key)
            .field("record", &self.record)
            .field("errors", &self.errors)
            .field("revision", &self.revision)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

impl FormState {
    /// Build a form holding declared defaults. Call [`FormState::initialize`]
    /// to load a persisted snapshot.
    pub fn new(specs: Vec<FieldSpec>, rules: impl Rules + 'static) -> Self {
        let record = Record::from_specs(&specs);
        Self {
            specs,
            storage_key: None,
            rules: Box::new(rules),
            record,
            errors: BTreeMap::new(),
            debounce: Debouncer::new(DEFAULT_DEBOUNCE),
            live: None,
            revision: 0,
            persisted: None,
            last_outcome: Outcome::NotReady,
            last_good: None,
        }
    }

    /// Namespace under which the record is persisted
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = Debouncer::new(delay);
        self
    }

    /// Re-evaluate every `period` while the result is ready and not finished
    pub fn with_live_refresh(mut self, period: Duration) -> Self {
        self.live = Some(Ticker::new(period));
        self
    }

    /// Load the persisted snapshot into a fresh record.
    ///
    /// Missing or undecodable snapshots leave the declared defaults in place.
    /// A read failure is returned for the caller to surface, but the form is
    /// fully usable with defaults either way.
    pub fn initialize(&mut self, storage: &dyn Storage) -> Result<(), StorageError> {
        self.record = Record::from_specs(&self.specs);
        self.errors.clear();
        self.last_outcome = Outcome::NotReady;
        self.last_good = None;
        let Some(key) = self.storage_key.as_deref() else {
            return Ok(());
        };

        let bytes = match storage.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(()),
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read saved form data");
                return Err(err);
            }
        };

        match PersistedSnapshot::from_bytes(&bytes) {
            Ok(snapshot) => {
                self.record = snapshot.restore(&self.specs);
                self.persisted = Some(self.revision);
                tracing::debug!(key, "restored saved form data");
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring unreadable saved form data");
            }
        }
        Ok(())
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref()
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn last_outcome(&self) -> &Outcome {
        &self.last_outcome
    }

    /// Last successful result; survives `Invalid` and `NotReady` evaluations
    pub fn last_good(&self) -> Option<&Derived> {
        self.last_good.as_ref()
    }

    pub fn revision(&self) -> Revision {
        Revision(self.revision)
    }

    /// Whether nothing has changed the record since `revision` was taken
    pub fn is_current(&self, revision: Revision) -> bool {
        revision.0 == self.revision
    }

    /// Whether the record matches what was last loaded or written
    pub fn is_saved(&self) -> bool {
        self.persisted == Some(self.revision)
    }

    pub fn is_recompute_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn is_live(&self) -> bool {
        self.live.as_ref().is_some_and(Ticker::is_running)
    }

    pub fn field_error(&self, path: &FieldPath) -> Option<&FieldError> {
        self.errors.get(path)
    }

    /// Declaration for a path, looking inside rows fields as needed
    pub fn spec_at(&self, path: &FieldPath) -> Option<&FieldSpec> {
        match path {
            FieldPath::Field(key) => self.spec(key),
            FieldPath::RowField { rows, key, .. } => self
                .spec(rows)?
                .row_fields()?
                .iter()
                .find(|s| s.key == key),
        }
    }

    pub fn value_at(&self, path: &FieldPath) -> Option<&FieldValue> {
        match path {
            FieldPath::Field(key) => self.record.get(key),
            FieldPath::RowField { rows, id, key } => {
                self.record.rows(rows)?.get(*id)?.record.get(key)
            }
        }
    }

    /// Every editable path in display order, rows expanded in place
    pub fn paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        for spec in &self.specs {
            match spec.row_fields() {
                Some(fields) => {
                    if let Some(rows) = self.record.rows(spec.key) {
                        for row in rows.iter() {
                            paths.extend(
                                fields.iter().map(|f| FieldPath::row(spec.key, row.id, f.key)),
                            );
                        }
                    }
                }
                None => paths.push(FieldPath::field(spec.key)),
            }
        }
        paths
    }

    /// Parse `raw` into the field at `path`.
    ///
    /// Rejected input keeps the prior value, records a field error that
    /// blocks computation until corrected, and is returned to the caller.
    /// Either way a recompute is scheduled.
    pub fn update(&mut self, path: &FieldPath, raw: &str, now: Instant) -> Result<(), FormError> {
        if self.value_at(path).is_none() {
            return Err(self.unknown(path));
        }
        let spec = self.spec_at(path).ok_or_else(|| self.unknown(path))?;
        if spec.is_rows() {
            return Err(FormError::Rejected {
                path: path.clone(),
                source: FieldError::NotEditable,
            });
        }
        let parsed = spec.parse(raw);
        self.debounce.schedule(now);

        match parsed {
            Ok(value) => {
                self.store(path, value)?;
                self.errors.remove(path);
                Ok(())
            }
            Err(source) => {
                self.errors.insert(path.clone(), source.clone());
                Err(FormError::Rejected {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    /// Update a top-level field from raw input
    pub fn update_field(&mut self, key: &str, raw: &str, now: Instant) -> Result<(), FormError> {
        self.update(&FieldPath::field(key), raw, now)
    }

    /// Update a field inside a row from raw input
    pub fn update_row_field(
        &mut self,
        rows: &str,
        id: RowId,
        key: &str,
        raw: &str,
        now: Instant,
    ) -> Result<(), FormError> {
        self.update(&FieldPath::row(rows, id, key), raw, now)
    }

    /// Set an already typed value, checked against the field's declaration
    pub fn set_value(
        &mut self,
        path: &FieldPath,
        value: FieldValue,
        now: Instant,
    ) -> Result<(), FormError> {
        let spec = self.spec_at(path).ok_or_else(|| self.unknown(path))?;
        spec.accepts(&value).map_err(|source| FormError::Rejected {
            path: path.clone(),
            source,
        })?;
        self.store(path, value)?;
        self.errors.remove(path);
        self.debounce.schedule(now);
        Ok(())
    }

    /// Append a row of defaults to a rows field
    pub fn add_row(&mut self, rows_key: &str, now: Instant) -> Result<RowId, FormError> {
        let spec = self
            .spec(rows_key)
            .ok_or_else(|| FormError::UnknownField(rows_key.to_string()))?;
        let fields = spec
            .row_fields()
            .ok_or_else(|| FormError::NotRows(rows_key.to_string()))?;
        let fresh = Record::from_specs(fields);
        let rows = self
            .record
            .rows_mut(rows_key)
            .ok_or_else(|| FormError::NotRows(rows_key.to_string()))?;
        let id = rows.push(fresh);
        self.touch(now);
        Ok(id)
    }

    /// Remove a row by identifier
    pub fn remove_row(&mut self, rows_key: &str, id: RowId, now: Instant) -> Result<(), FormError> {
        let rows = self
            .record
            .rows_mut(rows_key)
            .ok_or_else(|| FormError::NotRows(rows_key.to_string()))?;
        rows.remove(id).ok_or_else(|| FormError::UnknownRow {
            rows: rows_key.to_string(),
            id,
        })?;
        self.errors.retain(|path, _| {
            !matches!(path, FieldPath::RowField { rows, id: row, .. } if rows == rows_key && *row == id)
        });
        self.touch(now);
        Ok(())
    }

    /// Apply the rules to the current record without side effects.
    ///
    /// Pending field errors surface as `Invalid`; missing required values,
    /// including those inside rows, give `NotReady` without calling the rules.
    pub fn evaluate(&self) -> Outcome {
        if let Some((path, err)) = self.errors.iter().next() {
            return Outcome::Invalid(ValidationError::new(path.to_string(), err.to_string()));
        }
        let ready = self.specs.iter().all(|spec| match spec.row_fields() {
            Some(fields) => self.record.rows(spec.key).is_some_and(|rows| {
                rows.iter().all(|row| {
                    fields
                        .iter()
                        .all(|f| f.is_satisfied_by(row.record.get(f.key)))
                })
            }),
            None => spec.is_satisfied_by(self.record.get(spec.key)),
        });
        if !ready || !self.rules.ready(&self.record) {
            return Outcome::NotReady;
        }
        self.rules.compute(&self.record).into()
    }

    /// Drive the debounce deadline and live ticker.
    ///
    /// Returns an evaluation when one of them fired.
    pub fn poll(&mut self, now: Instant, storage: &dyn Storage) -> Option<Evaluation> {
        let debounced = self.debounce.fire(now);
        let ticked = self.live.as_mut().is_some_and(|t| t.due(now));
        if debounced || ticked {
            Some(self.recompute(now, storage))
        } else {
            None
        }
    }

    /// Evaluate immediately, cancelling any pending debounce, and persist
    /// the record after a successful computation.
    pub fn recompute(&mut self, now: Instant, storage: &dyn Storage) -> Evaluation {
        self.debounce.cancel();
        let outcome = self.evaluate();

        let mut storage_error = None;
        match &outcome {
            Outcome::Ready(derived) => {
                if let Err(err) = self.persist(storage) {
                    storage_error = Some(err);
                }
                self.last_good = Some(derived.clone());
                if let Some(live) = self.live.as_mut() {
                    if derived.is_finished() {
                        live.stop();
                    } else {
                        live.start(now);
                    }
                }
            }
            _ => {
                if let Some(live) = self.live.as_mut() {
                    live.stop();
                }
            }
        }

        self.last_outcome = outcome.clone();
        Evaluation {
            outcome,
            storage_error,
        }
    }

    /// Write the snapshot if the record changed since the last write
    pub fn persist(&mut self, storage: &dyn Storage) -> Result<(), StorageError> {
        let Some(key) = self.storage_key.as_deref() else {
            return Ok(());
        };
        if self.persisted == Some(self.revision) {
            return Ok(());
        }

        let snapshot = PersistedSnapshot::capture(&self.specs, &self.record);
        let bytes = snapshot.to_bytes().map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        if let Err(err) = storage.set(key, &bytes) {
            tracing::warn!(key, error = %err, "failed to save form data");
            return Err(err);
        }
        self.persisted = Some(self.revision);
        Ok(())
    }

    /// Return every field to its default, cancel timers and delete the snapshot
    pub fn reset(&mut self, storage: &dyn Storage) -> Result<(), StorageError> {
        self.debounce.cancel();
        if let Some(live) = self.live.as_mut() {
            live.stop();
        }
        self.record = Record::from_specs(&self.specs);
        self.errors.clear();
        self.revision += 1;
        self.persisted = None;
        self.last_outcome = Outcome::NotReady;
        self.last_good = None;

        if let Some(key) = self.storage_key.as_deref() {
            if let Err(err) = storage.delete(key) {
                tracing::warn!(key, error = %err, "failed to delete saved form data");
                return Err(err);
            }
        }
        Ok(())
    }

    fn spec(&self, key: &str) -> Option<&FieldSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    fn unknown(&self, path: &FieldPath) -> FormError {
        match path {
            FieldPath::RowField { rows, id, .. }
                if self.record.rows(rows).is_some_and(|r| r.get(*id).is_none()) =>
            {
                FormError::UnknownRow {
                    rows: rows.clone(),
                    id: *id,
                }
            }
            _ => FormError::UnknownField(path.to_string()),
        }
    }

    fn store(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError> {
        let slot = match path {
            FieldPath::Field(key) => self.record.get_mut(key),
            FieldPath::RowField { rows, id, key } => {
                let set = self
                    .record
                    .rows_mut(rows)
                    .ok_or_else(|| FormError::NotRows(rows.clone()))?;
                let row = set.get_mut(*id).ok_or_else(|| FormError::UnknownRow {
                    rows: rows.clone(),
                    id: *id,
                })?;
                row.record.get_mut(key)
            }
        };
        let slot = slot.ok_or_else(|| FormError::UnknownField(path.to_string()))?;
        if *slot != value {
            *slot = value;
            self.revision += 1;
        }
        Ok(())
    }

    fn touch(&mut self, now: Instant) {
        self.revision += 1;
        self.debounce.schedule(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::{ComputationResult, Derived};
    use crate::storage::{MemoryStorage, MockStorage};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    const KEY: &str = "test_form_data";

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::number("total", "Total").positive(),
            FieldSpec::number("part", "Part").min(0.0).max(1000.0).required(),
            FieldSpec::rows(
                "items",
                "Items",
                vec![FieldSpec::text("name", "Name")],
                1,
            ),
        ]
    }

    fn share(record: &Record) -> ComputationResult {
        let total = record.number("total").unwrap_or_default();
        let part = record.number("part").unwrap_or_default();
        if part > total {
            return Err(ValidationError::new("part", "part cannot exceed total"));
        }
        Ok(Derived::new().headline("Share", format!("{:.2}", part / total * 100.0)))
    }

    fn form() -> FormState {
        FormState::new(specs(), share).with_storage_key(KEY)
    }

    /// Form whose rules count invocations and report the part they saw
    fn counting_form(calls: Rc<Cell<u32>>) -> FormState {
        let rules = move |record: &Record| -> ComputationResult {
            calls.set(calls.get() + 1);
            let part = record.number("part").unwrap_or_default();
            Ok(Derived::new().headline("Part", format!("{part}")))
        };
        FormState::new(specs(), rules).with_storage_key(KEY)
    }

    mod initialize {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_absent_snapshot_gives_defaults() {
            let storage = MemoryStorage::new();
            let mut form = form();
            assert!(form.initialize(&storage).is_ok());
            assert_eq!(form.record(), &Record::from_specs(&specs()));
            assert!(!form.is_saved());
        }

        #[test]
        fn test_restores_saved_values() {
            let storage = MemoryStorage::new();
            storage
                .set(KEY, br#"{"fields": {"total": "100", "part": 40}}"#)
                .unwrap();
            let mut form = form();
            form.initialize(&storage).unwrap();
            assert_eq!(form.record().number("total"), Some(100.0));
            assert_eq!(form.record().number("part"), Some(40.0));
            assert!(form.is_saved());

            form.update_field("part", "41", Instant::now()).unwrap();
            assert!(!form.is_saved());
        }

        #[test]
        fn test_corrupt_snapshot_degrades_to_defaults() {
            let storage = MemoryStorage::new();
            storage.set(KEY, b"{{{").unwrap();
            let mut form = form();
            assert!(form.initialize(&storage).is_ok());
            assert_eq!(form.record(), &Record::from_specs(&specs()));
        }

        #[test]
        fn test_read_failure_is_reported_but_form_is_usable() {
            let mut storage = MockStorage::new();
            storage
                .expect_get()
                .returning(|_| Err(StorageError::Unavailable("disk gone".to_string())));
            let mut form = form();
            assert!(form.initialize(&storage).is_err());
            assert_eq!(form.record(), &Record::from_specs(&specs()));
        }
    }

    mod update {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_valid_input_is_stored() {
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            assert_eq!(form.record().number("total"), Some(100.0));
            assert!(form.is_recompute_pending());
        }

        #[test]
        fn test_out_of_range_keeps_prior_value_and_blocks_compute() {
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();

            let err = form.update_field("part", "4000", now).unwrap_err();
            assert!(matches!(err, FormError::Rejected { .. }));
            assert_eq!(form.record().number("part"), Some(40.0));
            assert!(form.field_error(&FieldPath::field("part")).is_some());
            assert!(matches!(form.evaluate(), Outcome::Invalid(ref e) if e.field == "part"));

            form.update_field("part", "50", now).unwrap();
            assert!(form.field_error(&FieldPath::field("part")).is_none());
            assert!(form.evaluate().is_ready());
        }

        #[test]
        fn test_unknown_field_is_an_error() {
            let mut form = form();
            assert_eq!(
                form.update_field("nope", "1", Instant::now()),
                Err(FormError::UnknownField("nope".to_string()))
            );
        }

        #[test]
        fn test_rows_field_is_not_directly_editable() {
            let mut form = form();
            assert!(matches!(
                form.update_field("items", "x", Instant::now()),
                Err(FormError::Rejected {
                    source: FieldError::NotEditable,
                    ..
                })
            ));
        }

        #[test]
        fn test_set_value_checks_kind() {
            let mut form = form();
            let now = Instant::now();
            assert!(form
                .set_value(&FieldPath::field("total"), FieldValue::Flag(true), now)
                .is_err());
            form.set_value(&FieldPath::field("total"), FieldValue::Number(5.0), now)
                .unwrap();
            assert_eq!(form.record().number("total"), Some(5.0));
        }
    }

    mod compute {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_not_ready_without_calling_rules() {
            let calls = Rc::new(Cell::new(0));
            let mut form = counting_form(calls.clone());
            let now = Instant::now();
            form.update_field("part", "10", now).unwrap();
            assert_eq!(form.evaluate(), Outcome::NotReady);
            // Positive requirement: zero total is not ready either
            form.update_field("total", "0", now).unwrap();
            assert_eq!(form.evaluate(), Outcome::NotReady);
            assert_eq!(calls.get(), 0);
        }

        #[test]
        fn test_domain_violation_is_invalid() {
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "10", now).unwrap();
            form.update_field("part", "20", now).unwrap();
            assert_eq!(
                form.evaluate(),
                Outcome::Invalid(ValidationError::new("part", "part cannot exceed total"))
            );
        }

        #[test]
        fn test_ready_result() {
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();
            let outcome = form.evaluate();
            assert_eq!(outcome.derived().and_then(|d| d.get("Share")), Some("40.00"));
        }

        /// Rules that only run once the item name is filled in
        struct NamedItems;

        impl Rules for NamedItems {
            fn ready(&self, record: &Record) -> bool {
                record
                    .rows("items")
                    .is_some_and(|rows| rows.iter().all(|row| !row.record.text("name").is_empty()))
            }

            fn compute(&self, record: &Record) -> ComputationResult {
                share(record)
            }
        }

        #[test]
        fn test_rules_can_hold_back_readiness() {
            let mut form = FormState::new(specs(), NamedItems);
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();
            assert_eq!(form.evaluate(), Outcome::NotReady);

            let row = form.record().rows("items").unwrap().iter().next().unwrap().id;
            form.update_row_field("items", row, "name", "pens", now)
                .unwrap();
            assert!(form.evaluate().is_ready());
        }
    }

    mod debounce {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_burst_of_edits_recomputes_once_with_last_value() {
            let calls = Rc::new(Cell::new(0));
            let storage = MemoryStorage::new();
            let mut form = counting_form(calls.clone()).with_debounce(Duration::from_millis(300));
            let start = Instant::now();

            form.update_field("total", "100", start).unwrap();
            form.update_field("part", "1", start + Duration::from_millis(100)).unwrap();
            form.update_field("part", "12", start + Duration::from_millis(200)).unwrap();

            assert!(form.poll(start + Duration::from_millis(400), &storage).is_none());
            let evaluation = form
                .poll(start + Duration::from_millis(500), &storage)
                .expect("debounce should fire");
            assert!(form.poll(start + Duration::from_millis(900), &storage).is_none());

            assert_eq!(calls.get(), 1);
            assert_eq!(
                evaluation.outcome.derived().and_then(|d| d.get("Part")),
                Some("12")
            );
        }
    }

    mod persist {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_ready_outcome_persists_record() {
            let storage = MemoryStorage::new();
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();
            let evaluation = form.recompute(now, &storage);
            assert!(evaluation.outcome.is_ready());
            assert!(evaluation.storage_error.is_none());

            let mut reloaded = super::form();
            reloaded.initialize(&storage).unwrap();
            assert_eq!(reloaded.record(), form.record());
        }

        #[test]
        fn test_invalid_outcome_does_not_persist() {
            let storage = MemoryStorage::new();
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "10", now).unwrap();
            form.update_field("part", "20", now).unwrap();
            form.recompute(now, &storage);
            assert!(!storage.contains(KEY));
        }

        #[test]
        fn test_error_keeps_last_good_result() {
            let storage = MemoryStorage::new();
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "10", now).unwrap();
            form.update_field("part", "5", now).unwrap();
            form.recompute(now, &storage);
            let good = form.last_good().cloned();
            assert!(good.is_some());

            form.update_field("part", "50", now).unwrap();
            assert!(matches!(
                form.recompute(now, &storage).outcome,
                Outcome::Invalid(_)
            ));
            assert!(matches!(form.last_outcome(), Outcome::Invalid(_)));
            assert_eq!(form.last_good().cloned(), good);

            form.update_field("total", "", now).unwrap();
            form.recompute(now, &storage);
            assert_eq!(form.last_outcome(), &Outcome::NotReady);
            assert_eq!(form.last_good().cloned(), good);
        }

        #[test]
        fn test_write_failure_still_returns_outcome() {
            let mut storage = MockStorage::new();
            storage
                .expect_set()
                .returning(|key, _| Err(StorageError::Unavailable(format!("{key}: quota exceeded"))));
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();

            let evaluation = form.recompute(now, &storage);
            assert!(evaluation.outcome.is_ready());
            assert!(evaluation.storage_error.is_some());
            assert!(form.last_outcome().is_ready());
        }

        #[test]
        fn test_unchanged_record_is_written_once() {
            let mut storage = MockStorage::new();
            storage.expect_set().times(1).returning(|_, _| Ok(()));
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();
            form.recompute(now, &storage);
            form.recompute(now, &storage);
        }

        #[test]
        fn test_form_without_key_never_touches_storage() {
            let storage = MockStorage::new();
            let mut form = FormState::new(specs(), share);
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();
            assert!(form.recompute(now, &storage).storage_error.is_none());
            assert!(form.reset(&storage).is_ok());
        }
    }

    mod reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_reset_is_idempotent_and_deletes_snapshot() {
            let storage = MemoryStorage::new();
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.update_field("part", "40", now).unwrap();
            form.recompute(now, &storage);
            assert!(storage.contains(KEY));

            form.reset(&storage).unwrap();
            let first = form.record().clone();
            form.reset(&storage).unwrap();
            assert_eq!(form.record(), &first);
            assert_eq!(form.record(), &Record::from_specs(&specs()));
            assert!(!storage.contains(KEY));
            assert_eq!(form.last_outcome(), &Outcome::NotReady);
            assert!(form.last_good().is_none());
        }

        #[test]
        fn test_reset_cancels_pending_recompute() {
            let storage = MemoryStorage::new();
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "100", now).unwrap();
            form.reset(&storage).unwrap();
            assert!(!form.is_recompute_pending());
            assert!(form.poll(now + Duration::from_secs(5), &storage).is_none());
        }

        #[test]
        fn test_reset_clears_field_errors() {
            let storage = MemoryStorage::new();
            let mut form = form();
            let _ = form.update_field("part", "abc", Instant::now());
            form.reset(&storage).unwrap();
            assert!(form.field_error(&FieldPath::field("part")).is_none());
        }
    }

    mod rows {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_add_and_remove_rows_by_id() {
            let mut form = form();
            let now = Instant::now();
            let first = form.record().rows("items").unwrap().iter().next().unwrap().id;
            let second = form.add_row("items", now).unwrap();
            let third = form.add_row("items", now).unwrap();

            form.remove_row("items", first, now).unwrap();
            form.update_row_field("items", third, "name", "Physics", now)
                .unwrap();
            form.remove_row("items", second, now).unwrap();

            let rows = form.record().rows("items").unwrap();
            assert_eq!(rows.len(), 1);
            let remaining = rows.get(third).unwrap();
            assert_eq!(remaining.record.text("name"), "Physics");

            let fourth = form.add_row("items", now).unwrap();
            assert!(fourth > third);
        }

        #[test]
        fn test_required_row_field_gates_readiness() {
            let specs = vec![FieldSpec::rows(
                "subjects",
                "Subjects",
                vec![FieldSpec::text("name", "Name").required()],
                1,
            )];
            let rules = |_: &Record| -> ComputationResult { Ok(Derived::new()) };
            let mut form = FormState::new(specs, rules);
            let now = Instant::now();
            assert_eq!(form.evaluate(), Outcome::NotReady);

            let id = form.record().rows("subjects").unwrap().iter().next().unwrap().id;
            form.update_row_field("subjects", id, "name", "Maths", now)
                .unwrap();
            assert!(form.evaluate().is_ready());
        }

        #[test]
        fn test_remove_unknown_row_errors() {
            let mut form = form();
            assert_eq!(
                form.remove_row("items", RowId(99), Instant::now()),
                Err(FormError::UnknownRow {
                    rows: "items".to_string(),
                    id: RowId(99)
                })
            );
        }

        #[test]
        fn test_update_removed_row_errors() {
            let mut form = form();
            let now = Instant::now();
            let id = form.add_row("items", now).unwrap();
            form.remove_row("items", id, now).unwrap();
            assert!(matches!(
                form.update_row_field("items", id, "name", "x", now),
                Err(FormError::UnknownRow { .. })
            ));
        }

        #[test]
        fn test_add_row_to_plain_field_errors() {
            let mut form = form();
            assert_eq!(
                form.add_row("total", Instant::now()),
                Err(FormError::NotRows("total".to_string()))
            );
        }

        #[test]
        fn test_paths_expand_rows_in_order() {
            let mut form = form();
            let first = form.record().rows("items").unwrap().iter().next().unwrap().id;
            let second = form.add_row("items", Instant::now()).unwrap();
            assert_eq!(
                form.paths(),
                vec![
                    FieldPath::field("total"),
                    FieldPath::field("part"),
                    FieldPath::row("items", first, "name"),
                    FieldPath::row("items", second, "name"),
                ]
            );
        }
    }

    mod staleness {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_revision_moves_on_every_record_change() {
            let storage = MemoryStorage::new();
            let mut form = form();
            let now = Instant::now();
            let issued = form.revision();
            assert!(form.is_current(issued));

            form.update_field("total", "5", now).unwrap();
            assert!(!form.is_current(issued));

            let after_edit = form.revision();
            form.add_row("items", now).unwrap();
            assert!(!form.is_current(after_edit));

            let before_reset = form.revision();
            form.reset(&storage).unwrap();
            assert!(!form.is_current(before_reset));
        }

        #[test]
        fn test_same_value_does_not_move_revision() {
            let mut form = form();
            let now = Instant::now();
            form.update_field("total", "5", now).unwrap();
            let issued = form.revision();
            form.update_field("total", "5.0", now).unwrap();
            assert!(form.is_current(issued));
        }
    }

    mod live {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_live_ticker_runs_until_finished() {
            let storage = MemoryStorage::new();
            let done = Rc::new(Cell::new(false));
            let flag = done.clone();
            let rules = move |_: &Record| -> ComputationResult {
                let derived = Derived::new().headline("Left", "x");
                Ok(if flag.get() { derived.finished() } else { derived })
            };
            let mut form = FormState::new(vec![FieldSpec::text("name", "Name")], rules)
                .with_live_refresh(Duration::from_secs(1));
            let start = Instant::now();

            form.recompute(start, &storage);
            assert!(form.is_live());
            assert!(form.poll(start + Duration::from_secs(1), &storage).is_some());

            done.set(true);
            assert!(form.poll(start + Duration::from_secs(2), &storage).is_some());
            assert!(!form.is_live());
            assert!(form.poll(start + Duration::from_secs(3), &storage).is_none());
        }

        #[test]
        fn test_reset_stops_live_ticker() {
            let storage = MemoryStorage::new();
            let rules = |_: &Record| -> ComputationResult { Ok(Derived::new()) };
            let mut form = FormState::new(vec![FieldSpec::text("name", "Name")], rules)
                .with_live_refresh(Duration::from_secs(1));
            let start = Instant::now();
            form.recompute(start, &storage);
            form.reset(&storage).unwrap();
            assert!(!form.is_live());
        }
    }
}
