//! Form domain layer
//!
//! Typed field declarations, records with repeatable rows, and the
//! [`FormState`] engine every tool is built on.

mod debounce;
mod field;
mod form_state;
mod outcome;
mod record;
mod snapshot;

pub use debounce::{Debouncer, Ticker};
pub use field::{FieldError, FieldKind, FieldSpec, FieldValue, Requirement};
pub use form_state::{
    Evaluation, FieldPath, Form, FormError, FormState, Revision, DEFAULT_DEBOUNCE,
};
pub use outcome::{ComputationResult, Derived, Outcome, Rules, ValidationError};
pub use record::{Record, Row, RowId, RowSet};
pub use snapshot::PersistedSnapshot;
