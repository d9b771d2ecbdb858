//! Form field declarations and typed values

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use super::record::RowSet;

/// What kind of value a field holds, with its bounds
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Decimal number with optional inclusive bounds
    Number { min: Option<f64>, max: Option<f64> },
    /// Whole number with optional inclusive bounds
    Integer { min: Option<i64>, max: Option<i64> },
    Text { multiline: bool },
    /// One of a fixed set of options
    Choice { options: &'static [&'static str] },
    Flag,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// Time of day, `HH:MM`
    Time,
    /// Repeatable sub-records sharing one set of field declarations
    Rows {
        fields: Vec<FieldSpec>,
        initial: usize,
    },
}

/// When a field counts as filled in for computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    #[default]
    Optional,
    /// Must hold a non-blank value
    Required,
    /// Must hold a number strictly greater than zero
    Positive,
}

/// Reasons a raw input is rejected for a field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a whole number")]
    NotAWholeNumber(String),

    #[error("must be at least {0}")]
    BelowMin(String),

    #[error("must be at most {0}")]
    AboveMax(String),

    #[error("'{raw}' is not one of {options}")]
    UnknownOption { raw: String, options: String },

    #[error("'{0}' is not yes or no")]
    NotAFlag(String),

    #[error("'{0}' is not a date (YYYY-MM-DD)")]
    BadDate(String),

    #[error("'{0}' is not a time (HH:MM)")]
    BadTime(String),

    #[error("field cannot be edited directly")]
    NotEditable,
}

/// Declaration of one input
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
    pub default: FieldValue,
}

impl FieldSpec {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let default = match &kind {
            FieldKind::Choice { options } => options
                .first()
                .map(|o| FieldValue::Choice((*o).to_string()))
                .unwrap_or_default(),
            FieldKind::Flag => FieldValue::Flag(false),
            _ => FieldValue::Blank,
        };
        Self {
            key,
            label,
            kind,
            requirement: Requirement::Optional,
            default,
        }
    }

    pub fn number(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Number { min: None, max: None })
    }

    pub fn integer(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Integer { min: None, max: None })
    }

    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text { multiline: false })
    }

    pub fn multiline(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text { multiline: true })
    }

    /// Choice field; defaults to the first option
    pub fn choice(
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self::new(key, label, FieldKind::Choice { options })
    }

    pub fn flag(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Flag)
    }

    pub fn date(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Date)
    }

    pub fn time(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Time)
    }

    /// Repeatable rows starting with `initial` empty entries
    pub fn rows(
        key: &'static str,
        label: &'static str,
        fields: Vec<FieldSpec>,
        initial: usize,
    ) -> Self {
        Self::new(key, label, FieldKind::Rows { fields, initial })
    }

    /// Set the inclusive lower bound of a numeric field
    pub fn min(mut self, bound: f64) -> Self {
        match &mut self.kind {
            FieldKind::Number { min, .. } => *min = Some(bound),
            FieldKind::Integer { min, .. } => *min = Some(bound as i64),
            _ => {}
        }
        self
    }

    /// Set the inclusive upper bound of a numeric field
    pub fn max(mut self, bound: f64) -> Self {
        match &mut self.kind {
            FieldKind::Number { max, .. } => *max = Some(bound),
            FieldKind::Integer { max, .. } => *max = Some(bound as i64),
            _ => {}
        }
        self
    }

    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    pub fn positive(mut self) -> Self {
        self.requirement = Requirement::Positive;
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default = value;
        self
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self.kind, FieldKind::Text { multiline: true })
    }

    pub fn is_rows(&self) -> bool {
        matches!(self.kind, FieldKind::Rows { .. })
    }

    /// Field declarations of a rows field
    pub fn row_fields(&self) -> Option<&[FieldSpec]> {
        match &self.kind {
            FieldKind::Rows { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Parse raw user input into a value of this field's kind.
    ///
    /// Blank input always parses to [`FieldValue::Blank`]. Out-of-range numbers
    /// are rejected, never clamped.
    pub fn parse(&self, raw: &str) -> Result<FieldValue, FieldError> {
        let trimmed = raw.trim();
        if let FieldKind::Text { .. } = self.kind {
            return Ok(if trimmed.is_empty() {
                FieldValue::Blank
            } else {
                FieldValue::Text(raw.to_string())
            });
        }
        if trimmed.is_empty() {
            return match self.kind {
                FieldKind::Rows { .. } => Err(FieldError::NotEditable),
                _ => Ok(FieldValue::Blank),
            };
        }

        match &self.kind {
            FieldKind::Number { min, max } => {
                let value: f64 = trimmed
                    .parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite())
                    .ok_or_else(|| FieldError::NotANumber(trimmed.to_string()))?;
                if let Some(min) = min {
                    if value < *min {
                        return Err(FieldError::BelowMin(format_plain(*min)));
                    }
                }
                if let Some(max) = max {
                    if value > *max {
                        return Err(FieldError::AboveMax(format_plain(*max)));
                    }
                }
                Ok(FieldValue::Number(value))
            }
            FieldKind::Integer { min, max } => {
                let value: i64 = trimmed
                    .parse()
                    .map_err(|_| FieldError::NotAWholeNumber(trimmed.to_string()))?;
                if let Some(min) = min {
                    if value < *min {
                        return Err(FieldError::BelowMin(min.to_string()));
                    }
                }
                if let Some(max) = max {
                    if value > *max {
                        return Err(FieldError::AboveMax(max.to_string()));
                    }
                }
                Ok(FieldValue::Number(value as f64))
            }
            FieldKind::Choice { options } => options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(trimmed))
                .map(|o| FieldValue::Choice((*o).to_string()))
                .ok_or_else(|| FieldError::UnknownOption {
                    raw: trimmed.to_string(),
                    options: options.join("/"),
                }),
            FieldKind::Flag => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" | "x" => Ok(FieldValue::Flag(true)),
                "false" | "no" | "off" | "0" => Ok(FieldValue::Flag(false)),
                _ => Err(FieldError::NotAFlag(trimmed.to_string())),
            },
            FieldKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|_| FieldError::BadDate(trimmed.to_string())),
            FieldKind::Time => NaiveTime::parse_from_str(trimmed, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
                .map(FieldValue::Time)
                .map_err(|_| FieldError::BadTime(trimmed.to_string())),
            FieldKind::Text { .. } | FieldKind::Rows { .. } => Err(FieldError::NotEditable),
        }
    }

    /// Check that a programmatically built value is valid for this field
    pub fn accepts(&self, value: &FieldValue) -> Result<(), FieldError> {
        match (value, &self.kind) {
            (FieldValue::Blank, _) => Ok(()),
            (FieldValue::Rows(_), FieldKind::Rows { .. }) => Ok(()),
            (FieldValue::Rows(_), _) | (_, FieldKind::Rows { .. }) => Err(FieldError::NotEditable),
            _ => self.parse(&value.to_raw()).map(|_| ()),
        }
    }

    /// Whether `value` satisfies this field's requirement
    pub fn is_satisfied_by(&self, value: Option<&FieldValue>) -> bool {
        match self.requirement {
            Requirement::Optional => true,
            Requirement::Required => value.is_some_and(|v| !v.is_blank()),
            Requirement::Positive => value
                .and_then(FieldValue::as_number)
                .is_some_and(|n| n > 0.0),
        }
    }
}

/// Current value of one field
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Nothing entered; distinct from zero and false
    #[default]
    Blank,
    Number(f64),
    Text(String),
    Choice(String),
    Flag(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Rows(RowSet),
}

impl FieldValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Blank)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            FieldValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&RowSet> {
        match self {
            FieldValue::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_rows_mut(&mut self) -> Option<&mut RowSet> {
        match self {
            FieldValue::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Raw text form that parses back to the same value
    pub fn to_raw(&self) -> String {
        match self {
            FieldValue::Blank | FieldValue::Rows(_) => String::new(),
            FieldValue::Number(n) => format_plain(*n),
            FieldValue::Text(s) | FieldValue::Choice(s) => s.clone(),
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Time(t) => t.format("%H:%M").to_string(),
        }
    }
}

/// Format a number without a trailing `.0` for whole values
fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
