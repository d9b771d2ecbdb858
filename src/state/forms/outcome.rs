//! Computation results and the rules seam

use thiserror::Error;

use super::record::Record;

/// Domain rule violation raised by a tool's rules
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    /// Key (or row path) of the offending field
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Display-ready values derived from a record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Derived {
    headline: Option<(String, String)>,
    entries: Vec<(String, String)>,
    finished: bool,
}

impl Derived {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main figure of the result
    pub fn headline(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.headline = Some((label.into(), value.into()));
        self
    }

    pub fn entry(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((label.into(), value.into()));
        self
    }

    /// Mark a time-based result as final so live refresh stops
    pub fn finished(mut self) -> Self {
        self.finished = true;
        self
    }

    pub fn headline_pair(&self) -> Option<(&str, &str)> {
        self.headline.as_ref().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    /// Value of the headline or an entry by label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.headline
            .iter()
            .chain(self.entries.iter())
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Either a fully populated result or the reason there is none
pub type ComputationResult = Result<Derived, ValidationError>;

/// Pure computation supplied by each tool
pub trait Rules {
    /// Inputs the field requirements cannot express on their own.
    /// `false` keeps the form `NotReady` without an error.
    fn ready(&self, _record: &Record) -> bool {
        true
    }

    fn compute(&self, record: &Record) -> ComputationResult;
}

impl<F> Rules for F
where
    F: Fn(&Record) -> ComputationResult,
{
    fn compute(&self, record: &Record) -> ComputationResult {
        self(record)
    }
}

/// What the engine has to show for the current record
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Outcome {
    /// Required inputs missing; nothing to show and no error
    #[default]
    NotReady,
    Ready(Derived),
    Invalid(ValidationError),
}

impl Outcome {
    pub fn derived(&self) -> Option<&Derived> {
        match self {
            Outcome::Ready(derived) => Some(derived),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }
}

impl From<ComputationResult> for Outcome {
    fn from(result: ComputationResult) -> Self {
        match result {
            Ok(derived) => Outcome::Ready(derived),
            Err(err) => Outcome::Invalid(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_lookup_covers_headline_and_entries() {
        let derived = Derived::new()
            .headline("EMI", "₹8,791.59")
            .entry("Total Interest", "₹5,499.06");
        assert_eq!(derived.get("EMI"), Some("₹8,791.59"));
        assert_eq!(derived.get("Total Interest"), Some("₹5,499.06"));
        assert_eq!(derived.get("Missing"), None);
        assert!(!derived.is_finished());
    }

    #[test]
    fn test_closures_are_rules() {
        let rules = |record: &Record| -> ComputationResult {
            if record.iter().count() == 0 {
                Err(ValidationError::new("x", "empty"))
            } else {
                Ok(Derived::new())
            }
        };
        let outcome: Outcome = rules.compute(&Record::default()).into();
        assert_eq!(outcome, Outcome::Invalid(ValidationError::new("x", "empty")));
    }
}
