//! Exam countdown with a live one-second refresh

use std::fmt;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};

use crate::state::{ComputationResult, Derived, FieldSpec, Record, Rules};

pub const STORAGE_KEY: &str = "exam_countdown_data";

pub const REFRESH: Duration = Duration::from_secs(1);

pub const DEFAULT_NAME: &str = "Your Exam";

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("exam_name", "Exam Name"),
        FieldSpec::date("exam_date", "Exam Date (YYYY-MM-DD)").required(),
        FieldSpec::time("exam_time", "Exam Time (HH:MM)").required(),
    ]
}

/// Time left split into display units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// `None` once `target` is not in the future
    pub fn between(now: NaiveDateTime, target: NaiveDateTime) -> Option<Self> {
        let total = (target - now).num_seconds();
        if total <= 0 {
            return None;
        }
        Some(Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        })
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Countdown rules reading the current time from an injected clock
pub struct Countdown {
    clock: Box<dyn Fn() -> NaiveDateTime>,
}

impl Countdown {
    pub fn new(clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    /// Countdown against the local wall clock
    pub fn local() -> Self {
        Self::new(|| Local::now().naive_local())
    }
}

impl Rules for Countdown {
    fn compute(&self, record: &Record) -> ComputationResult {
        let (Some(date), Some(time)) = (record.date("exam_date"), record.time("exam_time")) else {
            return Ok(Derived::new());
        };
        let name = match record.text("exam_name").trim() {
            "" => DEFAULT_NAME,
            name => name,
        };

        match Remaining::between((self.clock)(), date.and_time(time)) {
            Some(left) => Ok(Derived::new()
                .headline(name, left.to_string())
                .entry("Days", left.days.to_string())
                .entry("Hours", format!("{:02}", left.hours))
                .entry("Minutes", format!("{:02}", left.minutes))
                .entry("Seconds", format!("{:02}", left.seconds))),
            None => Ok(Derived::new()
                .headline("Exam Time!", name)
                .entry("Days", "0")
                .entry("Hours", "0")
                .entry("Minutes", "0")
                .entry("Seconds", "0")
                .finished()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FormState, Outcome};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Instant;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    /// Clock the test can move forward
    fn shared_clock(start: NaiveDateTime) -> (Rc<Cell<NaiveDateTime>>, Countdown) {
        let now = Rc::new(Cell::new(start));
        let reader = Rc::clone(&now);
        (now, Countdown::new(move || reader.get()))
    }

    fn form(countdown: Countdown) -> FormState {
        FormState::new(specs(), countdown)
            .with_storage_key(STORAGE_KEY)
            .with_live_refresh(REFRESH)
    }

    #[test]
    fn test_remaining_units() {
        let left = Remaining::between(at(2026, 5, 1, 8, 0, 0), at(2026, 5, 3, 9, 30, 5)).unwrap();
        assert_eq!(
            left,
            Remaining {
                days: 2,
                hours: 1,
                minutes: 30,
                seconds: 5
            }
        );
        assert_eq!(left.to_string(), "2d 01:30:05");
    }

    #[test]
    fn test_past_or_equal_target_has_nothing_left() {
        let now = at(2026, 5, 1, 9, 0, 0);
        assert_eq!(Remaining::between(now, now), None);
        assert_eq!(Remaining::between(now, at(2026, 4, 30, 9, 0, 0)), None);
    }

    #[test]
    fn test_missing_date_is_not_ready() {
        let (_, countdown) = shared_clock(at(2026, 5, 1, 9, 0, 0));
        let mut form = form(countdown);
        form.update_field("exam_date", "2026-05-02", Instant::now())
            .unwrap();
        assert_eq!(form.evaluate(), Outcome::NotReady);
    }

    #[test]
    fn test_blank_name_uses_default() {
        let (_, countdown) = shared_clock(at(2026, 5, 1, 9, 0, 0));
        let mut form = form(countdown);
        let now = Instant::now();
        form.update_field("exam_date", "2026-05-02", now).unwrap();
        form.update_field("exam_time", "09:00", now).unwrap();
        let outcome = form.evaluate();
        let derived = outcome.derived().unwrap();
        assert_eq!(derived.headline_pair(), Some((DEFAULT_NAME, "1d 00:00:00")));
        assert!(!derived.is_finished());
    }

    #[test]
    fn test_ticks_until_exam_time_then_stops() {
        let storage = MemoryStorage::new();
        let (clock, countdown) = shared_clock(at(2026, 5, 1, 8, 59, 58));
        let mut form = form(countdown);
        let start = Instant::now();
        form.update_field("exam_name", "Physics", start).unwrap();
        form.update_field("exam_date", "2026-05-01", start).unwrap();
        form.update_field("exam_time", "09:00", start).unwrap();

        let first = form.recompute(start, &storage);
        assert_eq!(first.outcome.derived().and_then(|d| d.get("Seconds")), Some("02"));
        assert!(form.is_live());

        clock.set(at(2026, 5, 1, 8, 59, 59));
        let second = form.poll(start + REFRESH, &storage).unwrap();
        assert_eq!(second.outcome.derived().and_then(|d| d.get("Seconds")), Some("01"));

        clock.set(at(2026, 5, 1, 9, 0, 0));
        let last = form.poll(start + REFRESH * 2, &storage).unwrap();
        let derived = last.outcome.derived().unwrap();
        assert_eq!(derived.headline_pair(), Some(("Exam Time!", "Physics")));
        assert!(derived.is_finished());
        assert!(!form.is_live());
        assert!(form.poll(start + REFRESH * 3, &storage).is_none());
    }

    #[test]
    fn test_reset_cancels_ticker() {
        let storage = MemoryStorage::new();
        let (_, countdown) = shared_clock(at(2026, 5, 1, 9, 0, 0));
        let mut form = form(countdown);
        let start = Instant::now();
        form.update_field("exam_date", "2026-06-01", start).unwrap();
        form.update_field("exam_time", "10:00", start).unwrap();
        form.recompute(start, &storage);
        assert!(form.is_live());
        assert!(storage.contains(STORAGE_KEY));

        form.reset(&storage).unwrap();
        assert!(!form.is_live());
        assert!(!storage.contains(STORAGE_KEY));
        assert!(form.poll(start + REFRESH * 5, &storage).is_none());
    }
}
