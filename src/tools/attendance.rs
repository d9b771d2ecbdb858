//! Attendance percentage and required classes

use crate::state::{ComputationResult, Derived, FieldSpec, Record, ValidationError};

use super::format;

pub const STORAGE_KEY: &str = "attendance_calculator_data";

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::number("total", "Total Classes").positive(),
        FieldSpec::number("attended", "Classes Attended")
            .min(0.0)
            .required(),
        FieldSpec::number("required_pct", "Required Percentage (optional)")
            .min(0.0)
            .max(100.0),
    ]
}

/// Classes still to attend to reach a target percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Classes that must be attended out of the total
    pub required: f64,
    /// Additional classes needed, never negative
    pub needed: f64,
    /// Classes not yet attended
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feasibility {
    Met,
    Reachable(f64),
    /// Even attending every remaining class falls short
    Unreachable { max_pct: f64 },
}

impl Target {
    pub fn new(total: f64, attended: f64, pct: f64) -> Self {
        let required = (pct / 100.0 * total).ceil();
        Self {
            required,
            needed: (required - attended).max(0.0),
            remaining: total - attended,
        }
    }

    pub fn feasibility(&self, total: f64, attended: f64) -> Feasibility {
        if self.needed == 0.0 {
            Feasibility::Met
        } else if self.needed <= self.remaining {
            Feasibility::Reachable(self.needed)
        } else {
            Feasibility::Unreachable {
                max_pct: (attended + self.remaining) / total * 100.0,
            }
        }
    }
}

pub fn compute(record: &Record) -> ComputationResult {
    let total = record.number("total").unwrap_or_default();
    let attended = record.number("attended").unwrap_or_default();
    if attended > total {
        return Err(ValidationError::new(
            "attended",
            "Attended classes cannot be greater than total classes",
        ));
    }

    let current = attended / total * 100.0;
    let mut derived = Derived::new()
        .headline("Attendance", format::percentage(current))
        .entry("Total Classes", format::number(total))
        .entry("Classes Attended", format::number(attended))
        .entry("Classes Absent", format::number(total - attended))
        .entry("Current Attendance", format::percentage(current));

    let Some(pct) = record.number("required_pct").filter(|p| *p > 0.0) else {
        return Ok(derived);
    };

    let target = Target::new(total, attended, pct);
    derived = derived
        .entry("Required Percentage", format::percentage(pct))
        .entry(
            "Required Classes",
            format!(
                "{} out of {}",
                format::number(target.required),
                format::number(total)
            ),
        );

    match target.feasibility(total, attended) {
        Feasibility::Met => Ok(derived.entry("Status", "You have met the required attendance!")),
        Feasibility::Reachable(needed) => Ok(derived.entry(
            "Status",
            format!(
                "You need to attend {} more {} to meet the requirement.",
                format::number(needed),
                if needed > 1.0 { "classes" } else { "class" }
            ),
        )),
        Feasibility::Unreachable { max_pct } => Err(ValidationError::new(
            "required_pct",
            format!(
                "You cannot achieve {} attendance. Maximum possible: {}",
                format::percentage(pct),
                format::percentage(max_pct)
            ),
        )),
    }
}
