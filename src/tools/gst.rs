//! GST add/remove calculator

use crate::state::{ComputationResult, Derived, FieldSpec, FieldValue, Record, ValidationError};

use super::format;

pub const STORAGE_KEY: &str = "gst_calculator_data";

pub const MODES: &[&str] = &["add", "remove"];

pub const RATES: &[&str] = &["0", "5", "12", "18", "28"];

/// Rate selected on a fresh or reset form
pub const DEFAULT_RATE: &str = "18";

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::choice("mode", "Calculation Type", MODES),
        FieldSpec::number("amount", "Amount (₹)").positive(),
        FieldSpec::choice("rate", "GST Rate (%)", RATES)
            .default_value(FieldValue::Choice(DEFAULT_RATE.to_string())),
    ]
}

/// A price split into its base and tax components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub base: f64,
    pub gst: f64,
    pub total: f64,
}

/// Add GST on top of a base amount
pub fn forward(base: f64, rate: f64) -> Split {
    let gst = base * rate / 100.0;
    Split {
        base,
        gst,
        total: base + gst,
    }
}

/// Extract GST from a tax-inclusive total
pub fn reverse(total: f64, rate: f64) -> Split {
    let base = total / (1.0 + rate / 100.0);
    Split {
        base,
        gst: total - base,
        total,
    }
}

pub fn compute(record: &Record) -> ComputationResult {
    let amount = record.number("amount").unwrap_or_default();
    let rate: f64 = record
        .text("rate")
        .parse()
        .map_err(|_| ValidationError::new("rate", "Select a GST rate"))?;

    let adding = record.text("mode") != "remove";
    let split = if adding {
        forward(amount, rate)
    } else {
        reverse(amount, rate)
    };

    let derived = if adding {
        Derived::new().headline("Total Amount (Including GST)", format::currency(split.total))
    } else {
        Derived::new().headline("Base Amount (Excluding GST)", format::currency(split.base))
    };
    Ok(derived
        .entry("Base Amount", format::currency(split.base))
        .entry("GST Rate", format::percentage(rate))
        .entry("GST Amount", format::currency(split.gst))
        .entry("Total Amount", format::currency(split.total)))
}
