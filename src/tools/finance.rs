//! Loan EMI calculator

use crate::state::{ComputationResult, Derived, FieldSpec, Record};

use super::format;

pub const STORAGE_KEY: &str = "emi_calculator_data";

pub const TENURE_UNITS: &[&str] = &["years", "months"];

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::number("principal", "Loan Amount (₹)").positive(),
        FieldSpec::number("annual_rate", "Interest Rate (% per annum)")
            .max(100.0)
            .positive(),
        FieldSpec::number("tenure", "Loan Tenure").positive(),
        FieldSpec::choice("tenure_unit", "Tenure Unit", TENURE_UNITS),
    ]
}

/// Repayment schedule summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emi {
    pub monthly: f64,
    pub months: f64,
    pub total: f64,
    pub interest: f64,
}

impl Emi {
    /// `P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate.
    ///
    /// Rates too small to move `(1+r)^n` off 1.0 repay the principal flat.
    pub fn new(principal: f64, annual_rate_pct: f64, months: f64) -> Self {
        let r = annual_rate_pct / 1200.0;
        let growth = (1.0 + r).powf(months);
        let amortized = principal * r * growth / (growth - 1.0);
        let monthly = if growth - 1.0 > 0.0 && amortized.is_finite() {
            amortized
        } else {
            principal / months
        };
        let total = monthly * months;
        Self {
            monthly,
            months,
            total,
            interest: total - principal,
        }
    }
}

pub fn compute(record: &Record) -> ComputationResult {
    let principal = record.number("principal").unwrap_or_default();
    let rate = record.number("annual_rate").unwrap_or_default();
    let tenure = record.number("tenure").unwrap_or_default();
    let months = match record.text("tenure_unit") {
        "months" => tenure,
        _ => tenure * 12.0,
    };

    let emi = Emi::new(principal, rate, months);
    Ok(Derived::new()
        .headline("Monthly EMI", format::currency(emi.monthly))
        .entry("Loan Amount", format::currency(principal))
        .entry(
            "Interest Rate",
            format!("{} per annum", format::percentage(rate)),
        )
        .entry(
            "Loan Tenure",
            format!(
                "{} months ({:.1} years)",
                format::number(months),
                months / 12.0
            ),
        )
        .entry("Total Interest", format::currency(emi.interest))
        .entry("Total Amount", format::currency(emi.total)))
}
