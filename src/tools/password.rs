//! Password generator and strength meter

use rand::seq::SliceRandom;
use rand::Rng;

use crate::state::{ComputationResult, Derived, FieldSpec, FieldValue, Record, ValidationError};

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const DEFAULT_LENGTH: f64 = 16.0;

/// Flag field key and the characters it enables
const CLASSES: [(&str, &str); 4] = [
    ("uppercase", UPPERCASE),
    ("lowercase", LOWERCASE),
    ("numbers", NUMBERS),
    ("symbols", SYMBOLS),
];

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::integer("length", "Password Length")
            .min(4.0)
            .max(64.0)
            .default_value(FieldValue::Number(DEFAULT_LENGTH)),
        FieldSpec::flag("uppercase", "Include Uppercase (A-Z)").default_value(FieldValue::Flag(true)),
        FieldSpec::flag("lowercase", "Include Lowercase (a-z)").default_value(FieldValue::Flag(true)),
        FieldSpec::flag("numbers", "Include Numbers (0-9)").default_value(FieldValue::Flag(true)),
        FieldSpec::flag("symbols", "Include Symbols (!@#$...)").default_value(FieldValue::Flag(true)),
        FieldSpec::text("password", "Generated Password").required(),
    ]
}

/// Build a password from the record's options.
///
/// Every selected class contributes at least one character; the rest is
/// drawn from the union and the result is shuffled.
pub fn generate<R: Rng>(record: &Record, rng: &mut R) -> Result<String, ValidationError> {
    let selected: Vec<&str> = CLASSES
        .iter()
        .filter(|(key, _)| record.flag(key))
        .map(|(_, chars)| *chars)
        .collect();
    if selected.is_empty() {
        return Err(ValidationError::new(
            "uppercase",
            "Please select at least one character type",
        ));
    }

    let length = record.number("length").unwrap_or(DEFAULT_LENGTH).max(0.0) as usize;
    let charset: Vec<char> = selected.iter().flat_map(|s| s.chars()).collect();

    let mut password: Vec<char> = selected
        .iter()
        .map(|class| pick(class.as_bytes(), rng))
        .collect();
    while password.len() < length {
        password.push(charset[rng.random_range(0..charset.len())]);
    }
    password.shuffle(rng);
    Ok(password.into_iter().collect())
}

fn pick<R: Rng>(class: &[u8], rng: &mut R) -> char {
    char::from(class[rng.random_range(0..class.len())])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Strength {
    /// Length bucket (0/1/2 for <8, <12, >=12) plus character variety minus one
    pub fn score(password: &str) -> i32 {
        let length = password.chars().count();
        let length_score = match length {
            0..=7 => 0,
            8..=11 => 1,
            _ => 2,
        };
        let has = |pred: fn(&char) -> bool| password.chars().any(|c| pred(&c)) as i32;
        let variety = has(char::is_ascii_lowercase)
            + has(char::is_ascii_uppercase)
            + has(char::is_ascii_digit)
            + has(|c| !c.is_ascii_alphanumeric());
        length_score + variety - 1
    }

    pub fn of(password: &str) -> Self {
        match Self::score(password) {
            s if s >= 5 => Self::VeryStrong,
            4 => Self::Strong,
            3 => Self::Moderate,
            2 => Self::Weak,
            _ => Self::VeryWeak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }

    pub fn percentage(&self) -> u8 {
        match self {
            Self::VeryWeak => 20,
            Self::Weak => 40,
            Self::Moderate => 60,
            Self::Strong => 80,
            Self::VeryStrong => 100,
        }
    }
}

pub fn compute(record: &Record) -> ComputationResult {
    let password = record.text("password");
    let strength = Strength::of(password);
    Ok(Derived::new()
        .headline("Password Strength", strength.label())
        .entry("Meter", format!("{}%", strength.percentage()))
        .entry("Length", password.chars().count().to_string()))
}
