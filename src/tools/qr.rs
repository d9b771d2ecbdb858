//! QR code builder
//!
//! Encodes the selected content type into a payload, draws the symbol with
//! terminal block characters and exports it as a PNG.

use qrcode::render::unicode::Dense1x2;
use qrcode::QrCode;

use crate::state::{
    ComputationResult, Derived, FieldSpec, FieldValue, Record, Rules, ValidationError,
};

pub const KINDS: &[&str] = &["text", "url", "email", "phone", "wifi"];

pub const SECURITY: &[&str] = &["WPA", "WEP", "nopass"];

/// File written by the export action
pub const EXPORT_FILE: &str = "qrcode.png";

pub const DEFAULT_SIZE: u32 = 400;

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::choice("kind", "Content Type", KINDS),
        FieldSpec::text("content", "Content (text, URL, email or phone)"),
        FieldSpec::text("ssid", "WiFi Network Name (SSID)"),
        FieldSpec::text("wifi_password", "WiFi Password"),
        FieldSpec::choice("security", "WiFi Security", SECURITY),
        FieldSpec::integer("size", "PNG Size (px)")
            .min(100.0)
            .max(1000.0)
            .default_value(FieldValue::Number(f64::from(DEFAULT_SIZE))),
    ]
}

/// Field that carries the content for the selected type
fn source_field(record: &Record) -> &'static str {
    if record.text("kind") == "wifi" {
        "ssid"
    } else {
        "content"
    }
}

/// Rules for the QR form: which input is needed depends on the type
pub struct QrRules;

impl Rules for QrRules {
    fn ready(&self, record: &Record) -> bool {
        !record.text(source_field(record)).trim().is_empty()
    }

    fn compute(&self, record: &Record) -> ComputationResult {
        compute(record)
    }
}

/// PNG edge length requested for export
pub fn size(record: &Record) -> u32 {
    record
        .number("size")
        .map(|px| px as u32)
        .unwrap_or(DEFAULT_SIZE)
}

/// Encode the record's content for the selected type
pub fn payload(record: &Record) -> Result<String, ValidationError> {
    let kind = record.text("kind");
    if kind == "wifi" {
        let ssid = record.text("ssid").trim();
        if ssid.is_empty() {
            return Err(ValidationError::new("ssid", "Please enter WiFi SSID"));
        }
        return Ok(format!(
            "WIFI:T:{};S:{};P:{};;",
            record.text("security"),
            ssid,
            record.text("wifi_password").trim()
        ));
    }

    let content = record.text("content").trim();
    if content.is_empty() {
        return Err(ValidationError::new("content", "Please enter content"));
    }
    let encoded = match kind {
        "url" if content.starts_with("http://") || content.starts_with("https://") => {
            content.to_string()
        }
        "url" => format!("https://{content}"),
        "email" if !content.contains('@') => {
            return Err(ValidationError::new(
                "content",
                "Please enter a valid email address",
            ));
        }
        "email" => format!("mailto:{content}"),
        "phone" => format!("tel:{content}"),
        _ => content.to_string(),
    };
    Ok(encoded)
}

/// The symbol as rows of half-block characters, light on dark
pub fn render_symbol(code: &QrCode) -> String {
    code.render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build()
}

pub fn compute(record: &Record) -> ComputationResult {
    let payload = payload(record)?;
    let code = QrCode::new(payload.as_bytes()).map_err(|_| {
        ValidationError::new(source_field(record), "Content is too long for a QR code")
    })?;
    let px = size(record);
    Ok(Derived::new()
        .headline("Payload", payload.as_str())
        .entry("Type", record.text("kind"))
        .entry("Length", format!("{} characters", payload.chars().count()))
        .entry("PNG Size", format!("{px} × {px} px"))
        .entry("Symbol", render_symbol(&code)))
}
