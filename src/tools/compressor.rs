//! Image compressor: re-encode a JPEG, PNG or WebP file at a chosen quality
//!
//! The form only names the source and the settings; the export action does
//! the decoding and writes `compressed_<name>` to the export directory.

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::state::{ComputationResult, Derived, FieldSpec, FieldValue, Record, ValidationError};

pub const DEFAULT_QUALITY: u8 = 80;

pub fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("source", "Image Path (JPEG, PNG or WebP)").required(),
        FieldSpec::integer("quality", "Quality (%)")
            .min(1.0)
            .max(100.0)
            .default_value(FieldValue::Number(f64::from(DEFAULT_QUALITY))),
    ]
}

/// Source path as typed or pasted, without surrounding quotes
pub fn source_path(record: &Record) -> PathBuf {
    let raw = record.text("source").trim();
    PathBuf::from(raw.trim_matches(|c| c == '"' || c == '\''))
}

pub fn quality(record: &Record) -> u8 {
    record
        .number("quality")
        .map(|q| q as u8)
        .unwrap_or(DEFAULT_QUALITY)
}

/// Name of the compressed copy, e.g. `compressed_photo.jpg`
pub fn output_name(source: &Path) -> Option<String> {
    source
        .file_name()
        .map(|name| format!("compressed_{}", name.to_string_lossy()))
}

pub fn compute(record: &Record) -> ComputationResult {
    let source = source_path(record);
    let invalid = || {
        ValidationError::new(
            "source",
            "Please select a valid image file (JPEG, PNG, or WebP)",
        )
    };
    let encoding = match ImageFormat::from_path(&source).map_err(|_| invalid())? {
        ImageFormat::Jpeg => format!("JPEG, {}% quality", quality(record)),
        ImageFormat::Png => "PNG, lossless".to_string(),
        ImageFormat::WebP => "WebP, lossless".to_string(),
        _ => return Err(invalid()),
    };
    let output = output_name(&source).ok_or_else(invalid)?;
    Ok(Derived::new()
        .headline("Output File", output)
        .entry("Source", source.display().to_string())
        .entry("Encoding", encoding))
}
