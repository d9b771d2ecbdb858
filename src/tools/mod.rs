//! The calculators hosted by the app
//!
//! Each module declares its fields and a pure compute function; [`ToolId`]
//! wires them into a [`FormState`] with the right storage key and timers.

pub mod attendance;
pub mod cgpa;
pub mod compressor;
pub mod countdown;
pub mod finance;
pub mod format;
pub mod gst;
pub mod password;
pub mod qr;
pub mod resume;
pub mod word_counter;

use std::time::Duration;

use crate::services::ExportJob;
use crate::state::{Derived, FieldValue, FormState};

/// Engine settings shared by every tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub debounce: Duration,
    pub reading_speed_wpm: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            debounce: crate::state::DEFAULT_DEBOUNCE,
            reading_speed_wpm: word_counter::DEFAULT_READING_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    Attendance,
    Cgpa,
    Emi,
    Gst,
    Password,
    WordCounter,
    Countdown,
    Resume,
    Qr,
    Compressor,
}

impl ToolId {
    pub const ALL: [ToolId; 10] = [
        ToolId::Attendance,
        ToolId::Cgpa,
        ToolId::Emi,
        ToolId::Gst,
        ToolId::Password,
        ToolId::WordCounter,
        ToolId::Countdown,
        ToolId::Resume,
        ToolId::Qr,
        ToolId::Compressor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ToolId::Attendance => "Attendance",
            ToolId::Cgpa => "CGPA",
            ToolId::Emi => "Loan EMI",
            ToolId::Gst => "GST",
            ToolId::Password => "Password",
            ToolId::WordCounter => "Word Counter",
            ToolId::Countdown => "Exam Countdown",
            ToolId::Resume => "Resume",
            ToolId::Qr => "QR Code",
            ToolId::Compressor => "Image Compressor",
        }
    }

    /// Stable name used in the config file
    pub fn slug(&self) -> &'static str {
        match self {
            ToolId::Attendance => "attendance",
            ToolId::Cgpa => "cgpa",
            ToolId::Emi => "emi",
            ToolId::Gst => "gst",
            ToolId::Password => "password",
            ToolId::WordCounter => "word-counter",
            ToolId::Countdown => "countdown",
            ToolId::Resume => "resume",
            ToolId::Qr => "qr",
            ToolId::Compressor => "image",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.slug() == slug)
    }

    /// Key under which the tool's record is persisted; `None` for tools
    /// whose inputs are not worth keeping
    pub fn storage_key(&self) -> Option<&'static str> {
        match self {
            ToolId::Attendance => Some(attendance::STORAGE_KEY),
            ToolId::Cgpa => Some(cgpa::STORAGE_KEY),
            ToolId::Emi => Some(finance::STORAGE_KEY),
            ToolId::Gst => Some(gst::STORAGE_KEY),
            ToolId::WordCounter => Some(word_counter::STORAGE_KEY),
            ToolId::Countdown => Some(countdown::STORAGE_KEY),
            ToolId::Resume => Some(resume::STORAGE_KEY),
            ToolId::Password | ToolId::Qr | ToolId::Compressor => None,
        }
    }

    /// Whether the tool has a generate action
    pub fn generates(&self) -> bool {
        matches!(self, ToolId::Password)
    }

    /// Whether the tool has an export action
    pub fn exports(&self) -> bool {
        matches!(self, ToolId::Resume | ToolId::Qr | ToolId::Compressor)
    }

    /// Work for the export action, or the reason there is nothing to export.
    /// `None` for tools without one.
    pub fn export_job(&self, form: &FormState) -> Option<Result<ExportJob, &'static str>> {
        let job = match self {
            ToolId::Resume => form
                .last_good()
                .and_then(|d| d.get("Markdown"))
                .map(|markdown| ExportJob::Text {
                    file: resume::EXPORT_FILE,
                    contents: markdown.to_string(),
                })
                .ok_or("Please generate resume first"),
            ToolId::Qr => form
                .last_good()
                .and_then(|d| d.get("Payload"))
                .map(|payload| ExportJob::QrCode {
                    file: qr::EXPORT_FILE,
                    payload: payload.to_string(),
                    size: qr::size(form.record()),
                })
                .ok_or("No QR code to download"),
            // the current inputs only, never a stale path
            ToolId::Compressor => match form.last_outcome().derived() {
                Some(derived) => {
                    let record = form.record();
                    derived
                        .get("Output File")
                        .map(|file| ExportJob::Compress {
                            source: compressor::source_path(record),
                            file: file.to_string(),
                            quality: compressor::quality(record),
                        })
                        .ok_or("No compressed image available")
                }
                None => Err("Please select an image to compress"),
            },
            _ => return None,
        };
        Some(job)
    }

    /// Build a fresh form for this tool. Call `initialize` afterwards to
    /// load saved data.
    pub fn build(&self, settings: &ToolSettings) -> Result<FormState, regex::Error> {
        let form = match self {
            ToolId::Attendance => FormState::new(attendance::specs(), attendance::compute),
            ToolId::Cgpa => FormState::new(cgpa::specs(), cgpa::compute),
            ToolId::Emi => FormState::new(finance::specs(), finance::compute),
            ToolId::Gst => FormState::new(gst::specs(), gst::compute),
            ToolId::Password => FormState::new(password::specs(), password::compute),
            ToolId::WordCounter => FormState::new(
                word_counter::specs(),
                word_counter::WordCounter::new(settings.reading_speed_wpm)?,
            ),
            ToolId::Countdown => FormState::new(countdown::specs(), countdown::Countdown::local())
                .with_live_refresh(countdown::REFRESH),
            ToolId::Resume => FormState::new(resume::specs(), resume::compute),
            ToolId::Qr => FormState::new(qr::specs(), qr::QrRules),
            ToolId::Compressor => FormState::new(compressor::specs(), compressor::compute),
        };
        let form = form.with_debounce(settings.debounce);
        Ok(match self.storage_key() {
            Some(key) => form.with_storage_key(key),
            None => form,
        })
    }

    /// Text placed on the clipboard by the copy action
    pub fn copy_text(&self, form: &FormState) -> Option<String> {
        let record = form.record();
        let text = match self {
            ToolId::Password => record.get("password").and_then(FieldValue::as_text)?,
            ToolId::WordCounter => record.get("text").and_then(FieldValue::as_text)?,
            _ => {
                // an input error leaves the previous result copyable
                let derived = form.last_good()?;
                return Some(match self {
                    ToolId::Resume => derived.get("Markdown")?.to_string(),
                    ToolId::Qr => derived.get("Payload")?.to_string(),
                    _ => summary(derived),
                });
            }
        };
        (!text.trim().is_empty()).then(|| text.to_string())
    }
}

/// Plain-text rendering of a result, one `label: value` per line
pub fn summary(derived: &Derived) -> String {
    derived
        .headline_pair()
        .into_iter()
        .chain(derived.entries())
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
