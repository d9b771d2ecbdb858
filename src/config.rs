//! Configuration handling for the app

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tools::{ToolId, ToolSettings};

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "campus-kit";
const APPLICATION: &str = "campus-kit";

/// User configuration, every field optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Quiet period before a recompute, in milliseconds
    pub debounce_ms: Option<u64>,
    /// Where form snapshots are kept
    pub storage_dir: Option<PathBuf>,
    /// Where exported files are written
    pub export_dir: Option<PathBuf>,
    /// Words per minute for reading time estimates
    pub reading_speed_wpm: Option<u32>,
    /// Tool selected at startup, by slug
    pub default_tool: Option<String>,
}

impl AppConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file, defaulting when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }


    pub fn debounce(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(crate::state::DEFAULT_DEBOUNCE)
    }

    pub fn tool_settings(&self) -> ToolSettings {
        let defaults = ToolSettings::default();
        ToolSettings {
            debounce: self.debounce(),
            reading_speed_wpm: self
                .reading_speed_wpm
                .filter(|wpm| *wpm > 0)
                .unwrap_or(defaults.reading_speed_wpm),
        }
    }

    /// Tool selected at startup; unknown slugs fall back to the first tool
    pub fn default_tool(&self) -> ToolId {
        self.default_tool
            .as_deref()
            .and_then(ToolId::from_slug)
            .unwrap_or(ToolId::ALL[0])
    }

    /// Directory for form snapshots, if one can be determined
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("forms")))
    }

    /// Directory for exports; the working directory when nothing else is known
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(|| directories::UserDirs::new().and_then(|u| u.document_dir().map(Path::to_path_buf)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Log file location
    pub fn log_path() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(std::env::temp_dir)
            .join("campus-kit.log")
    }
}
