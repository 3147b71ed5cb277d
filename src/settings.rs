//! User settings
//!
//! Settings live in a small TOML file. Every key is optional:
//!
//! ```toml
//! use_external_source = true
//! external_source_path = "drawings/titleblock.xlsx"
//! sheet_name = "TitleBlock"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::filler::TITLE_BLOCK_SHEET;

/// Errors that can occur when loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    /// External source requested without a path to read it from
    #[error("use_external_source is set but external_source_path is missing")]
    MissingExternalSource,
}

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Read the title-block table from `external_source_path` instead of the
    /// document's own spreadsheet
    pub use_external_source: bool,
    /// Workbook or CSV file used when `use_external_source` is set
    pub external_source_path: Option<PathBuf>,
    /// Name of the spreadsheet object holding the table
    pub sheet_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_external_source: false,
            external_source_path: None,
            sheet_name: TITLE_BLOCK_SHEET.to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    ///
    /// A relative `external_source_path` is resolved against the file's
    /// directory.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_str(&content)?;
        if let (Some(source), Some(dir)) = (&settings.external_source_path, path.parent()) {
            if source.is_relative() {
                settings.external_source_path = Some(dir.join(source));
            }
        }
        Ok(settings)
    }

    /// Load settings from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.use_external_source && self.external_source_path.is_none() {
            return Err(SettingsError::MissingExternalSource);
        }
        Ok(())
    }

    /// Read the table from an external file
    pub fn with_external_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.use_external_source = true;
        self.external_source_path = Some(path.into());
        self
    }

    /// Set the spreadsheet name
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// The external source to use, if enabled
    pub fn external_source(&self) -> Option<&Path> {
        if self.use_external_source {
            self.external_source_path.as_deref()
        } else {
            None
        }
    }
}
