//! Notebook configuration.
//!
//! A notebook root carries a `config.json` naming the subdirectory layout,
//! a display name and a set of named date formats. The format entries named
//! `path` and `file` drive note placement; the rest are free for templates
//! to interpolate.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

fn default_rendered_path() -> String {
    "rendered".to_string()
}

/// Layout and naming settings for a notebook, read from `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookConfig {
    /// Display name, used for page titles and the full-notebook output file.
    pub notebook_name: String,
    /// Subdirectory holding the Markdown notes.
    pub note_path: String,
    /// Subdirectory holding the note and page templates.
    pub template_path: String,
    /// Subdirectory holding the lookup-map files and audit log.
    pub working_path: String,
    /// Subdirectory receiving rendered HTML output.
    #[serde(default = "default_rendered_path")]
    pub rendered_path: String,
    /// Named strftime-style formats; `path` and `file` locate new notes.
    pub date_formats: BTreeMap<String, String>,
}

impl NotebookConfig {
    /// Loads the configuration from `path`. A missing or malformed file is
    /// fatal; no partially configured notebook is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "missing configuration file: {}",
                path.display()
            )));
        }
        debug!("reading configuration from {}", path.display());
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|err| {
            Error::Config(format!("invalid configuration {}: {err}", path.display()))
        })
    }

    /// Formats `date` with every configured format, keyed by format name.
    #[must_use]
    pub fn format_date(&self, date: NaiveDate) -> BTreeMap<String, String> {
        self.date_formats
            .iter()
            .map(|(name, format)| (name.clone(), date.format(format).to_string()))
            .collect()
    }

    /// Parses a date string against each configured format in turn, then
    /// against ISO `%Y-%m-%d` as a fallback.
    pub fn parse_date(&self, input: &str) -> Result<NaiveDate> {
        for format in self.date_formats.values() {
            if let Ok(date) = NaiveDate::parse_from_str(input, format) {
                return Ok(date);
            }
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map_err(|_| Error::Parse(format!("unrecognised date string: {input}")))
    }
}
