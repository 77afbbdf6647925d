//! Persistent string-to-string lookup maps.
//!
//! Project names, task names, text corrections and render-time changes all
//! live on disk as JSON objects. The file is the source of truth: a cleanup
//! pass reads it fully, merges newly discovered keys, and rewrites it fully.
//! Insertion order is preserved on rewrite; only the heading-normalization
//! pass sorts keys alphabetically before persisting.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// An ordered mapping from string key to string value, backed by a JSON file.
///
/// Users hand-edit these files to rename headings or add corrections, so
/// values that are not strings are tolerated on load and ignored during
/// lookup.
#[derive(Debug, Clone, Default)]
pub struct LookupMap {
    entries: serde_json::Map<String, Value>,
}

impl LookupMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a map from `path`. A missing file yields an empty map.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("lookup map {} not found, starting empty", path.display());
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(path)?;
        let entries: serde_json::Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|err| {
                Error::Serialization(format!("invalid lookup map {}: {err}", path.display()))
            })?;
        Ok(Self { entries })
    }

    /// Writes the map to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Looks up the value for `key`. Non-string values are treated as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Inserts or replaces a mapping.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    /// Ensures `key` is present, defaulting to the identity mapping.
    /// Returns true if the key was newly added.
    pub fn ensure(&mut self, key: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries
            .insert(key.to_string(), Value::String(key.to_string()));
        true
    }

    /// Re-orders the entries so keys are sorted alphabetically.
    pub fn sort_keys(&mut self) {
        let mut pairs: Vec<(String, Value)> = std::mem::take(&mut self.entries)
            .into_iter()
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        self.entries = pairs.into_iter().collect();
    }

    /// Iterates over string-valued entries in map order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|v| (key.as_str(), v)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
