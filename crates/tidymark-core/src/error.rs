//! Error types and result alias for tidymark-core operations.
//!
//! All public functions in this crate return [`Result<T>`] so callers get a
//! single error type to match on. Structural failures (a document with no
//! locatable title, a malformed configuration file) are surfaced immediately
//! and never masked; idempotent no-ops such as rewriting identical content
//! are not errors at all.

use thiserror::Error;

/// The main error type for tidymark-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying file system operation failed.
    ///
    /// Covers reads and writes of notes, lookup maps, templates and rendered
    /// artifacts. The original `std::io::Error` is preserved.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A text block could not be parsed into a document part.
    ///
    /// Raised when no title heading can be located, when a front-matter
    /// block is unterminated, or when the front-matter YAML is malformed.
    /// Not recovered locally; a bad note aborts the operation that read it.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Notebook configuration is absent or malformed.
    ///
    /// Fatal at store construction. No partially configured notebook is
    /// ever returned.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A user-supplied correction or extraction pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Encoding or decoding of a persisted JSON mapping failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A note or page template is missing or failed to render.
    #[error("Template error: {0}")]
    Template(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

/// Result alias used throughout tidymark-core.
pub type Result<T> = std::result::Result<T, Error>;
