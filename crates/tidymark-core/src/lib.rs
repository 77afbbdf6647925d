//! Core library for tidymark, a Markdown notebook manager.
//!
//! A notebook is a directory of dated Markdown notes plus templates,
//! lookup maps and rendered HTML output. This crate provides:
//!
//! - [`MarkdownPart`]: a recursive document tree parsed from ATX headings,
//!   with byte-stable serialization via [`MarkdownPart::combine`]
//! - [`Notebook`]: the store that loads, generates, cleans and writes notes
//! - [`Renderer`]: HTML rendering of assembled note trees through templates
//! - [`LookupMap`]: the persisted heading and correction maps
//!
//! # Example
//!
//! ```no_run
//! use tidymark_core::{Notebook, Result};
//!
//! fn run() -> Result<()> {
//!     let mut notebook = Notebook::open(std::path::Path::new("."))?;
//!     notebook.clean()?;
//!     notebook.render_full()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod heading;
pub mod mapping;
pub mod notebook;
pub mod part;
pub mod render;
pub mod templates;

pub use config::NotebookConfig;
pub use error::{Error, Result};
pub use mapping::LookupMap;
pub use notebook::{Notebook, NOTE_LEVEL, PROJECT_LEVEL, TASK_LEVEL};
pub use part::{MarkdownPart, Origin};
pub use render::Renderer;
pub use templates::Templates;
