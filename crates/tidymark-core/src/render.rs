//! HTML rendering of assembled document trees.
//!
//! The renderer builds a synthetic level-0 root, attaches the input parts
//! as level-2 sections, applies the persisted render-time corrections, and
//! converts the combined Markdown to HTML through the page template. Every
//! written artifact is recorded in an audit log (relative path, timestamp,
//! SHA-256, size) under the working directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use minijinja::context;
use pulldown_cmark::{html, Options, Parser};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::NotebookConfig;
use crate::error::Result;
use crate::mapping::LookupMap;
use crate::notebook::{write_text, HASH_LOG_FILE, RENDER_CHANGES_FILE};
use crate::part::MarkdownPart;
use crate::templates::Templates;

/// Renders document parts to HTML pages inside a notebook.
pub struct Renderer<'a> {
    config: &'a NotebookConfig,
    templates: &'a Templates,
    root: PathBuf,
    changes: LookupMap,
    options: Options,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer for the notebook rooted at `root`, loading the
    /// render-time correction map from the working directory.
    pub fn new(root: &Path, config: &'a NotebookConfig, templates: &'a Templates) -> Result<Self> {
        let changes_path = root.join(&config.working_path).join(RENDER_CHANGES_FILE);
        let changes = LookupMap::load(&changes_path)?;

        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Ok(Self {
            config,
            templates,
            root: root.to_path_buf(),
            changes,
            options,
        })
    }

    /// Assembles `parts` under a synthetic root titled `title`, renders the
    /// result to HTML and writes it to `destination`.
    pub fn render(&self, parts: &[MarkdownPart], title: &str, destination: &Path) -> Result<()> {
        info!("rendering {} parts to {}", parts.len(), destination.display());

        let mut assembled = MarkdownPart::container(title);
        for part in parts {
            let mut section = part.clone();
            section.set_level(2);
            assembled.parts.push(section);
        }
        for (pattern, replacement) in self.changes.iter() {
            assembled.make_replacement(pattern, replacement, true)?;
        }

        let markdown = assembled.combine(false);
        let mut body = String::new();
        html::push_html(&mut body, Parser::new_ext(&markdown, self.options));

        let page = self.templates.render(
            "page.html",
            context! {
                notebook_name => self.config.notebook_name.clone(),
                title => title,
                body => body,
            },
        )?;
        write_text(destination, &page)?;
        self.log_artifact(destination)?;
        Ok(())
    }

    /// Appends a CSV audit row for a freshly written artifact.
    fn log_artifact(&self, path: &Path) -> Result<()> {
        let bytes = fs::read(path)?;
        let digest = Sha256::digest(&bytes);
        let sha: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let row = format!(
            "\"{}\",{},{},{}\n",
            rel.display(),
            chrono::Utc::now().to_rfc3339(),
            sha,
            bytes.len()
        );

        let log_path = self.root.join(&self.config.working_path).join(HASH_LOG_FILE);
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut log = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        log.write_all(row.as_bytes())?;
        debug!("logged artifact {} ({sha})", rel.display());
        Ok(())
    }
}
