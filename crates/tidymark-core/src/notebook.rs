//! The notebook store.
//!
//! A notebook is a directory tree: Markdown notes under `notes/`, templates
//! under `templates/`, lookup maps and the audit log under `working/`, and
//! HTML output under `rendered/`, all named by `config.json` at the root.
//! Notes are loaded fresh on open, mutated in memory by cleanup passes, and
//! flushed file by file only when their serialized content actually changed.
//!
//! Heading levels are fixed by convention: each note is a level-1 section,
//! its `##` headings are projects and its `###` headings are tasks.
//!
//! Nothing here takes locks. Two processes working on the same notebook
//! race last-writer-wins on the lookup maps and note files; each write is
//! independently idempotent, so re-running [`Notebook::clean`] converges.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate, Utc};
use minijinja::context;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::NotebookConfig;
use crate::error::{Error, Result};
use crate::mapping::LookupMap;
use crate::part::MarkdownPart;
use crate::render::Renderer;
use crate::templates::Templates;

/// Level assigned to every loaded note root.
pub const NOTE_LEVEL: usize = 1;
/// Level of project headings within a note.
pub const PROJECT_LEVEL: usize = 2;
/// Level of task headings within a project.
pub const TASK_LEVEL: usize = 3;

const CONFIG_FILE: &str = "config.json";
const PROJECT_MAP_FILE: &str = "project_names.json";
const TASK_MAP_FILE: &str = "task_names.json";
const CORRECTIONS_FILE: &str = "corrections.json";
pub(crate) const RENDER_CHANGES_FILE: &str = "render_changes.json";
pub(crate) const HASH_LOG_FILE: &str = "hash_log.csv";

/// Files written into a fresh notebook, as (name, subdirectory, content).
const SCAFFOLD: &[(&str, &str, &str)] = &[
    ("config.json", "", include_str!("../assets/config.json")),
    ("corrections.json", "working", include_str!("../assets/corrections.json")),
    (
        "render_changes.json",
        "working",
        include_str!("../assets/render_changes.json"),
    ),
    ("note.css", "templates", include_str!("../assets/note.css")),
    ("note.md", "templates", include_str!("../assets/note.md")),
    ("page.html", "templates", include_str!("../assets/page.html")),
];

/// A loaded notebook: configuration, templates and the active note set.
pub struct Notebook {
    root: PathBuf,
    config: NotebookConfig,
    templates: Templates,
    notes: Vec<MarkdownPart>,
}

impl Notebook {
    /// Opens the notebook at `path`, which may be the notebook directory or
    /// the configuration file itself. Loads every non-stub note.
    pub fn open(path: &Path) -> Result<Self> {
        let (root, config_path) = if path.is_file() {
            let root = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (root, path.to_path_buf())
        } else {
            (path.to_path_buf(), path.join(CONFIG_FILE))
        };
        let config = NotebookConfig::load(&config_path)?;
        let templates = Templates::from_dir(&root.join(&config.template_path))?;
        let mut notebook = Self {
            root,
            config,
            templates,
            notes: Vec::new(),
        };
        notebook.reload()?;
        Ok(notebook)
    }

    /// True if `path` looks like a notebook root.
    #[must_use]
    pub fn is_notebook(path: &Path) -> bool {
        path.join(CONFIG_FILE).is_file()
    }

    /// Populates `path` with a blank notebook scaffold. Existing files are
    /// never overwritten, so re-running against a live notebook is safe.
    pub fn initialise(path: &Path) -> Result<()> {
        info!("creating blank notebook in {}", path.display());
        for (name, subdir, content) in SCAFFOLD {
            let dir = if subdir.is_empty() {
                path.to_path_buf()
            } else {
                path.join(subdir)
            };
            fs::create_dir_all(&dir)?;
            let dest = dir.join(name);
            if !dest.exists() {
                debug!("writing {}", dest.display());
                fs::write(&dest, content)?;
            }
        }
        let config = NotebookConfig::load(&path.join(CONFIG_FILE))?;
        fs::create_dir_all(path.join(&config.note_path))?;
        Ok(())
    }

    /// Discards the in-memory note set and re-parses every note file.
    /// Stubs (blank notes) are skipped. A note that fails to parse aborts
    /// the whole reload.
    pub fn reload(&mut self) -> Result<()> {
        let mut notes = Vec::new();
        for path in self.note_files()? {
            let mut note = MarkdownPart::from_file(&path)?;
            if note.is_stub() {
                debug!("skipping stub note {}", path.display());
                continue;
            }
            note.set_level(NOTE_LEVEL);
            notes.push(note);
        }
        info!("loaded {} notes", notes.len());
        self.notes = notes;
        Ok(())
    }

    #[must_use]
    pub fn notes(&self) -> &[MarkdownPart] {
        &self.notes
    }

    #[must_use]
    pub fn config(&self) -> &NotebookConfig {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All Markdown files under the notes directory, sorted by file name
    /// rather than path so daily notes line up across year subdirectories.
    fn note_files(&self) -> Result<Vec<PathBuf>> {
        let notes_dir = self.root.join(&self.config.note_path);
        if !notes_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&notes_dir) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let is_md = path
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
            if is_md {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Generates a note for `date` from the note template. Returns false
    /// without touching anything when the destination already exists and
    /// `force` is not set.
    pub fn make_note(&mut self, date: NaiveDate, force: bool) -> Result<bool> {
        let formatted = self.config.format_date(date);
        let (Some(rel_dir), Some(file_name)) = (formatted.get("path"), formatted.get("file"))
        else {
            return Err(Error::Config(
                "date_formats must define 'path' and 'file' entries".to_string(),
            ));
        };
        let dest = self
            .root
            .join(&self.config.note_path)
            .join(rel_dir)
            .join(file_name);
        if dest.exists() && !force {
            debug!("note {} already exists, skipping", dest.display());
            return Ok(false);
        }

        let rendered = self.templates.render("note.md", context! { dates => formatted })?;
        let mut note = MarkdownPart::parse(&rendered)?;
        note.metadata.insert(
            "created".to_string(),
            serde_yaml::Value::String(Utc::now().to_rfc3339()),
        );
        note.to_file(&dest)?;
        info!("wrote note {}", dest.display());

        // Re-read so the in-memory copy carries its origin. Fresh notes are
        // usually stubs and stay out of the active set until edited.
        let mut note = MarkdownPart::from_file(&dest)?;
        if !note.is_stub() {
            note.set_level(NOTE_LEVEL);
            let slot = self.notes.iter().position(|existing| {
                existing
                    .origin
                    .as_ref()
                    .is_some_and(|origin| origin.path == dest)
            });
            match slot {
                Some(i) => self.notes[i] = note,
                None => self.notes.push(note),
            }
        }
        Ok(true)
    }

    /// Generates notes for `count` consecutive days starting at `start`.
    /// Existing notes are left alone. Returns the number created.
    pub fn make_series(&mut self, start: NaiveDate, count: u32) -> Result<u32> {
        let mut created = 0;
        for offset in 0..count {
            let date = start
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| Error::Parse("date out of range".to_string()))?;
            if self.make_note(date, false)? {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Merges every project and task heading into the persisted lookup maps
    /// (new entries map to themselves) and applies the possibly hand-edited
    /// maps back onto the loaded notes.
    pub fn update_projects_and_tasks(&mut self) -> Result<()> {
        self.normalize_headings(PROJECT_LEVEL, PROJECT_MAP_FILE)?;
        self.normalize_headings(TASK_LEVEL, TASK_MAP_FILE)?;
        Ok(())
    }

    fn normalize_headings(&mut self, level: usize, map_file: &str) -> Result<()> {
        let path = self.working_path(map_file);
        let mut map = LookupMap::load(&path)?;
        let mut added = 0;
        for note in &self.notes {
            for title in note.titles_at_level(level) {
                if map.ensure(&title) {
                    added += 1;
                }
            }
        }
        debug!("{added} new level-{level} headings merged into {map_file}");
        map.sort_keys();
        map.save(&path)?;
        for note in &mut self.notes {
            note.replace_title(&map, Some(level));
        }
        Ok(())
    }

    /// Applies the persisted regex corrections, in map order, to every
    /// loaded note body.
    pub fn text_corrections(&mut self) -> Result<()> {
        let map = LookupMap::load(&self.working_path(CORRECTIONS_FILE))?;
        for (pattern, replacement) in map.iter() {
            let re = regex::Regex::new(pattern)?;
            for note in &mut self.notes {
                note.replace_matches(&re, replacement);
            }
        }
        Ok(())
    }

    /// Runs heading normalization and text corrections, then flushes every
    /// changed note back to its origin file. Returns the number of files
    /// rewritten. Re-running on a clean notebook rewrites nothing.
    pub fn clean(&mut self) -> Result<usize> {
        self.update_projects_and_tasks()?;
        self.text_corrections()?;
        self.write_notes()
    }

    /// Writes each note back to where it came from, skipping notes whose
    /// serialized content is unchanged on disk.
    pub fn write_notes(&self) -> Result<usize> {
        let mut written = 0;
        for note in &self.notes {
            if let Some(origin) = &note.origin {
                if note.to_file(&origin.path)? {
                    debug!("rewrote {}", origin.path.display());
                    written += 1;
                }
            }
        }
        info!("{written} notes rewritten");
        Ok(written)
    }

    /// Pulls every subsection matching `pattern` out of every note, in note
    /// order. Each extracted copy is re-titled with its note's title and
    /// forced to project level, so the results compose like notes.
    pub fn extract_project(&self, pattern: &str) -> Result<Vec<MarkdownPart>> {
        let re = regex::Regex::new(pattern)?;
        let mut extracted = Vec::new();
        for note in &self.notes {
            for mut part in note.extract_parts(&re) {
                part.title = note.title.clone();
                part.set_level(PROJECT_LEVEL);
                extracted.push(part);
            }
        }
        Ok(extracted)
    }

    /// Renders every loaded note into a single HTML page named after the
    /// notebook. Returns the output path.
    pub fn render_full(&self) -> Result<PathBuf> {
        let renderer = self.renderer()?;
        let dest = self
            .rendered_dir()
            .join(format!("{}.html", self.config.notebook_name));
        renderer.render(&self.notes, &self.config.notebook_name, &dest)?;
        Ok(dest)
    }

    /// Renders one project's entries to HTML. `name` may be an alias from
    /// the project map; it is resolved to its canonical title first. Nothing
    /// is written when no note mentions the project.
    pub fn render_project(&self, name: &str) -> Result<Option<PathBuf>> {
        let map = LookupMap::load(&self.working_path(PROJECT_MAP_FILE))?;
        let canonical = map.get(name).unwrap_or(name).to_string();
        let pattern = format!("^{}$", regex::escape(&canonical));
        let parts = self.extract_project(&pattern)?;
        if parts.is_empty() {
            debug!("no entries found for project {canonical}");
            return Ok(None);
        }
        let renderer = self.renderer()?;
        let dest = self
            .rendered_dir()
            .join(format!("{}.html", file_name_for(&canonical)));
        renderer.render(&parts, &canonical, &dest)?;
        Ok(Some(dest))
    }

    /// Renders every distinct canonical project in the project map.
    pub fn render_all_projects(&self) -> Result<Vec<PathBuf>> {
        let map = LookupMap::load(&self.working_path(PROJECT_MAP_FILE))?;
        let projects: BTreeSet<String> = map.iter().map(|(_, v)| v.to_string()).collect();
        info!("rendering {} projects", projects.len());
        let mut outputs = Vec::new();
        for project in projects {
            if let Some(path) = self.render_project(&project)? {
                outputs.push(path);
            }
        }
        Ok(outputs)
    }

    fn renderer(&self) -> Result<Renderer<'_>> {
        Renderer::new(&self.root, &self.config, &self.templates)
    }

    fn working_path(&self, name: &str) -> PathBuf {
        self.root.join(&self.config.working_path).join(name)
    }

    fn rendered_dir(&self) -> PathBuf {
        self.root.join(&self.config.rendered_path)
    }
}

/// Turns a project title into a safe output file name.
fn file_name_for(title: &str) -> String {
    title
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect()
}

pub(crate) fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
