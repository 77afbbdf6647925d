//! Recursive Markdown document model.
//!
//! A [`MarkdownPart`] is one titled section of a document: its own body
//! text, plus child parts for each direct sub-heading. Parsing splits a
//! document into this tree; [`MarkdownPart::combine`] reassembles it.
//! Serialization is idempotent: combining a tree parsed from previously
//! combined text reproduces that text byte for byte.
//!
//! Levels form a strict hierarchy. A child's level is always exactly its
//! parent's level plus one, enforced top-down by [`MarkdownPart::set_level`]
//! regardless of the literal `#` counts in the source text. Level 0 is a
//! root container whose heading line is never emitted; its title may come
//! from front matter or be supplied synthetically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::heading;
use crate::mapping::LookupMap;

static WIKILINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^\]]*)\]\]").unwrap_or_else(|e| panic!("invalid wikilink regex: {e}"))
});

static IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").unwrap_or_else(|e| panic!("invalid image regex: {e}"))
});

/// Where a document root was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    /// File name without extension.
    pub name: String,
}

/// One titled section of a Markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownPart {
    /// Heading text with the `#` markers stripped. Non-empty for any part
    /// at level > 0.
    pub title: String,
    /// 0 for a root container, otherwise the heading depth in `#` count.
    pub level: usize,
    /// Text belonging to this part only, normalized to end with exactly one
    /// newline and carry no leading or trailing blank lines.
    pub body: String,
    /// Direct children in document order.
    pub parts: Vec<MarkdownPart>,
    /// Front-matter key-value pairs. `title` is merged in on serialization
    /// but not required here.
    pub metadata: BTreeMap<String, serde_yaml::Value>,
    /// Set when the part was loaded from a file.
    pub origin: Option<Origin>,
}

impl MarkdownPart {
    /// Builds an empty level-0 container with the given title.
    #[must_use]
    pub fn container(title: &str) -> Self {
        Self {
            title: title.to_string(),
            level: 0,
            body: "\n".to_string(),
            parts: Vec::new(),
            metadata: BTreeMap::new(),
            origin: None,
        }
    }

    /// Parses raw Markdown text into a part tree.
    ///
    /// An optional leading front-matter block (lines between `---`
    /// delimiters) becomes `metadata`; a `title` key there makes this a
    /// level-0 root. Otherwise the first heading line supplies the title
    /// and level. Everything up to the first direct-child heading is the
    /// body; the rest is segmented into child runs and parsed recursively.
    ///
    /// # Errors
    ///
    /// Fails when no title can be located, when a front-matter block is
    /// unterminated or malformed, or when a heading has no text.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut metadata = BTreeMap::new();
        let mut title = String::new();
        let mut level = 0usize;
        let mut idx = 0usize;

        if lines
            .first()
            .is_some_and(|line| line.starts_with("---"))
        {
            let close = lines[1..]
                .iter()
                .position(|line| line.starts_with("---"))
                .map(|n| n + 1)
                .ok_or_else(|| Error::Parse("unterminated front matter block".to_string()))?;
            let block = lines[1..close].join("\n");
            if !block.trim().is_empty() {
                metadata = serde_yaml::from_str(&block)
                    .map_err(|err| Error::Parse(format!("invalid front matter: {err}")))?;
            }
            if let Some(meta_title) = metadata.get("title").and_then(serde_yaml::Value::as_str) {
                title = meta_title.to_string();
            }
            idx = close + 1;
        }

        // Locate the title line. With a front-matter title only a heading
        // whose text equals it is consumed; any other heading, and the
        // lines before it, stay in place and become body or children.
        for scan in idx..lines.len() {
            let Some((depth, text)) = heading::heading_line(lines[scan]) else {
                continue;
            };
            let text = text.trim();
            if title.is_empty() {
                if text.is_empty() {
                    return Err(Error::Parse("heading with empty title".to_string()));
                }
                title = text.to_string();
                level = depth;
                idx = scan + 1;
            } else if text == title {
                level = depth;
                idx = scan + 1;
            }
            break;
        }
        if title.is_empty() {
            return Err(Error::Parse(
                "could not find a title in the document".to_string(),
            ));
        }

        let child_depth = level + 1;
        let rest = &lines[idx.min(lines.len())..];
        let body_len = rest
            .iter()
            .position(|line| heading::is_heading_at(line, child_depth))
            .unwrap_or(rest.len());
        let body = normalize_body(&rest[..body_len].join("\n"));

        // Segment the remainder into runs, each starting at a direct-child
        // heading. Runs that are entirely blank are dropped.
        let mut parts = Vec::new();
        let mut run: Vec<&str> = Vec::new();
        let flush = |run: &[&str], parts: &mut Vec<MarkdownPart>| -> Result<()> {
            if run
                .first()
                .is_some_and(|line| heading::is_heading_at(line, child_depth))
            {
                let text = run.join("\n");
                if !text.trim().is_empty() {
                    parts.push(Self::parse(&text)?);
                }
            }
            Ok(())
        };
        for &line in &rest[body_len..] {
            if heading::is_heading_at(line, child_depth) {
                flush(&run, &mut parts)?;
                run = vec![line];
            } else {
                run.push(line);
            }
        }
        flush(&run, &mut parts)?;

        let mut part = Self {
            title,
            level,
            body,
            parts,
            metadata,
            origin: None,
        };
        part.set_level(level);
        Ok(part)
    }

    /// Loads and parses a document from disk, recording its origin.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut doc = Self::parse(&text)?;
        let stat = fs::metadata(path)?;
        let name = path
            .file_stem()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or_default()
            .to_string();
        doc.origin = Some(Origin {
            path: path.to_path_buf(),
            modified: DateTime::<Utc>::from(stat.modified()?),
            name,
        });
        Ok(doc)
    }

    /// Writes the combined document to `path`, creating parent directories
    /// as needed. The write is skipped when the file already holds exactly
    /// this content, so unchanged notes keep their modification times.
    /// Returns true if the file was written.
    pub fn to_file(&self, path: &Path) -> Result<bool> {
        let output = self.combine(true);
        if path.exists() {
            let existing = fs::read_to_string(path)?;
            if existing == output {
                return Ok(false);
            }
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, output)?;
        Ok(true)
    }

    /// Reassembles the part and its children into Markdown text.
    ///
    /// With `include_metadata`, a non-empty metadata mapping is emitted as
    /// a front-matter block with `title` merged in; children never re-emit
    /// metadata. Level-2 blocks get two blank lines before them and level-3
    /// blocks one, keeping document spacing consistent.
    #[must_use]
    pub fn combine(&self, include_metadata: bool) -> String {
        let mut sections: Vec<String> = Vec::new();

        if include_metadata && !self.metadata.is_empty() {
            let mut merged = self.metadata.clone();
            merged.insert(
                "title".to_string(),
                serde_yaml::Value::String(self.title.clone()),
            );
            match serde_yaml::to_string(&merged) {
                Ok(yaml) => sections.push(format!("---\n{}\n---\n", yaml.trim())),
                Err(err) => warn!("skipping unserializable front matter: {err}"),
            }
        }

        let heading = if self.level > 0 {
            format!("{} {}\n", "#".repeat(self.level), self.title)
        } else {
            String::new()
        };
        let raw = format!("{}\n{}\n", heading, self.body.trim_matches('\n'));
        let mut block = format!("{}\n", raw.trim_matches('\n'));
        block = match self.level {
            2 => format!("\n\n{block}"),
            3 => format!("\n{block}"),
            _ => block,
        };
        sections.push(block);

        if !self.parts.is_empty() {
            let mut children: String = self
                .parts
                .iter()
                .map(|part| part.combine(false))
                .collect::<Vec<_>>()
                .join("\n");
            if self.body.trim().is_empty() {
                children = children.trim_start_matches('\n').to_string();
            }
            sections.push(children);
        }

        sections.join("\n")
    }

    /// Sets this part's level and renumbers all descendants by depth.
    pub fn set_level(&mut self, level: usize) {
        self.level = level;
        for part in &mut self.parts {
            part.set_level(level + 1);
        }
    }

    /// Appends a deep copy of `child` with its level forced to fit under
    /// this part. The caller's original is not mutated.
    pub fn add_part(&mut self, child: &MarkdownPart) {
        let mut child = child.clone();
        child.set_level(self.level + 1);
        self.parts.push(child);
    }

    /// Removes direct children whose title matches `pattern` at the start.
    pub fn drop_parts(&mut self, pattern: &Regex) {
        self.parts
            .retain(|part| !heading::match_at_start(pattern, &part.title));
    }

    /// Collects deep copies of every descendant, at any depth and in
    /// pre-order, whose title matches `pattern` at the start. A match
    /// nested inside another match is still returned on its own.
    #[must_use]
    pub fn extract_parts(&self, pattern: &Regex) -> Vec<MarkdownPart> {
        let mut found = Vec::new();
        for part in &self.parts {
            if heading::match_at_start(pattern, &part.title) {
                found.push(part.clone());
            }
            found.extend(part.extract_parts(pattern));
        }
        found
    }

    /// Rewrites body text throughout the subtree. With `regex` the pattern
    /// is a regular expression (capture groups via `$1`), otherwise a
    /// literal substring. Titles are never touched.
    pub fn make_replacement(&mut self, pattern: &str, replacement: &str, regex: bool) -> Result<()> {
        if regex {
            let re = Regex::new(pattern)?;
            self.replace_matches(&re, replacement);
        } else {
            self.replace_literal(pattern, replacement);
        }
        Ok(())
    }

    /// Rewrites body text throughout the subtree with a pre-compiled
    /// pattern. Lets callers compile once when applying the same pattern
    /// to many trees.
    pub fn replace_matches(&mut self, re: &Regex, replacement: &str) {
        self.body = re.replace_all(&self.body, replacement).into_owned();
        for part in &mut self.parts {
            part.replace_matches(re, replacement);
        }
    }

    fn replace_literal(&mut self, pattern: &str, replacement: &str) {
        self.body = self.body.replace(pattern, replacement);
        for part in &mut self.parts {
            part.replace_literal(pattern, replacement);
        }
    }

    /// Replaces titles via lookup in `mapping`. With a specific `level`,
    /// only parts at that level are renamed and recursion stops there;
    /// without one, every part in the subtree is renamed.
    pub fn replace_title(&mut self, mapping: &LookupMap, level: Option<usize>) {
        if level.is_none() || level == Some(self.level) {
            if let Some(replacement) = mapping.get(&self.title) {
                self.title = replacement.to_string();
            }
        }
        if level == Some(self.level) {
            return;
        }
        for part in &mut self.parts {
            part.replace_title(mapping, level);
        }
    }

    /// Collects `[[wikilink]]` targets from the whole subtree, in order.
    #[must_use]
    pub fn get_links(&self) -> Vec<String> {
        let mut links: Vec<String> = WIKILINK
            .captures_iter(&self.body)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();
        for part in &self.parts {
            links.extend(part.get_links());
        }
        links
    }

    /// Collects `![alt](target)` image targets from the whole subtree.
    #[must_use]
    pub fn get_images(&self) -> Vec<String> {
        let mut images: Vec<String> = IMAGE
            .captures_iter(&self.body)
            .filter_map(|caps| caps.get(2).map(|m| m.as_str().to_string()))
            .collect();
        for part in &self.parts {
            images.extend(part.get_images());
        }
        images
    }

    /// True when the body is blank and there are no children.
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.body.trim().is_empty() && self.parts.is_empty()
    }

    /// Collects the titles of every part in the subtree at exactly `level`,
    /// in document order.
    #[must_use]
    pub fn titles_at_level(&self, level: usize) -> Vec<String> {
        let mut titles = Vec::new();
        if self.level == level {
            titles.push(self.title.clone());
        }
        for part in &self.parts {
            titles.extend(part.titles_at_level(level));
        }
        titles
    }
}

fn normalize_body(raw: &str) -> String {
    format!("{}\n", raw.trim_matches('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "# Title\n\nBody text\n\n## Sub\n\nSub body\n";
    const STABLE: &str = "# Title\n\nBody text\n\n\n\n## Sub\n\nSub body\n";

    #[test]
    fn parses_headings_into_a_tree() {
        let doc = MarkdownPart::parse(NOTE).unwrap();
        assert_eq!(doc.title, "Title");
        assert_eq!(doc.level, 1);
        assert_eq!(doc.body, "Body text\n");
        assert_eq!(doc.parts.len(), 1);
        assert_eq!(doc.parts[0].title, "Sub");
        assert_eq!(doc.parts[0].level, 2);
        assert_eq!(doc.parts[0].body, "Sub body\n");
    }

    #[test]
    fn combine_is_idempotent() {
        let first = MarkdownPart::parse(NOTE).unwrap().combine(true);
        assert_eq!(first, STABLE);
        let second = MarkdownPart::parse(&first).unwrap().combine(true);
        assert_eq!(second, first);
    }

    #[test]
    fn front_matter_round_trips() {
        let text = "---\ntitle: Day\n---\n\n# Day\n\nBody\n";
        let doc = MarkdownPart::parse(text).unwrap();
        assert_eq!(doc.title, "Day");
        assert_eq!(doc.level, 1);
        assert_eq!(doc.combine(true), text);
    }

    #[test]
    fn front_matter_without_matching_heading_is_level_zero() {
        let doc = MarkdownPart::parse("---\ntitle: Journal\n---\nSome notes\n").unwrap();
        assert_eq!(doc.title, "Journal");
        assert_eq!(doc.level, 0);
        assert_eq!(doc.body, "Some notes\n");
    }

    #[test]
    fn level_zero_root_keeps_body_before_other_headings() {
        let text = "---\ntitle: J\n---\n\nbody\n\n# A\n\na\n";
        let doc = MarkdownPart::parse(text).unwrap();
        assert_eq!(doc.level, 0);
        assert_eq!(doc.body, "body\n");
        assert_eq!(doc.parts.len(), 1);
        assert_eq!(doc.parts[0].title, "A");
        assert_eq!(doc.combine(true), text);
    }

    #[test]
    fn missing_title_is_an_error() {
        let err = MarkdownPart::parse("plain text\nno headings here\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn unterminated_front_matter_is_an_error() {
        let err = MarkdownPart::parse("---\ntitle: Broken\n\n# Broken\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn empty_heading_is_an_error() {
        let err = MarkdownPart::parse("## \nbody\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn blank_runs_produce_no_phantom_children() {
        let doc = MarkdownPart::parse("# Day\n\nEntry\n\n\n\n").unwrap();
        assert!(doc.parts.is_empty());
        assert_eq!(doc.body, "Entry\n");
    }

    #[test]
    fn stub_detection() {
        assert!(MarkdownPart::parse("# Empty\n\n\n").unwrap().is_stub());
        assert!(!MarkdownPart::parse("# Day\n\nEntry\n").unwrap().is_stub());
        assert!(!MarkdownPart::parse(NOTE).unwrap().is_stub());
    }

    #[test]
    fn set_level_renumbers_descendants() {
        let mut doc = MarkdownPart::parse(NOTE).unwrap();
        doc.set_level(3);
        assert_eq!(doc.level, 3);
        assert_eq!(doc.parts[0].level, 4);
    }

    #[test]
    fn add_part_copies_and_forces_level() {
        let note = MarkdownPart::parse(NOTE).unwrap();
        let mut root = MarkdownPart::container("Everything");
        root.add_part(&note);
        assert_eq!(root.parts[0].level, 1);
        assert_eq!(root.parts[0].parts[0].level, 2);
        // The caller's part is untouched.
        assert_eq!(note.level, 1);

        root.parts[0].body = "changed\n".to_string();
        assert_eq!(note.body, "Body text\n");
    }

    #[test]
    fn drop_parts_matches_from_the_start() {
        let text = "# Day\n\nEntry\n\n## Alpha\n\na\n\n## Alphabet\n\nb\n\n## Beta\n\nc\n";
        let mut doc = MarkdownPart::parse(text).unwrap();
        doc.drop_parts(&Regex::new("Alpha").unwrap());
        let titles: Vec<&str> = doc.parts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Beta"]);
    }

    #[test]
    fn extract_parts_returns_nested_matches_independently() {
        let text = "# Root\n\n## Target\n\ntext\n\n### Target\n\ninner\n";
        let doc = MarkdownPart::parse(text).unwrap();
        let mut found = doc.extract_parts(&Regex::new("Target").unwrap());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].parts.len(), 1);
        assert!(found[1].parts.is_empty());

        found[0].body = "changed\n".to_string();
        assert_eq!(doc.parts[0].body, "text\n");
    }

    #[test]
    fn make_replacement_literal_and_regex() {
        let mut doc = MarkdownPart::parse(NOTE).unwrap();
        doc.make_replacement("Sub body", "replaced", false).unwrap();
        assert_eq!(doc.parts[0].body, "replaced\n");

        doc.make_replacement(r"Body (\w+)", "$1 only", true).unwrap();
        assert_eq!(doc.body, "text only\n");

        // Titles are never touched.
        doc.make_replacement("Sub", "X", false).unwrap();
        assert_eq!(doc.parts[0].title, "Sub");
    }

    #[test]
    fn replace_matches_reuses_a_compiled_pattern() {
        let re = Regex::new(r"\bteh\b").unwrap();
        let mut first = MarkdownPart::parse("# One\n\nteh start\n").unwrap();
        let mut second = MarkdownPart::parse("# Two\n\nfine\n\n## Sub\n\nteh end\n").unwrap();
        first.replace_matches(&re, "the");
        second.replace_matches(&re, "the");
        assert_eq!(first.body, "the start\n");
        assert_eq!(second.parts[0].body, "the end\n");
    }

    #[test]
    fn replace_title_scopes_to_a_level() {
        let text = "# Old\n\ntop\n\n## Old\n\nmid\n\n### Old\n\ndeep\n";
        let mut doc = MarkdownPart::parse(text).unwrap();
        let mut mapping = LookupMap::new();
        mapping.insert("Old", "New");

        doc.replace_title(&mapping, Some(2));
        assert_eq!(doc.title, "Old");
        assert_eq!(doc.parts[0].title, "New");
        assert_eq!(doc.parts[0].parts[0].title, "Old");

        doc.replace_title(&mapping, None);
        assert_eq!(doc.title, "New");
        assert_eq!(doc.parts[0].parts[0].title, "New");
    }

    #[test]
    fn collects_links_and_images_in_order() {
        let text = "# Day\n\nSee [[2025/plans]] and ![chart](img/chart.png).\n\n\
                    ## Sub\n\nAlso [[archive]] and ![x](a.svg).\n";
        let doc = MarkdownPart::parse(text).unwrap();
        assert_eq!(doc.get_links(), vec!["2025/plans", "archive"]);
        assert_eq!(doc.get_images(), vec!["img/chart.png", "a.svg"]);
    }

    #[test]
    fn file_round_trip_records_origin_and_skips_identical_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2025_03_14.md");
        fs::write(&path, STABLE).unwrap();

        let doc = MarkdownPart::from_file(&path).unwrap();
        let origin = doc.origin.as_ref().unwrap();
        assert_eq!(origin.name, "2025_03_14");
        assert_eq!(origin.path, path);

        // Content is unchanged, so the write is a no-op.
        assert!(!doc.to_file(&path).unwrap());

        let mut doc = doc;
        doc.body = "Different\n".to_string();
        assert!(doc.to_file(&path).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("Different"));
    }

    #[test]
    fn to_file_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2025").join("03").join("note.md");
        let doc = MarkdownPart::parse(NOTE).unwrap();
        assert!(doc.to_file(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), STABLE);
    }
}
