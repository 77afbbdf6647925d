//! Template loading and rendering.
//!
//! The notebook's `templates/` directory holds a Markdown note template and
//! an HTML page template. Every `.md` and `.html` file in the directory is
//! loaded into one environment, keyed by file name, so notebooks can add
//! their own templates without configuration.

use std::fs;
use std::path::Path;

use minijinja::Environment;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// A set of templates loaded from a notebook's template directory.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Loads all `.md` and `.html` templates from `dir`. A missing
    /// directory yields an empty set, so notebooks without templates can
    /// still be cleaned; rendering then fails with a template error.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut env = Environment::new();
        if !dir.is_dir() {
            debug!("template directory {} not found, starting empty", dir.display());
            return Ok(Self { env });
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(std::ffi::OsStr::to_str);
            if !matches!(ext, Some("md" | "html")) {
                continue;
            }
            let Some(name) = path.file_name().and_then(std::ffi::OsStr::to_str) else {
                continue;
            };
            debug!("loading template {name}");
            let source = fs::read_to_string(&path)?;
            env.add_template_owned(name.to_string(), source)?;
        }
        Ok(Self { env })
    }

    /// Renders the template called `name` with the given context.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}
