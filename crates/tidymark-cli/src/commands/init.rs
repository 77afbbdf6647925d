//! `tidymark init` - scaffold a blank notebook.

use std::path::Path;

use anyhow::Result;
use tidymark_core::Notebook;

pub fn run(path: &Path) -> Result<()> {
    if Notebook::is_notebook(path) {
        println!("A notebook already exists at {}.", path.display());
        return Ok(());
    }
    Notebook::initialise(path)?;
    println!("Created a blank notebook at {}.", path.display());
    Ok(())
}
