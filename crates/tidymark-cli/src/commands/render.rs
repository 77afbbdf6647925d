//! `tidymark render`, `extract` and `extract-all` - HTML output.

use anyhow::Result;
use tidymark_core::Notebook;

pub fn full(notebook: &Notebook) -> Result<()> {
    let output = notebook.render_full()?;
    println!("Rendered notebook to {}.", output.display());
    Ok(())
}

pub fn project(notebook: &Notebook, name: &str) -> Result<()> {
    match notebook.render_project(name)? {
        Some(output) => println!("Rendered project to {}.", output.display()),
        None => println!("No entries found for project '{name}'."),
    }
    Ok(())
}

pub fn all_projects(notebook: &Notebook) -> Result<()> {
    let outputs = notebook.render_all_projects()?;
    println!("Rendered {} projects.", outputs.len());
    for output in outputs {
        println!("  {}", output.display());
    }
    Ok(())
}
