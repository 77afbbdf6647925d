//! `tidymark clean` - heading normalization and text corrections.

use anyhow::Result;
use tidymark_core::Notebook;

pub fn run(notebook: &mut Notebook) -> Result<()> {
    let rewritten = notebook.clean()?;
    println!(
        "Cleaned {} notes; {rewritten} rewritten.",
        notebook.notes().len()
    );
    Ok(())
}
