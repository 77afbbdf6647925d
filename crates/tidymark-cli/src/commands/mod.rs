//! Command dispatch.
//!
//! Every command except `init` needs an initialized notebook. When none is
//! found the CLI prints a hint and exits cleanly rather than failing, so
//! running `tidymark` in the wrong directory is harmless.

use anyhow::{Context, Result};
use tidymark_core::Notebook;

use crate::cli::{Cli, Commands};

mod clean;
mod init;
mod note;
mod render;

pub fn execute(cli: &Cli) -> Result<()> {
    if matches!(cli.command, Commands::Init) {
        return init::run(&cli.notebook);
    }

    if !Notebook::is_notebook(&cli.notebook) {
        println!(
            "No notebook found at {} - run `tidymark init` first.",
            cli.notebook.display()
        );
        return Ok(());
    }

    let mut notebook = Notebook::open(&cli.notebook)
        .with_context(|| format!("failed to open notebook at {}", cli.notebook.display()))?;

    match &cli.command {
        // Handled before the notebook is opened.
        Commands::Init => Ok(()),
        Commands::Note { date, force } => note::generate(&mut notebook, date.as_deref(), *force),
        Commands::Series { count, start } => note::series(&mut notebook, start.as_deref(), *count),
        Commands::Clean => clean::run(&mut notebook),
        Commands::Render => render::full(&notebook),
        Commands::Extract { project } => render::project(&notebook, project),
        Commands::ExtractAll => render::all_projects(&notebook),
    }
}
