//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// tidymark - keep a directory of dated Markdown notes tidy.
#[derive(Debug, Parser)]
#[command(name = "tidymark", version, about)]
pub struct Cli {
    /// Notebook directory (defaults to the current directory).
    #[arg(short = 'C', long = "notebook", global = true, default_value = ".")]
    pub notebook: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a blank notebook scaffold in the notebook directory.
    Init,

    /// Generate a note for a date (today by default).
    Note {
        /// Date for the note, in a configured format or YYYY-MM-DD.
        date: Option<String>,

        /// Overwrite the note if it already exists.
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a series of daily notes.
    Series {
        /// Number of consecutive days to generate.
        count: u32,

        /// Start date (today by default).
        #[arg(long)]
        start: Option<String>,
    },

    /// Normalize project/task headings and apply text corrections.
    Clean,

    /// Render the whole notebook to a single HTML page.
    Render,

    /// Extract one project's entries and render them to HTML.
    Extract {
        /// Project title, or an alias from the project map.
        project: String,
    },

    /// Render every project in the project map to HTML.
    ExtractAll,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_note_with_date_and_force() {
        let cli = Cli::parse_from(["tidymark", "note", "2025-03-14", "--force"]);
        match cli.command {
            Commands::Note { date, force } => {
                assert_eq!(date.as_deref(), Some("2025-03-14"));
                assert!(force);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn notebook_flag_is_global() {
        let cli = Cli::parse_from(["tidymark", "clean", "--notebook", "/tmp/nb"]);
        assert_eq!(cli.notebook, PathBuf::from("/tmp/nb"));
    }
}
