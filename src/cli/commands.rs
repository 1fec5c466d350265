use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stickies")]
#[command(version, about = "Floating sticky notes backed by markdown files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault directory (defaults to the nearest directory containing .stickies/)
    #[arg(long, global = true, value_name = "DIR")]
    pub vault: Option<PathBuf>,

    /// Host window width used to place new notes
    #[arg(long, global = true, default_value_t = 1280.0)]
    pub width: f64,

    /// Host window height used to place new notes
    #[arg(long, global = true, default_value_t = 800.0)]
    pub height: f64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty sticky note
    New {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a sticky note from an existing markdown file
    From {
        /// Vault-relative path of the file
        file: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List sticky notes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single sticky note
    Show {
        /// Note ID (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Type text into a sticky note, as if entered on its surface
    Type {
        /// Note ID (full UUID or unique prefix)
        id: String,

        /// Text to append; "\n" inserts a line break
        text: String,
    },

    /// Drag a sticky note to a new screen position
    Move {
        /// Note ID (full UUID or unique prefix)
        id: String,

        x: f64,

        y: f64,
    },

    /// Delete a sticky note (the backing file is kept)
    Delete {
        /// Note ID (full UUID or unique prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show or change settings
    Config {
        /// Folder where new note files are created
        #[arg(long)]
        notes_folder: Option<String>,

        /// Default background color for new notes
        #[arg(long)]
        default_color: Option<String>,
    },

    /// Watch the vault and keep notes in sync with their files
    Watch,
}
