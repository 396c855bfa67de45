use std::path::PathBuf;

use clap::Subcommand;

pub mod extract;
pub mod list;
pub mod model;
pub mod scan;

#[derive(Subcommand)]
pub enum Commands {
    /// Find ERF/MOD/SAV/HAK archives under a directory
    Scan {
        /// Root directory to search
        root: PathBuf,
    },

    /// List an archive's entries
    List {
        /// Archive file
        source: PathBuf,

        /// Emit the entry table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract entries from an archive
    Extract {
        /// Archive file
        source: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Extract a single entry by name (case-insensitive)
        #[arg(long, conflicts_with = "all")]
        entry: Option<String>,

        /// Extract every entry
        #[arg(long, conflicts_with = "entry")]
        all: bool,
    },

    /// Decode a model from an archive and print its statistics
    Model {
        /// Archive file holding the mesh entry
        source: PathBuf,

        /// MSH entry name
        #[arg(long)]
        msh: String,

        /// MMH entry name (skeleton and material bindings)
        #[arg(long)]
        mmh: Option<String>,

        /// PHY entry name (collision shapes)
        #[arg(long)]
        phy: Option<String>,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Scan { root } => scan::execute(root),
            Commands::List { source, json } => list::execute(source, *json),
            Commands::Extract {
                source,
                out,
                entry,
                all,
            } => extract::execute(source, out, entry.as_deref(), *all),
            Commands::Model {
                source,
                msh,
                mmh,
                phy,
            } => model::execute(source, msh, mmh.as_deref(), phy.as_deref()),
        }
    }
}
