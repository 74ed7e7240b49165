//! CLI definition for the `rainbow-items` command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Query a directory of serialized items
///
/// Looks up ids and paths, checks template fields and lists the templates a
/// field may be used on. Every command prints JSON to stdout.
#[derive(Parser, Debug)]
#[command(name = "rainbow-items")]
#[command(version)]
#[command(about = "Query a directory of serialized items")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Directory holding the serialized item documents
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Maximum template inheritance depth to follow
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up an item by id
    Id {
        /// Item id, with or without braces
        id: String,
    },
    /// Look up an item by path
    Path {
        /// Item path, compared without case
        path: String,
    },
    /// Check that a name or id refers to a template field
    Field {
        /// Field name or field id
        name_or_id: String,
    },
    /// Check whether a field may be used on a template
    Permits {
        /// Field name or field id
        field: String,
        /// Template id or template path
        template: String,
    },
    /// List the templates a field may be used on
    Templates {
        /// Field id
        field_id: String,
    },
    /// Summarize the loaded documents
    Stats,
}
