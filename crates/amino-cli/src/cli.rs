use std::path::PathBuf;

use amino_core::EntityKind;
use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `amv` binary.
#[derive(Debug, Parser)]
#[command(name = "amv", version, about = "AminoVerse - biological entity resolution")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (info logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra TOML config file layered over the user and project files
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Resolve one kind of data for an entity.
    Resolve {
        /// info, structure, interactions, diseases, drugs, or variants
        kind: String,
        id: String,
        #[arg(long, default_value = "protein")]
        entity_type: String,
    },
    /// Resolve every data kind of a protein.
    Profile { id: String },
    /// Subgraph centered on an entity.
    Graph {
        id: String,
        #[arg(long = "type", default_value = "protein")]
        entity_type: EntityKind,
        /// Hops from the center (configured default when omitted)
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Drop every cached value for an entity id.
    Invalidate { id: String },
    /// Load a `{nodes, edges}` JSON document into the graph store.
    Seed { file: PathBuf },
}
