//! CLI argument definitions using clap
//!
//! Commands:
//! - archivescan plan --query <path> --catalog <path>
//! - archivescan explain --query <path> --catalog <path>
//! - archivescan pull --query <path> --catalog <path> --archive <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// archivescan - plan and pull time-bounded scans over archived log files
#[derive(Parser, Debug)]
#[command(name = "archivescan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Inputs shared by every command
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Path to configuration file
    #[arg(long, default_value = "./archivescan.json")]
    pub config: PathBuf,

    /// Path to the query tree (JSON)
    #[arg(long)]
    pub query: PathBuf,

    /// Path to the stream catalog (JSON)
    #[arg(long)]
    pub catalog: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the scan ranges of a query as JSON
    Plan {
        #[command(flatten)]
        input: QueryArgs,
    },

    /// Print the explain plan of a query
    Explain {
        #[command(flatten)]
        input: QueryArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Pull batches from an archive, one JSON line per batch
    Pull {
        #[command(flatten)]
        input: QueryArgs,

        /// Path to the archived rows (JSON)
        #[arg(long)]
        archive: PathBuf,

        /// Stop after this many batches
        #[arg(long)]
        max_batches: Option<usize>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
