//! CLI module for archivescan
//!
//! Provides command-line interface for:
//! - plan: Print the scan ranges of a query
//! - explain: Print the explain plan
//! - pull: Run the incremental pull loop against a JSON archive

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, QueryArgs};
pub use commands::{explain, plan, pull, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_json_file, write_json, write_text};
