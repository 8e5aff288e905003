//! JSON I/O handling for CLI
//!
//! - Inputs: whole-file JSON documents
//! - Output: one JSON value per stdout line, UTF-8

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{CliError, CliResult};

/// Read and deserialize a JSON file
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::io_error(format!("{}: invalid JSON: {}", path.display(), e)))
}

/// Write a value as a single JSON line to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write raw text to stdout
pub fn write_text(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", text)?;
    stdout.flush()?;

    Ok(())
}
