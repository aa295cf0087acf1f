//! CLI command implementations

pub mod append;
pub mod export;
pub mod pr;
pub mod prove;
pub mod report;
pub mod verify_proof;

use anyhow::Result;
use std::path::Path;

/// Write to a file when a path is given, otherwise print
pub fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}
