use crate::cli::commands::emit;
use crate::report::IntegrityEngine;
use anyhow::Result;
use std::path::PathBuf;

/// Execute the export command
pub fn execute(engine: &IntegrityEngine, output: Option<PathBuf>) -> Result<()> {
    emit(&engine.export().to_json()?, output.as_deref())
}
