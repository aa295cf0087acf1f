use crate::cli::commands::emit;
use crate::report::IntegrityEngine;
use anyhow::Result;
use std::path::PathBuf;

/// Execute the prove command
pub fn execute(engine: &IntegrityEngine, index: u64, output: Option<PathBuf>) -> Result<()> {
    let proof = engine.prove_entry(index)?;
    emit(&proof.to_json()?, output.as_deref())
}
