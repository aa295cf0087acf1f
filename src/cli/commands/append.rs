use crate::report::IntegrityEngine;
use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

/// Execute the append command
pub fn execute(engine: &IntegrityEngine, content: String, quiet: bool) -> Result<()> {
    let entry = engine.append(content.into_bytes(), Utc::now())?;

    if !quiet {
        println!("{} entry {}", "✓".green(), entry.index.to_string().bold());
        println!("  {}: {}", "Digest".bold(), entry.digest.to_hex().cyan());
        println!(
            "  {}: {}",
            "Infinity".bold(),
            engine.display_digest(&engine.infinity_digest())
        );
    }
    Ok(())
}
