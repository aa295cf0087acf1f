use crate::report::IntegrityEngine;
use anyhow::Result;
use colored::Colorize;

/// Execute the pr command
#[allow(clippy::too_many_arguments)]
pub fn execute(
    engine: &IntegrityEngine,
    number: u64,
    title: String,
    branch: String,
    status: String,
    files: Vec<String>,
    commits: Vec<String>,
    quiet: bool,
) -> Result<()> {
    let digest = engine.hash_pr(number, &title, &branch, &status, &files, &commits)?;

    if !quiet {
        println!("{} recorded PR #{} ({})", "✓".green(), number, status.cyan());
    }
    println!("{}", engine.display_digest(&digest));
    Ok(())
}
