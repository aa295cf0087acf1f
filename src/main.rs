//! Chainseal CLI
//!
//! Command-line interface over a journal-backed integrity engine.

use anyhow::Result;
use chainseal::cli::{commands, context, Cli, Commands};
use clap::Parser;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let cli = Cli::parse();
    let quiet = cli.quiet;

    // Execute the command
    let open = || context::open_engine(&cli);
    let ok = match &cli.command {
        Commands::Append { content } => {
            commands::append::execute(&open()?, content.clone(), quiet)?;
            true
        }
        Commands::Pr {
            number,
            title,
            branch,
            status,
            files,
            commits,
        } => {
            commands::pr::execute(
                &open()?,
                *number,
                title.clone(),
                branch.clone(),
                status.clone(),
                files.clone(),
                commits.clone(),
                quiet,
            )?;
            true
        }
        Commands::Report { json, expect } => {
            commands::report::execute(&open()?, *json, expect.clone())?
        }
        Commands::Prove { index, output } => {
            commands::prove::execute(&open()?, *index, output.clone())?;
            true
        }
        Commands::VerifyProof { proof, root } => {
            commands::verify_proof::execute(proof.clone(), root.clone())?
        }
        Commands::Export { output } => {
            commands::export::execute(&open()?, output.clone())?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
