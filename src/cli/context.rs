//! Engine construction from global CLI options

use crate::cli::Cli;
use crate::config::EngineConfig;
use crate::report::IntegrityEngine;
use anyhow::{Context, Result};

/// Resolve configuration: file first, then command-line overrides
pub fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::load()?,
    };

    if let Some(journal) = &cli.journal {
        config.journal_path = Some(journal.clone());
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    config.validate()?;
    Ok(config)
}

/// Open the engine the command operates on
pub fn open_engine(cli: &Cli) -> Result<IntegrityEngine> {
    let config = resolve_config(cli)?;
    if config.journal_path.is_none() {
        anyhow::bail!("no journal configured; pass --journal or set journal_path in the config");
    }
    Ok(IntegrityEngine::new(config)?)
}
