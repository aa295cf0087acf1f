//! Engine configuration
//!
//! Stored as TOML in ~/.chainseal/config.toml unless a path is given.

use crate::core::error::{ChainsealError, Result};
use crate::infinity::{DEFAULT_BATCH_SIZE, DEFAULT_GENESIS_SEED};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for an integrity engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entries per folded batch
    pub batch_size: usize,
    /// Seed of the depth-0 accumulator; replicas must agree on it
    pub genesis_seed: String,
    /// Zero padding applied to the depth when printing digests (0 = none)
    pub depth_display_width: usize,
    /// Durable journal backing the chain, in-memory when absent
    pub journal_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            genesis_seed: DEFAULT_GENESIS_SEED.to_string(),
            depth_display_width: 0,
            journal_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from a file, falling back to defaults when missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: EngineConfig = toml::from_str(&content).map_err(|e| {
            ChainsealError::configuration(format!("Failed to parse engine config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save configuration to a file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ChainsealError::configuration(format!("Failed to serialize engine config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ChainsealError::InvalidBatchSize {
                size: self.batch_size,
            });
        }
        Ok(())
    }

    /// Get the path to the default configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or(ChainsealError::HomeDirectoryNotFound)?;
        Ok(user_dirs.home_dir().join(".chainseal").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let config = EngineConfig::load_from(&dir.path().join("absent.toml"))?;
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.batch_size, 256);
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("config.toml");
        let config = EngineConfig {
            batch_size: 16,
            genesis_seed: "board:v2".to_string(),
            depth_display_width: 4,
            journal_path: Some(dir.path().join("chain.journal")),
        };
        config.save_to(&path)?;
        assert_eq!(EngineConfig::load_from(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults_for_rest() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "batch_size = 8\n")?;
        let config = EngineConfig::load_from(&path)?;
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.genesis_seed, DEFAULT_GENESIS_SEED);
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "batch_size = 0\n")?;
        assert!(matches!(
            EngineConfig::load_from(&path),
            Err(ChainsealError::InvalidBatchSize { size: 0 })
        ));

        std::fs::write(&path, "batch_size = \"many\"\n")?;
        assert!(matches!(
            EngineConfig::load_from(&path),
            Err(ChainsealError::ConfigurationError { .. })
        ));
        Ok(())
    }
}
