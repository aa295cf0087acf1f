//! Test utilities shared by the integration tests

#![allow(dead_code)]

use chainseal::{EngineConfig, HashChain, IntegrityEngine, Timestamp};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

/// Deterministic timestamp `secs` seconds after the epoch
pub fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

/// In-memory engine with the given batch size and default seed
pub fn engine(batch_size: usize) -> IntegrityEngine {
    IntegrityEngine::new(EngineConfig {
        batch_size,
        ..EngineConfig::default()
    })
    .unwrap()
}

/// Engine with `n` entries `entry-0 .. entry-{n-1}` appended at fixed times
pub fn engine_with(batch_size: usize, n: u64) -> IntegrityEngine {
    let engine = engine(batch_size);
    for i in 0..n {
        engine
            .append(format!("entry-{}", i).into_bytes(), ts(i as i64))
            .unwrap();
    }
    engine
}

/// Chain with `n` entries appended at fixed times
pub fn chain_with(n: u64) -> HashChain {
    let chain = HashChain::new();
    for i in 0..n {
        chain
            .append(format!("entry-{}", i).into_bytes(), ts(i as i64))
            .unwrap();
    }
    chain
}

/// Engine backed by a journal inside a temporary directory
pub struct JournaledEngine {
    pub engine: IntegrityEngine,
    pub temp_dir: TempDir,
}

impl JournaledEngine {
    pub fn new(batch_size: usize) -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let engine = IntegrityEngine::new(Self::config_in(&temp_dir, batch_size))?;
        Ok(Self { engine, temp_dir })
    }

    pub fn config_in(temp_dir: &TempDir, batch_size: usize) -> EngineConfig {
        EngineConfig {
            batch_size,
            journal_path: Some(temp_dir.path().join("chain.journal")),
            ..EngineConfig::default()
        }
    }

    /// Drop the engine and open a fresh one over the same journal
    pub fn reopen(self) -> anyhow::Result<Self> {
        let batch_size = self.engine.config().batch_size;
        let temp_dir = self.temp_dir;
        drop(self.engine);
        let engine = IntegrityEngine::new(Self::config_in(&temp_dir, batch_size))?;
        Ok(Self { engine, temp_dir })
    }
}
