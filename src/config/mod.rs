//! Configuration management for Chainseal
//!
//! Engine settings live in ~/.chainseal/config.toml by default.

pub mod engine_config;

// Re-export commonly used items
pub use engine_config::EngineConfig;
