//! Infinity hashing: bounded-size folding of unbounded history

pub mod digest;
pub mod hasher;

pub use digest::InfinityDigest;
pub use hasher::{fold_step, Batch, InfinityHasher, DEFAULT_BATCH_SIZE, DEFAULT_GENESIS_SEED};
