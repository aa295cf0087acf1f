//! Folding the chain into a bounded-size digest
//!
//! The chain is cut into batches of `batch_size` entries. When a batch is
//! complete its Merkle snapshot is folded into a running accumulator:
//!
//! ```text
//! acc_0     = H(genesis_seed)
//! acc_{d+1} = H(acc_d ‖ root(batch_d) ‖ d as u64 BE)
//! ```
//!
//! A verifier holding `(d, acc_d)` only needs batches `d..` to reach the
//! current digest. Entries after the last full batch stay pending until the
//! batch fills.

use crate::chain::HashChain;
use crate::core::error::{ChainsealError, Result};
use crate::core::hash::{hash_bytes, StreamingHasher};
use crate::core::types::Hash;
use crate::infinity::digest::InfinityDigest;
use crate::proofs::merkle::Snapshot;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of entries per folded batch
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Default seed of the depth-0 accumulator
pub const DEFAULT_GENESIS_SEED: &str = "chainseal:genesis:v1";

/// One complete batch of entry digests, as handed to a verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Chain index of the first leaf
    pub first_index: u64,
    /// Entry digests in chain order
    pub leaves: Vec<Hash>,
}

/// Accumulator step for one batch
pub fn fold_step(accumulator: &Hash, root: &Hash, depth: u64) -> Hash {
    let mut hasher = StreamingHasher::new();
    hasher.update(accumulator.as_bytes());
    hasher.update(root.as_bytes());
    hasher.update(&depth.to_be_bytes());
    hasher.finalize()
}

/// Incremental folder of a hash chain
#[derive(Debug, Clone)]
pub struct InfinityHasher {
    batch_size: usize,
    /// `accumulators[d]` is the accumulator after `d` folds
    accumulators: Vec<Hash>,
    snapshots: Vec<Snapshot>,
}

impl InfinityHasher {
    /// Create a hasher at depth 0
    pub fn new(batch_size: usize, genesis_seed: &str) -> Result<Self> {
        if batch_size == 0 {
            return Err(ChainsealError::InvalidBatchSize { size: batch_size });
        }
        Ok(Self {
            batch_size,
            accumulators: vec![hash_bytes(genesis_seed.as_bytes())],
            snapshots: Vec::new(),
        })
    }

    /// Fold every complete batch of `chain` in one pass
    ///
    /// Batch snapshots are built in parallel; folding stays sequential.
    pub fn rebuild(chain: &HashChain, batch_size: usize, genesis_seed: &str) -> Result<Self> {
        Self::rebuild_from_digests(&chain.digests(0, chain.len()), batch_size, genesis_seed)
    }

    /// Fold every complete batch of an ordered list of entry digests
    pub fn rebuild_from_digests(
        digests: &[Hash],
        batch_size: usize,
        genesis_seed: &str,
    ) -> Result<Self> {
        let mut hasher = Self::new(batch_size, genesis_seed)?;

        let snapshots: Vec<Snapshot> = digests
            .par_chunks_exact(batch_size)
            .enumerate()
            .map(|(k, leaves)| Snapshot::build((k * batch_size) as u64, leaves))
            .collect();

        for snapshot in snapshots {
            hasher.fold(snapshot)?;
        }
        Ok(hasher)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of folds performed
    pub fn depth(&self) -> u64 {
        (self.accumulators.len() - 1) as u64
    }

    /// Current accumulator
    pub fn accumulator(&self) -> Hash {
        self.accumulators[self.accumulators.len() - 1]
    }

    /// Accumulator as it was after `depth` folds
    pub fn accumulator_at(&self, depth: u64) -> Option<Hash> {
        self.accumulators.get(depth as usize).copied()
    }

    /// Digest of the history folded so far
    pub fn digest(&self) -> InfinityDigest {
        InfinityDigest::new(self.depth(), self.accumulator())
    }

    /// Snapshots folded so far, in depth order
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Entries covered by folded batches
    pub fn folded_entries(&self) -> u64 {
        self.depth() * self.batch_size as u64
    }

    /// Entries of a chain of `chain_len` not yet folded
    pub fn pending_entries(&self, chain_len: u64) -> u64 {
        chain_len.saturating_sub(self.folded_entries())
    }

    /// Fold the snapshot of the next batch
    ///
    /// The snapshot must cover exactly the batch at the current depth.
    pub fn fold(&mut self, snapshot: Snapshot) -> Result<InfinityDigest> {
        let depth = self.depth();
        let batch_size = self.batch_size as u64;

        let first_index = snapshot.first_index().unwrap_or(0);
        self.check_batch_start(depth, first_index)?;
        if snapshot.leaf_count != batch_size {
            return Err(ChainsealError::IncompleteBatch {
                first_index,
                len: snapshot.leaf_count as usize,
                batch_size: self.batch_size,
            });
        }

        let next = fold_step(&self.accumulator(), &snapshot.root, depth);
        debug!(depth = depth + 1, root = %snapshot.root, "folded batch");
        self.accumulators.push(next);
        self.snapshots.push(snapshot);
        Ok(self.digest())
    }

    /// Fold every batch of `chain` completed since the last call
    pub fn absorb(&mut self, chain: &HashChain) -> Result<InfinityDigest> {
        let batch_size = self.batch_size as u64;
        loop {
            let start = self.folded_entries();
            let end = start + batch_size;
            if chain.len() < end {
                break;
            }
            let leaves = chain.digests(start, end);
            self.fold(Snapshot::build(start, &leaves))?;
        }
        Ok(self.digest())
    }

    /// Complete batches of `chain` starting at `depth`, for shipping to a verifier
    pub fn batches_since(&self, chain: &HashChain, depth: u64) -> Vec<Batch> {
        let batch_size = self.batch_size as u64;
        let complete = chain.len() / batch_size;
        (depth..complete)
            .map(|d| Batch {
                first_index: d * batch_size,
                leaves: chain.digests(d * batch_size, (d + 1) * batch_size),
            })
            .collect()
    }

    /// Continue folding from a known `(start_depth, accumulator)` pair
    ///
    /// `new_batches` must begin exactly at the boundary of `start_depth` and
    /// follow each other without gaps. The cost is proportional to the new
    /// batches only.
    pub fn recompute_from(
        &self,
        start_depth: u64,
        accumulator: Hash,
        new_batches: &[Batch],
    ) -> Result<InfinityDigest> {
        if let Some(first) = new_batches.first() {
            let batch_size = self.batch_size as u64;
            if first.first_index % batch_size != 0 || first.first_index / batch_size != start_depth {
                return Err(ChainsealError::DepthMismatch {
                    expected_index: start_depth.saturating_mul(batch_size),
                    got_index: first.first_index,
                });
            }
        }

        let mut depth = start_depth;
        let mut accumulator = accumulator;
        for batch in new_batches {
            self.check_batch_start(depth, batch.first_index)?;
            if batch.leaves.len() != self.batch_size {
                return Err(ChainsealError::IncompleteBatch {
                    first_index: batch.first_index,
                    len: batch.leaves.len(),
                    batch_size: self.batch_size,
                });
            }
            let snapshot = Snapshot::build(batch.first_index, &batch.leaves);
            accumulator = fold_step(&accumulator, &snapshot.root, depth);
            depth = depth
                .checked_add(1)
                .ok_or(ChainsealError::DepthMismatch {
                    expected_index: u64::MAX,
                    got_index: batch.first_index,
                })?;
        }

        Ok(InfinityDigest::new(depth, accumulator))
    }

    /// Check that a batch starting at `first_index` is the one folded at `depth`
    ///
    /// Compares by division so no boundary is ever multiplied out; an
    /// unrepresentable boundary is reported saturated at `u64::MAX`.
    fn check_batch_start(&self, depth: u64, first_index: u64) -> Result<()> {
        let batch_size = self.batch_size as u64;
        if first_index % batch_size != 0 {
            return Err(ChainsealError::DepthMismatch {
                expected_index: depth.saturating_mul(batch_size),
                got_index: first_index,
            });
        }
        let got_depth = first_index / batch_size;
        if got_depth != depth {
            return Err(ChainsealError::out_of_order_fold(depth, got_depth));
        }
        Ok(())
    }
}
