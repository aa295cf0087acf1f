//! Integrity engine: the entry point used by collaborators
//!
//! Owns one hash chain and its folded state. Task-board and PR collaborators
//! append events; CI asks for an [`IntegrityReport`] before publishing; sync
//! peers exchange inclusion proofs.

use crate::chain::chain::verify_entries;
use crate::chain::{Entry, HashChain};
use crate::config::EngineConfig;
use crate::core::error::{ChainsealError, Result};
use crate::core::types::{EntryDigest, Hash, RootHash, Timestamp};
use crate::infinity::{InfinityDigest, InfinityHasher};
use crate::proofs::{MerkleTree, Proof, ProofScope};
use crate::report::events::{CardEvent, LedgerEvent, PullRequestEvent};
use crate::report::report::{ChainExport, IntegrityReport, EXPORT_VERSION};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What an event append produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReceipt {
    pub index: u64,
    pub entry_digest: EntryDigest,
    pub infinity_digest: InfinityDigest,
}

/// Hash chain plus folding state, shared by reference between collaborators
#[derive(Debug)]
pub struct IntegrityEngine {
    config: EngineConfig,
    chain: HashChain,
    infinity: Mutex<InfinityHasher>,
    published: RwLock<Option<InfinityDigest>>,
}

impl IntegrityEngine {
    /// Create an engine, opening the configured journal if any
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let chain = match &config.journal_path {
            Some(path) => HashChain::open(path)?,
            None => HashChain::new(),
        };
        Self::with_chain(config, chain)
    }

    /// Wrap an existing chain, folding the batches it already holds
    pub fn with_chain(config: EngineConfig, chain: HashChain) -> Result<Self> {
        config.validate()?;
        let infinity = InfinityHasher::rebuild(&chain, config.batch_size, &config.genesis_seed)?;
        Ok(Self {
            config,
            chain,
            infinity: Mutex::new(infinity),
            published: RwLock::new(None),
        })
    }

    /// Load an exported chain; its claimed digest becomes the published one
    pub fn import(config: EngineConfig, export: ChainExport) -> Result<Self> {
        let chain = HashChain::from_entries(export.entries)?;
        let engine = Self::with_chain(config, chain)?;
        engine.set_published(export.infinity_digest);
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The underlying chain, for read access
    pub fn chain(&self) -> &HashChain {
        &self.chain
    }

    /// Append raw content and fold any batch it completes
    pub fn append(&self, content: Vec<u8>, timestamp: Timestamp) -> Result<Entry> {
        let entry = self.chain.append(content, timestamp)?;
        self.infinity.lock().absorb(&self.chain)?;
        Ok(entry)
    }

    /// Append content at a caller-chosen index
    pub fn append_at(&self, index: u64, content: Vec<u8>, timestamp: Timestamp) -> Result<Entry> {
        let entry = self.chain.append_at(index, content, timestamp)?;
        self.infinity.lock().absorb(&self.chain)?;
        Ok(entry)
    }

    /// Encode an event canonically and append it
    pub fn append_event(&self, event: &LedgerEvent, timestamp: Timestamp) -> Result<EventReceipt> {
        let content = event.to_canonical_bytes()?;
        let entry = self.chain.append(content, timestamp)?;
        let infinity_digest = self.infinity.lock().absorb(&self.chain)?;
        Ok(EventReceipt {
            index: entry.index,
            entry_digest: entry.digest,
            infinity_digest,
        })
    }

    /// Record a pull request state in the chain
    pub fn hash_pr(
        &self,
        pr_number: u64,
        title: &str,
        branch: &str,
        status: &str,
        files_changed: &[String],
        commits: &[String],
    ) -> Result<InfinityDigest> {
        let event = LedgerEvent::PullRequest(PullRequestEvent {
            pr_number,
            title: title.to_string(),
            branch: branch.to_string(),
            status: status.to_string(),
            files_changed: files_changed.to_vec(),
            commits: commits.to_vec(),
        });
        Ok(self.append_event(&event, Utc::now())?.infinity_digest)
    }

    /// Record a kanban card state in the chain
    ///
    /// `extra_fields` are encoded in key order; a repeated key keeps its last value.
    pub fn hash_card(
        &self,
        card_id: &str,
        title: &str,
        status: &str,
        assignee: Option<&str>,
        priority: Option<&str>,
        extra_fields: &[(&str, &str)],
    ) -> Result<InfinityDigest> {
        let event = LedgerEvent::Card(CardEvent {
            card_id: card_id.to_string(),
            title: title.to_string(),
            status: status.to_string(),
            assignee: assignee.map(str::to_string),
            priority: priority.map(str::to_string),
            extra_fields: extra_fields
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        });
        Ok(self.append_event(&event, Utc::now())?.infinity_digest)
    }

    /// Record a card moving between columns
    pub fn hash_card_transition(&self, card_id: &str, from: &str, to: &str) -> Result<InfinityDigest> {
        let event = LedgerEvent::CardTransition {
            card_id: card_id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        };
        Ok(self.append_event(&event, Utc::now())?.infinity_digest)
    }

    /// Record the last observed state of an external endpoint
    pub fn hash_endpoint_state(
        &self,
        endpoint: &str,
        status: &str,
        response_code: u16,
        response_digest: &str,
    ) -> Result<InfinityDigest> {
        let event = LedgerEvent::EndpointState {
            endpoint: endpoint.to_string(),
            status: status.to_string(),
            response_code,
            response_digest: response_digest.to_string(),
        };
        Ok(self.append_event(&event, Utc::now())?.infinity_digest)
    }

    /// Digest of the folded history
    pub fn infinity_digest(&self) -> InfinityDigest {
        self.infinity.lock().digest()
    }

    /// Accumulator after `depth` folds
    pub fn accumulator_at(&self, depth: u64) -> Option<Hash> {
        self.infinity.lock().accumulator_at(depth)
    }

    /// Root of the batch folded as the `depth`-th
    pub fn batch_root(&self, depth: u64) -> Option<RootHash> {
        self.infinity
            .lock()
            .snapshots()
            .get(depth as usize)
            .map(|s| s.root)
    }

    /// Entries not yet folded
    pub fn pending_entries(&self) -> u64 {
        self.infinity.lock().pending_entries(self.chain.len())
    }

    /// Render a digest with the configured depth padding
    pub fn display_digest(&self, digest: &InfinityDigest) -> String {
        digest.display_padded(self.config.depth_display_width)
    }

    /// Mark the current digest as externally committed and return it
    pub fn publish(&self) -> InfinityDigest {
        let digest = self.infinity_digest();
        info!(digest = %digest, "publishing infinity digest");
        *self.published.write() = Some(digest);
        digest
    }

    /// Record a digest that was committed elsewhere
    pub fn set_published(&self, digest: InfinityDigest) {
        *self.published.write() = Some(digest);
    }

    /// The last externally committed digest
    pub fn published(&self) -> Option<InfinityDigest> {
        *self.published.read()
    }

    /// Verify the whole history and assemble a report
    ///
    /// The entries are verified, the folding is recomputed from scratch over
    /// the same snapshot of the chain, and the result is compared both with
    /// the incrementally maintained state and with the published digest.
    pub fn get_integrity_report(&self) -> IntegrityReport {
        let entries = self.chain.snapshot();
        let tail = entries.len() as u64;

        let verification = verify_entries(&entries, 0, tail);
        let mut errors = verification.messages();

        let digests: Vec<EntryDigest> = entries.iter().map(|e| e.digest).collect();
        let merkle_root = MerkleTree::from_hashes(&digests).root();

        let recomputed = match InfinityHasher::rebuild_from_digests(
            &digests,
            self.config.batch_size,
            &self.config.genesis_seed,
        ) {
            Ok(hasher) => hasher,
            Err(e) => {
                errors.push(format!("infinity digest could not be recomputed: {}", e));
                return self.finish_report(errors, verification.checked, merkle_root, tail);
            }
        };

        {
            let incremental = self.infinity.lock();
            let depth = recomputed.depth().min(incremental.depth());
            if incremental.accumulator_at(depth) != recomputed.accumulator_at(depth) {
                errors.push(format!(
                    "folded state at depth {} diverges from recomputed history",
                    depth
                ));
            }
        }

        if let Some(published) = self.published() {
            match recomputed.accumulator_at(published.depth) {
                None => errors.push(format!(
                    "published digest {} is ahead of recomputed history (depth {})",
                    published,
                    recomputed.depth()
                )),
                Some(value) if value != published.value => errors.push(format!(
                    "published digest {} does not match recomputed history ({})",
                    published,
                    InfinityDigest::new(published.depth, value)
                )),
                Some(_) => {}
            }
        }

        let report = IntegrityReport {
            valid: errors.is_empty(),
            errors,
            checked_entries: verification.checked,
            merkle_root,
            infinity_digest: recomputed.digest(),
            pending_entries: recomputed.pending_entries(tail),
        };

        if !report.valid {
            warn!(errors = report.errors.len(), "integrity check failed");
        }
        report
    }

    fn finish_report(
        &self,
        errors: Vec<String>,
        checked_entries: u64,
        merkle_root: RootHash,
        tail: u64,
    ) -> IntegrityReport {
        let infinity = self.infinity.lock();
        IntegrityReport {
            valid: false,
            errors,
            checked_entries,
            merkle_root,
            infinity_digest: infinity.digest(),
            pending_entries: infinity.pending_entries(tail),
        }
    }

    /// Inclusion proof for one entry within its batch (or the pending tail)
    pub fn prove_entry(&self, index: u64) -> Result<Proof> {
        let entries = self.chain.snapshot();
        let len = entries.len() as u64;
        if index >= len {
            return Err(ChainsealError::EntryNotFound { index, len });
        }

        let batch_size = self.config.batch_size as u64;
        let batch = index / batch_size;
        let complete = len / batch_size;

        let (start, end, scope) = if batch < complete {
            (
                batch * batch_size,
                (batch + 1) * batch_size,
                ProofScope::Batch { depth: batch },
            )
        } else {
            (complete * batch_size, len, ProofScope::PendingTail)
        };

        let leaves: Vec<EntryDigest> = entries[start as usize..end as usize]
            .iter()
            .map(|e| e.digest)
            .collect();
        Proof::generate(index, start, &leaves, scope, len)
    }

    /// Self-describing dump of the chain
    pub fn export(&self) -> ChainExport {
        let entries: Vec<Entry> = self.chain.entries_since(0).collect();
        let digests: Vec<EntryDigest> = entries.iter().map(|e| e.digest).collect();
        let infinity = self.infinity.lock();
        ChainExport {
            version: EXPORT_VERSION.to_string(),
            chain_length: entries.len() as u64,
            merkle_root: MerkleTree::from_hashes(&digests).root(),
            infinity_digest: infinity.digest(),
            pending_entries: infinity.pending_entries(entries.len() as u64),
            entries,
        }
    }
}
