//! The append-only hash chain

use crate::chain::entry::Entry;
use crate::chain::journal::Journal;
use crate::chain::verify::{RangeVerification, VerificationFault};
use crate::core::error::{ChainsealError, Result};
use crate::core::types::{EntryDigest, Timestamp};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Tamper-evident, append-only sequence of entries
///
/// Appends are serialized by a write lock covering "read tail, compute
/// digest, persist, publish", so no two appends can share an index and a
/// reader never observes a partially written entry. Readers take a cheap
/// snapshot of the entry list and work on it without holding the lock.
#[derive(Debug, Default)]
pub struct HashChain {
    state: RwLock<ChainState>,
}

#[derive(Debug, Default)]
struct ChainState {
    entries: Vec<Arc<Entry>>,
    journal: Option<Journal>,
}

impl HashChain {
    /// Create an empty in-memory chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a chain backed by a durable journal, replaying what it holds
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let (journal, entries) = Journal::open(path)?;
        let entries = Self::check_contiguous(entries)?;
        Ok(Self {
            state: RwLock::new(ChainState {
                entries,
                journal: Some(journal),
            }),
        })
    }

    /// Load an in-memory chain from previously exported entries
    ///
    /// Only index contiguity is enforced. Digests and links are left for
    /// [`HashChain::verify_range`] to judge, so untrusted history can be
    /// loaded and then reported on.
    pub fn from_entries(entries: Vec<Entry>) -> Result<Self> {
        let entries = Self::check_contiguous(entries)?;
        Ok(Self {
            state: RwLock::new(ChainState {
                entries,
                journal: None,
            }),
        })
    }

    fn check_contiguous(entries: Vec<Entry>) -> Result<Vec<Arc<Entry>>> {
        entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                if entry.index != position as u64 {
                    return Err(ChainsealError::ordering_violation(
                        position as u64,
                        entry.index,
                    ));
                }
                Ok(Arc::new(entry))
            })
            .collect()
    }

    /// Append content at the next engine-assigned index
    pub fn append(&self, content: Vec<u8>, timestamp: Timestamp) -> Result<Entry> {
        let mut state = self.state.write();
        let index = state.entries.len() as u64;
        Self::append_locked(&mut state, index, content, timestamp)
    }

    /// Append content at a caller-supplied index
    ///
    /// Fails with `OrderingViolation` unless `index` equals the current length.
    pub fn append_at(&self, index: u64, content: Vec<u8>, timestamp: Timestamp) -> Result<Entry> {
        let mut state = self.state.write();
        let expected = state.entries.len() as u64;
        if index != expected {
            return Err(ChainsealError::ordering_violation(expected, index));
        }
        Self::append_locked(&mut state, index, content, timestamp)
    }

    fn append_locked(
        state: &mut ChainState,
        index: u64,
        content: Vec<u8>,
        timestamp: Timestamp,
    ) -> Result<Entry> {
        let prev_digest = state.entries.last().map(|e| e.digest);
        let entry = Entry::new(index, content, timestamp, prev_digest);

        // Durable before visible
        if let Some(journal) = state.journal.as_mut() {
            journal.append(&entry)?;
        }

        debug!(index, digest = %entry.digest, "appended entry");
        state.entries.push(Arc::new(entry.clone()));
        Ok(entry)
    }

    /// Number of entries
    pub fn len(&self) -> u64 {
        self.state.read().entries.len() as u64
    }

    /// Whether the chain has no entries
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Digest of the last entry
    pub fn tail_digest(&self) -> Option<EntryDigest> {
        self.state.read().entries.last().map(|e| e.digest)
    }

    /// Entry at an index
    pub fn get(&self, index: u64) -> Option<Entry> {
        self.state
            .read()
            .entries
            .get(index as usize)
            .map(|e| Entry::clone(e))
    }

    /// Consistent view of all entries visible right now
    pub(crate) fn snapshot(&self) -> Vec<Arc<Entry>> {
        self.state.read().entries.clone()
    }

    /// Stored digests of the entries in `[start, end)`, clamped to the tail
    pub fn digests(&self, start: u64, end: u64) -> Vec<EntryDigest> {
        let state = self.state.read();
        let end = (end as usize).min(state.entries.len());
        let start = (start as usize).min(end);
        state.entries[start..end].iter().map(|e| e.digest).collect()
    }

    /// Entries from `index` onward, in ascending order
    ///
    /// The sequence covers the entries visible when it was created; call
    /// [`EntriesSince::restart`] or clone it to iterate again.
    pub fn entries_since(&self, index: u64) -> EntriesSince {
        let state = self.state.read();
        let start = (index as usize).min(state.entries.len());
        EntriesSince {
            entries: state.entries[start..].into(),
            position: 0,
        }
    }

    /// Verify entries in `[start, end)`
    ///
    /// Recomputes each entry's digest and checks its link to the previous
    /// entry (the entry just before `start` included). Every failing entry
    /// is reported; scanning never stops at the first fault.
    pub fn verify_range(&self, start: u64, end: u64) -> RangeVerification {
        let entries = self.snapshot();
        verify_entries(&entries, start, end)
    }
}

pub(crate) fn verify_entries(entries: &[Arc<Entry>], start: u64, end: u64) -> RangeVerification {
    let tail = entries.len() as u64;
    let mut verification = RangeVerification::default();

    if end > tail {
        verification
            .faults
            .push(VerificationFault::RangeBeyondTail { end, tail });
    }
    let end = end.min(tail);

    for position in start..end {
        let entry = &entries[position as usize];
        verification.checked += 1;

        if entry.index != position {
            verification.faults.push(VerificationFault::IndexMismatch {
                position,
                found: entry.index,
            });
        }

        let computed = entry.recompute_digest();
        if computed != entry.digest {
            verification.faults.push(VerificationFault::DigestMismatch {
                index: position,
                stored: entry.digest,
                computed,
            });
        }

        if position == 0 {
            if entry.prev_digest.is_some() {
                verification
                    .faults
                    .push(VerificationFault::UnexpectedPrevDigest);
            }
        } else {
            let previous = &entries[position as usize - 1];
            match entry.prev_digest {
                None => verification
                    .faults
                    .push(VerificationFault::MissingPrevDigest { index: position }),
                Some(prev) if prev != previous.digest => verification
                    .faults
                    .push(VerificationFault::BrokenLink { index: position }),
                Some(_) => {}
            }
        }
    }

    verification
}

/// Restartable, finite iterator over a snapshot of chain entries
#[derive(Debug, Clone)]
pub struct EntriesSince {
    entries: Arc<[Arc<Entry>]>,
    position: usize,
}

impl EntriesSince {
    /// Rewind to the first entry of the snapshot
    pub fn restart(&mut self) {
        self.position = 0;
    }
}

impl Iterator for EntriesSince {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.position)?;
        self.position += 1;
        Some(Entry::clone(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EntriesSince {}
