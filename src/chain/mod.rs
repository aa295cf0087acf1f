//! Hash chain: ordered, tamper-evident history of entries

#[allow(clippy::module_inception)]
pub mod chain;
pub mod entry;
pub mod journal;
pub mod verify;

pub use chain::{EntriesSince, HashChain};
pub use entry::Entry;
pub use journal::{Journal, JournalStorage};
pub use verify::{RangeVerification, VerificationFault};
