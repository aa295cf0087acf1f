//! Integrity reports and the engine that produces them

pub mod engine;
pub mod events;
#[allow(clippy::module_inception)]
pub mod report;

pub use engine::{EventReceipt, IntegrityEngine};
pub use events::{CardEvent, LedgerEvent, PullRequestEvent};
pub use report::{ChainExport, IntegrityReport};
