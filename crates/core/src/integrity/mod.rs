//! Tamper-evident fingerprints of approved budgets.
//!
//! The approval hash covers the budget header and a sorted Merkle root over
//! per-line structural hashes, so it is stable under line reordering and
//! changes whenever any structural field changes. The execution hash chains
//! the approval hash to the live financial state and a timestamp.

pub mod audit;
pub mod canonical;
pub mod clock;
pub mod engine;
pub mod error;
pub mod merkle;
pub mod observer;

#[cfg(test)]
mod tests;

pub use audit::{AuditEventType, AuditOutcome, IntegrityAuditEntry, IntegrityAuditLog};
pub use canonical::{ALGORITHM_VERSION, FORMAT_VERSION};
pub use clock::{Clock, SystemClock};
pub use engine::{IntegrityHashEngine, IntegrityHasher};
pub use error::IntegrityError;
pub use merkle::{merkle_root, sha256_hex};
pub use observer::{HashEvent, HashEventKind, IntegrityObserver, TracingObserver};
