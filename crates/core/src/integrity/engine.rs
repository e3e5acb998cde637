//! Approval and execution hash computation.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use super::canonical::{self, ALGORITHM_VERSION};
use super::clock::{Clock, SystemClock};
use super::error::IntegrityError;
use super::merkle::{merkle_root, sha256_hex};
use super::observer::{HashEvent, HashEventKind, IntegrityObserver};
use crate::budget::{Budget, BudgetLine};
use crate::repository::{AnalysisSnapshotRepository, BudgetLineRepository};

/// Computes the two integrity hashes of a budget.
///
/// This is what the budget aggregate calls on approval and verification.
pub trait IntegrityHasher {
    /// Structural fingerprint: stable for an unchanged structure and
    /// independent of line order.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    fn compute_approval_hash(&self, budget: &Budget) -> Result<String, IntegrityError>;

    /// Point-in-time fingerprint of the financial state, chained to the
    /// approval hash.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::MissingApprovalHash` for an unapproved budget
    /// and propagates repository failures.
    fn compute_execution_hash(&self, budget: &Budget) -> Result<String, IntegrityError>;
}

/// SHA-256 hash engine over the line and snapshot repositories.
pub struct IntegrityHashEngine<L, S> {
    lines: Arc<L>,
    snapshots: Arc<S>,
    observer: Arc<dyn IntegrityObserver>,
    clock: Arc<dyn Clock>,
}

impl<L, S> IntegrityHashEngine<L, S>
where
    L: BudgetLineRepository,
    S: AnalysisSnapshotRepository,
{
    /// Creates an engine using the system clock.
    #[must_use]
    pub fn new(lines: Arc<L>, snapshots: Arc<S>, observer: Arc<dyn IntegrityObserver>) -> Self {
        Self {
            lines,
            snapshots,
            observer,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock that stamps execution hashes.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Execution hash stamped with `at` instead of the clock.
    ///
    /// Reproducible for a fixed financial state and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::MissingApprovalHash` for an unapproved budget
    /// and propagates repository failures.
    pub fn compute_execution_hash_at(
        &self,
        budget: &Budget,
        at: DateTime<Utc>,
    ) -> Result<String, IntegrityError> {
        let approval_hash = budget
            .approval_hash
            .as_deref()
            .ok_or(IntegrityError::MissingApprovalHash(budget.id))?;

        let started = Instant::now();
        let correlation_id = self.observer.generate_correlation_id();
        let lines = self.lines.find_by_budget_id(budget.id)?;

        let hash = sha256_hex(&canonical::execution_buffer(approval_hash, &lines, at));

        self.emit(
            correlation_id,
            HashEventKind::ExecutionHash,
            budget,
            &hash,
            started,
            lines.len(),
        );
        Ok(hash)
    }

    /// Sorted Merkle root over the structural hashes of `lines`.
    ///
    /// # Errors
    ///
    /// Propagates snapshot repository failures.
    pub fn lines_merkle_root(&self, lines: &[BudgetLine]) -> Result<String, IntegrityError> {
        let hashes = lines
            .iter()
            .map(|line| self.line_hash(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(merkle_root(hashes))
    }

    /// Structural hash of one line including its analysis snapshot.
    ///
    /// # Errors
    ///
    /// Propagates snapshot repository failures.
    pub fn line_hash(&self, line: &BudgetLine) -> Result<String, IntegrityError> {
        let snapshot = self.snapshots.find_snapshot_by_line_id(line.id)?;
        Ok(sha256_hex(&canonical::line_buffer(line, snapshot.as_ref())))
    }

    fn emit(
        &self,
        correlation_id: String,
        kind: HashEventKind,
        budget: &Budget,
        hash: &str,
        started: Instant,
        line_count: usize,
    ) {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.observer.record_hash_event(&HashEvent {
            correlation_id,
            kind,
            budget_id: budget.id,
            hash: hash.to_string(),
            duration_ms,
            line_count,
            algorithm: ALGORITHM_VERSION,
        });
    }
}

impl<L, S> IntegrityHasher for IntegrityHashEngine<L, S>
where
    L: BudgetLineRepository,
    S: AnalysisSnapshotRepository,
{
    fn compute_approval_hash(&self, budget: &Budget) -> Result<String, IntegrityError> {
        let started = Instant::now();
        let correlation_id = self.observer.generate_correlation_id();
        let lines = self.lines.find_by_budget_id(budget.id)?;

        let root = self.lines_merkle_root(&lines)?;
        let hash = sha256_hex(&canonical::approval_buffer(budget, &root));

        self.emit(
            correlation_id,
            HashEventKind::ApprovalHash,
            budget,
            &hash,
            started,
            lines.len(),
        );
        Ok(hash)
    }

    fn compute_execution_hash(&self, budget: &Budget) -> Result<String, IntegrityError> {
        self.compute_execution_hash_at(budget, self.clock.now())
    }
}
