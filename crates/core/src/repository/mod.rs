//! Repository ports consumed by the aggregators and the integrity engine.
//!
//! These traits are implemented by the persistence layer. All calls are
//! synchronous reads within a caller-managed transaction; the core assumes
//! it is handed a consistent snapshot for the duration of one call.

pub mod error;
pub mod memory;

use cimiento_shared::types::{BudgetId, BudgetLineId};

use crate::analysis::{AnalysisSnapshot, UnitPriceAnalysis};
use crate::budget::BudgetLine;
use crate::consumption::ConsumptionRecord;
use crate::integrity::IntegrityAuditEntry;

pub use error::RepositoryError;
pub use memory::InMemoryRepository;

/// Read access to budget lines.
pub trait BudgetLineRepository: Send + Sync {
    /// All lines of a budget, in repository iteration order.
    fn find_by_budget_id(&self, budget_id: BudgetId) -> Result<Vec<BudgetLine>, RepositoryError>;

    /// A single line by ID.
    fn find_by_id(&self, line_id: BudgetLineId) -> Result<Option<BudgetLine>, RepositoryError>;
}

/// Read access to working unit-price analyses.
pub trait AnalysisRepository: Send + Sync {
    /// The analysis attached to a line, if any.
    fn find_by_line_id(
        &self,
        line_id: BudgetLineId,
    ) -> Result<Option<UnitPriceAnalysis>, RepositoryError>;

    /// Whether a line has an attached analysis.
    fn exists_for_line_id(&self, line_id: BudgetLineId) -> Result<bool, RepositoryError>;
}

/// Read access to structural analysis snapshots used for hashing.
pub trait AnalysisSnapshotRepository: Send + Sync {
    /// The snapshot attached to a line, including resource snapshots.
    fn find_snapshot_by_line_id(
        &self,
        line_id: BudgetLineId,
    ) -> Result<Option<AnalysisSnapshot>, RepositoryError>;
}

/// Read access to consumption records.
pub trait ConsumptionRepository: Send + Sync {
    /// All records booked against lines of a budget.
    fn list_by_budget_id(
        &self,
        budget_id: BudgetId,
    ) -> Result<Vec<ConsumptionRecord>, RepositoryError>;

    /// All records booked against one line.
    fn list_by_line_id(
        &self,
        line_id: BudgetLineId,
    ) -> Result<Vec<ConsumptionRecord>, RepositoryError>;
}

/// Append-only store for integrity audit entries.
pub trait IntegrityAuditRepository: Send + Sync {
    /// Persists one entry.
    fn save(&self, entry: IntegrityAuditEntry) -> Result<(), RepositoryError>;
}
