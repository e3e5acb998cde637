//! In-memory implementation of every repository port.
//!
//! Used by tests and by callers wiring the core without a database.

use dashmap::DashMap;

use cimiento_shared::types::{BudgetId, BudgetLineId};

use super::{
    AnalysisRepository, AnalysisSnapshotRepository, BudgetLineRepository, ConsumptionRepository,
    IntegrityAuditRepository, RepositoryError,
};
use crate::analysis::{AnalysisSnapshot, UnitPriceAnalysis};
use crate::budget::BudgetLine;
use crate::consumption::ConsumptionRecord;
use crate::integrity::IntegrityAuditEntry;

/// Thread-safe in-memory store.
///
/// Lines keep their insertion order per budget, which is the iteration order
/// the execution hash sees.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    lines: DashMap<BudgetId, Vec<BudgetLine>>,
    line_budgets: DashMap<BudgetLineId, BudgetId>,
    analyses: DashMap<BudgetLineId, UnitPriceAnalysis>,
    snapshots: DashMap<BudgetLineId, AnalysisSnapshot>,
    consumption: DashMap<BudgetLineId, Vec<ConsumptionRecord>>,
    audit: DashMap<BudgetId, Vec<IntegrityAuditEntry>>,
}

impl InMemoryRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a line, or replaces it in place if the ID already exists.
    pub fn insert_line(&self, line: BudgetLine) {
        let id = line.id;
        self.line_budgets.insert(id, line.budget_id);
        let mut lines = self.lines.entry(line.budget_id).or_default();
        if let Some(existing) = lines.iter_mut().find(|existing| existing.id == id) {
            *existing = line;
        } else {
            lines.push(line);
        }
    }

    /// Applies `change` to a stored line. Returns false if the line is unknown.
    pub fn update_line<F>(&self, line_id: BudgetLineId, change: F) -> bool
    where
        F: FnOnce(&mut BudgetLine),
    {
        let Some(budget_id) = self.line_budgets.get(&line_id).map(|b| *b) else {
            return false;
        };
        let Some(mut lines) = self.lines.get_mut(&budget_id) else {
            return false;
        };
        match lines.iter_mut().find(|line| line.id == line_id) {
            Some(line) => {
                change(line);
                true
            }
            None => false,
        }
    }

    /// Removes a line together with its analysis, snapshot and consumption.
    pub fn remove_line(&self, line_id: BudgetLineId) -> Option<BudgetLine> {
        let (_, budget_id) = self.line_budgets.remove(&line_id)?;
        self.analyses.remove(&line_id);
        self.snapshots.remove(&line_id);
        self.consumption.remove(&line_id);
        let mut lines = self.lines.get_mut(&budget_id)?;
        let position = lines.iter().position(|line| line.id == line_id)?;
        Some(lines.remove(position))
    }

    /// Attaches (or replaces) the working analysis of its line.
    pub fn insert_analysis(&self, analysis: UnitPriceAnalysis) {
        self.analyses.insert(analysis.line_id, analysis);
    }

    /// Attaches (or replaces) the structural snapshot of its line.
    pub fn insert_snapshot(&self, snapshot: AnalysisSnapshot) {
        self.snapshots.insert(snapshot.line_id, snapshot);
    }

    /// Applies `change` to a stored snapshot. Returns false if none exists.
    pub fn update_snapshot<F>(&self, line_id: BudgetLineId, change: F) -> bool
    where
        F: FnOnce(&mut AnalysisSnapshot),
    {
        match self.snapshots.get_mut(&line_id) {
            Some(mut snapshot) => {
                change(&mut snapshot);
                true
            }
            None => false,
        }
    }

    /// Appends a consumption record to its line.
    pub fn insert_consumption(&self, record: ConsumptionRecord) {
        self.consumption
            .entry(record.line_id)
            .or_default()
            .push(record);
    }

    /// Audit entries recorded for a budget, oldest first.
    #[must_use]
    pub fn audit_entries(&self, budget_id: BudgetId) -> Vec<IntegrityAuditEntry> {
        self.audit
            .get(&budget_id)
            .map(|entries| entries.value().clone())
            .unwrap_or_default()
    }
}

impl BudgetLineRepository for InMemoryRepository {
    fn find_by_budget_id(&self, budget_id: BudgetId) -> Result<Vec<BudgetLine>, RepositoryError> {
        Ok(self
            .lines
            .get(&budget_id)
            .map(|lines| lines.value().clone())
            .unwrap_or_default())
    }

    fn find_by_id(&self, line_id: BudgetLineId) -> Result<Option<BudgetLine>, RepositoryError> {
        let Some(budget_id) = self.line_budgets.get(&line_id).map(|b| *b) else {
            return Ok(None);
        };
        Ok(self.lines.get(&budget_id).and_then(|lines| {
            lines.iter().find(|line| line.id == line_id).cloned()
        }))
    }
}

impl AnalysisRepository for InMemoryRepository {
    fn find_by_line_id(
        &self,
        line_id: BudgetLineId,
    ) -> Result<Option<UnitPriceAnalysis>, RepositoryError> {
        Ok(self.analyses.get(&line_id).map(|a| a.value().clone()))
    }

    fn exists_for_line_id(&self, line_id: BudgetLineId) -> Result<bool, RepositoryError> {
        Ok(self.analyses.contains_key(&line_id))
    }
}

impl AnalysisSnapshotRepository for InMemoryRepository {
    fn find_snapshot_by_line_id(
        &self,
        line_id: BudgetLineId,
    ) -> Result<Option<AnalysisSnapshot>, RepositoryError> {
        Ok(self.snapshots.get(&line_id).map(|s| s.value().clone()))
    }
}

impl ConsumptionRepository for InMemoryRepository {
    fn list_by_budget_id(
        &self,
        budget_id: BudgetId,
    ) -> Result<Vec<ConsumptionRecord>, RepositoryError> {
        let line_ids: Vec<BudgetLineId> = self
            .lines
            .get(&budget_id)
            .map(|lines| lines.iter().map(|line| line.id).collect())
            .unwrap_or_default();

        let mut records = Vec::new();
        for line_id in line_ids {
            records.extend(self.list_by_line_id(line_id)?);
        }
        Ok(records)
    }

    fn list_by_line_id(
        &self,
        line_id: BudgetLineId,
    ) -> Result<Vec<ConsumptionRecord>, RepositoryError> {
        Ok(self
            .consumption
            .get(&line_id)
            .map(|records| records.value().clone())
            .unwrap_or_default())
    }
}

impl IntegrityAuditRepository for InMemoryRepository {
    fn save(&self, entry: IntegrityAuditEntry) -> Result<(), RepositoryError> {
        self.audit.entry(entry.budget_id).or_default().push(entry);
        Ok(())
    }
}
