//! Planned cost roll-up.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use cimiento_shared::types::{BudgetId, BudgetLineId};

use super::error::CostError;
use crate::budget::BudgetLine;
use crate::repository::{AnalysisRepository, BudgetLineRepository, RepositoryError};
use crate::tree::BudgetTree;

/// Unit cost of a line's analysis, or zero when none is attached.
pub(crate) fn analysis_unit_cost<A>(
    analyses: &A,
    line_id: BudgetLineId,
) -> Result<Decimal, RepositoryError>
where
    A: AnalysisRepository + ?Sized,
{
    Ok(analyses
        .find_by_line_id(line_id)?
        .map_or(Decimal::ZERO, |analysis| analysis.total_cost()))
}

/// Computes planned costs bottom-up from unit-price analyses.
///
/// A leaf costs `quantity × analysis cost` (zero without an analysis); a
/// title costs the sum of its children. Each call reloads the lines and
/// values every node once.
#[derive(Debug)]
pub struct PlanCostAggregator<L, A> {
    lines: Arc<L>,
    analyses: Arc<A>,
}

impl<L, A> PlanCostAggregator<L, A>
where
    L: BudgetLineRepository,
    A: AnalysisRepository,
{
    /// Creates an aggregator over the given repositories.
    #[must_use]
    pub fn new(lines: Arc<L>, analyses: Arc<A>) -> Self {
        Self { lines, analyses }
    }

    /// Total planned cost of a budget: the sum of its root line costs.
    ///
    /// A budget without lines costs zero.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn calculate_total_cost(&self, budget_id: BudgetId) -> Result<Decimal, CostError> {
        let lines = self.lines.find_by_budget_id(budget_id)?;
        let tree = BudgetTree::build(&lines);
        let costs = self.roll_up(&tree, &tree.post_order_from_roots())?;

        Ok(tree.roots().iter().filter_map(|&root| costs[root]).sum())
    }

    /// Planned cost of a single line and its subtree.
    ///
    /// # Errors
    ///
    /// Returns `CostError::LineNotFound` for an unknown line and propagates
    /// repository failures.
    pub fn calculate_line_cost(&self, line_id: BudgetLineId) -> Result<Decimal, CostError> {
        let line = self
            .lines
            .find_by_id(line_id)?
            .ok_or(CostError::LineNotFound(line_id))?;
        let lines = self.lines.find_by_budget_id(line.budget_id)?;
        let tree = BudgetTree::build(&lines);
        let start = tree
            .position(line_id)
            .ok_or(CostError::LineNotFound(line_id))?;

        let costs = self.roll_up(&tree, &tree.post_order_from(start))?;
        Ok(costs[start].unwrap_or(Decimal::ZERO))
    }

    /// Planned cost of every line of a budget from one traversal.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn calculate_line_costs(
        &self,
        budget_id: BudgetId,
    ) -> Result<HashMap<BudgetLineId, Decimal>, CostError> {
        let lines = self.lines.find_by_budget_id(budget_id)?;
        let tree = BudgetTree::build(&lines);
        let costs = self.roll_up(&tree, &tree.post_order())?;

        Ok(lines
            .iter()
            .zip(costs)
            .filter_map(|(line, cost)| cost.map(|cost| (line.id, cost)))
            .collect())
    }

    /// Whether every leaf line has an attached analysis.
    ///
    /// Vacuously true for a budget without lines. Approval workflows reject
    /// the budget when this is false.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn all_leaf_lines_have_analysis(&self, budget_id: BudgetId) -> Result<bool, CostError> {
        let lines = self.lines.find_by_budget_id(budget_id)?;
        let tree = BudgetTree::build(&lines);

        for leaf in tree.leaves() {
            if !self.analyses.exists_for_line_id(leaf.id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn leaf_cost(&self, line: &BudgetLine) -> Result<Decimal, CostError> {
        Ok(line.quantity * analysis_unit_cost(self.analyses.as_ref(), line.id)?)
    }

    fn roll_up(
        &self,
        tree: &BudgetTree<'_>,
        order: &[usize],
    ) -> Result<Vec<Option<Decimal>>, CostError> {
        tree.roll_up(
            order,
            |line| self.leaf_cost(line),
            |_, children| children.iter().copied().copied().sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::UnitPriceAnalysis;
    use crate::budget::NewBudgetLine;
    use crate::repository::InMemoryRepository;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        budget_id: BudgetId,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                repo: Arc::new(InMemoryRepository::new()),
                budget_id: BudgetId::new(),
            }
        }

        fn line(&self, parent: Option<BudgetLineId>, code: &str, quantity: Decimal) -> BudgetLineId {
            let line = BudgetLine::new(NewBudgetLine {
                budget_id: self.budget_id,
                parent_id: parent,
                code: code.to_string(),
                description: format!("Line {code}"),
                unit: Some("m2".to_string()),
                quantity,
                level: if parent.is_some() { 2 } else { 1 },
                allocated_amount: None,
            })
            .unwrap();
            let id = line.id;
            self.repo.insert_line(line);
            id
        }

        fn price(&self, line_id: BudgetLineId, unit_cost: Decimal) {
            let analysis = UnitPriceAnalysis::new(line_id, None, "m2")
                .unwrap()
                .with_resource(Uuid::now_v7(), Decimal::ONE, unit_cost)
                .unwrap();
            self.repo.insert_analysis(analysis);
        }

        fn aggregator(&self) -> PlanCostAggregator<InMemoryRepository, InMemoryRepository> {
            PlanCostAggregator::new(Arc::clone(&self.repo), Arc::clone(&self.repo))
        }
    }

    #[test]
    fn test_title_sums_its_leaves() {
        let fx = Fixture::new();
        let title = fx.line(None, "01", dec!(99));
        let a = fx.line(Some(title), "01.01", dec!(10));
        let b = fx.line(Some(title), "01.02", dec!(5));
        fx.price(a, dec!(100));
        fx.price(b, dec!(50));
        let agg = fx.aggregator();

        assert_eq!(agg.calculate_line_cost(a).unwrap(), dec!(1000));
        assert_eq!(agg.calculate_line_cost(b).unwrap(), dec!(250));
        assert_eq!(agg.calculate_line_cost(title).unwrap(), dec!(1250));
        assert_eq!(agg.calculate_total_cost(fx.budget_id).unwrap(), dec!(1250));
    }

    #[test]
    fn test_missing_analysis_costs_zero_and_blocks_approval() {
        let fx = Fixture::new();
        let priced = fx.line(None, "01", dec!(2));
        let unpriced = fx.line(None, "02", dec!(3));
        fx.price(priced, dec!(10));
        let agg = fx.aggregator();

        assert_eq!(agg.calculate_line_cost(unpriced).unwrap(), Decimal::ZERO);
        assert_eq!(agg.calculate_total_cost(fx.budget_id).unwrap(), dec!(20));
        assert!(!agg.all_leaf_lines_have_analysis(fx.budget_id).unwrap());

        fx.price(unpriced, dec!(1));
        assert!(agg.all_leaf_lines_have_analysis(fx.budget_id).unwrap());
    }

    #[test]
    fn test_titles_do_not_need_analysis() {
        let fx = Fixture::new();
        let title = fx.line(None, "01", dec!(1));
        let leaf = fx.line(Some(title), "01.01", dec!(1));
        fx.price(leaf, dec!(1));

        assert!(fx.aggregator().all_leaf_lines_have_analysis(fx.budget_id).unwrap());
    }

    #[test]
    fn test_empty_budget_is_vacuously_valid() {
        let fx = Fixture::new();
        let agg = fx.aggregator();

        assert_eq!(agg.calculate_total_cost(fx.budget_id).unwrap(), Decimal::ZERO);
        assert!(agg.all_leaf_lines_have_analysis(fx.budget_id).unwrap());
        assert!(agg.calculate_line_costs(fx.budget_id).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_line_is_not_found() {
        let fx = Fixture::new();
        let missing = BudgetLineId::new();

        assert!(matches!(
            fx.aggregator().calculate_line_cost(missing),
            Err(CostError::LineNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_line_costs_cover_every_line() {
        let fx = Fixture::new();
        let root = fx.line(None, "01", dec!(1));
        let leaf = fx.line(Some(root), "01.01", dec!(4));
        let other = fx.line(None, "02", dec!(1));
        fx.price(leaf, dec!(2.5));

        let costs = fx.aggregator().calculate_line_costs(fx.budget_id).unwrap();
        assert_eq!(costs.len(), 3);
        assert_eq!(costs[&leaf], dec!(10));
        assert_eq!(costs[&root], dec!(10));
        assert_eq!(costs[&other], Decimal::ZERO);
    }
}
