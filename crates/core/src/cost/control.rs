//! Plan-vs-actual control aggregation.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use cimiento_shared::types::{BudgetId, BudgetLineId};

use super::error::CostError;
use super::plan::analysis_unit_cost;
use super::report::ControlReport;
use crate::budget::{Budget, BudgetLine};
use crate::consumption::ConsumptionRecord;
use crate::repository::{AnalysisRepository, BudgetLineRepository, ConsumptionRepository};
use crate::tree::{BudgetTree, LineKind};

const PERCENT_SCALE: u32 = 4;

/// `actual / planned × 100`, rounded half away from zero to four decimals.
///
/// Zero when nothing was planned.
#[must_use]
pub fn execution_percent(actual: Decimal, planned: Decimal) -> Decimal {
    if planned <= Decimal::ZERO {
        return Decimal::new(0, PERCENT_SCALE);
    }
    let mut percent = (actual / planned * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    percent.rescale(PERCENT_SCALE);
    percent
}

/// Plan-vs-actual figures for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDatum {
    /// Leaf or title.
    pub kind: LineKind,
    /// Measured quantity. Zero for titles.
    pub quantity: Decimal,
    /// Analysis unit cost. Zero for titles.
    pub unit_cost: Decimal,
    /// Planned amount.
    pub planned_amount: Decimal,
    /// Consumed amount.
    pub actual_amount: Decimal,
    /// Planned minus actual.
    pub balance: Decimal,
    /// Share of the plan already consumed, in percent.
    pub execution_percent: Decimal,
}

impl ControlDatum {
    /// Figures for a leaf line.
    #[must_use]
    pub fn leaf(quantity: Decimal, unit_cost: Decimal, actual_amount: Decimal) -> Self {
        Self::with_amounts(
            LineKind::Leaf,
            quantity,
            unit_cost,
            quantity * unit_cost,
            actual_amount,
        )
    }

    /// Figures for a title line from the figures of its children.
    pub fn title<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a ControlDatum>,
    {
        let (planned, actual) = children
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(planned, actual), child| {
                (planned + child.planned_amount, actual + child.actual_amount)
            });
        Self::with_amounts(
            LineKind::Title,
            Decimal::ZERO,
            Decimal::ZERO,
            planned,
            actual,
        )
    }

    fn with_amounts(
        kind: LineKind,
        quantity: Decimal,
        unit_cost: Decimal,
        planned_amount: Decimal,
        actual_amount: Decimal,
    ) -> Self {
        Self {
            kind,
            quantity,
            unit_cost,
            planned_amount,
            actual_amount,
            balance: planned_amount - actual_amount,
            execution_percent: execution_percent(actual_amount, planned_amount),
        }
    }
}

/// Builds the per-line plan-vs-actual ledger of a budget.
///
/// Leaf costs come from the same analyses the plan aggregator reads, so both
/// agree on every leaf's planned amount.
#[derive(Debug)]
pub struct ControlCostAggregator<A> {
    analyses: Arc<A>,
}

impl<A: AnalysisRepository> ControlCostAggregator<A> {
    /// Creates an aggregator reading unit costs from `analyses`.
    #[must_use]
    pub fn new(analyses: Arc<A>) -> Self {
        Self { analyses }
    }

    /// Computes a [`ControlDatum`] for every line.
    ///
    /// Consumption booked against lines outside `lines` is ignored.
    ///
    /// # Errors
    ///
    /// Propagates analysis repository failures.
    pub fn aggregate_control_data(
        &self,
        lines: &[BudgetLine],
        consumption: &[ConsumptionRecord],
    ) -> Result<HashMap<BudgetLineId, ControlDatum>, CostError> {
        let mut actual_by_line: HashMap<BudgetLineId, Decimal> = HashMap::new();
        for record in consumption {
            *actual_by_line.entry(record.line_id).or_default() += record.amount;
        }

        let tree = BudgetTree::build(lines);
        let data = tree.roll_up(
            &tree.post_order(),
            |line| {
                let unit_cost = analysis_unit_cost(self.analyses.as_ref(), line.id)?;
                let actual = actual_by_line
                    .get(&line.id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                Ok::<_, CostError>(ControlDatum::leaf(line.quantity, unit_cost, actual))
            },
            |_, children| ControlDatum::title(children.iter().copied()),
        )?;

        Ok(lines
            .iter()
            .zip(data)
            .filter_map(|(line, datum)| datum.map(|datum| (line.id, datum)))
            .collect())
    }

    /// Loads a budget's lines and their consumption, then aggregates them.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn aggregate_budget<L, C>(
        &self,
        budget_id: BudgetId,
        lines: &L,
        consumption: &C,
    ) -> Result<HashMap<BudgetLineId, ControlDatum>, CostError>
    where
        L: BudgetLineRepository + ?Sized,
        C: ConsumptionRepository + ?Sized,
    {
        let (lines, records) = Self::load(budget_id, lines, consumption)?;
        self.aggregate_control_data(&lines, &records)
    }

    /// Builds the hierarchical control report of a budget.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn report<L, C>(
        &self,
        budget: &Budget,
        lines: &L,
        consumption: &C,
    ) -> Result<ControlReport, CostError>
    where
        L: BudgetLineRepository + ?Sized,
        C: ConsumptionRepository + ?Sized,
    {
        let (lines, records) = Self::load(budget.id, lines, consumption)?;
        let ledger = self.aggregate_control_data(&lines, &records)?;
        Ok(ControlReport::build(budget, &lines, &ledger))
    }

    fn load<L, C>(
        budget_id: BudgetId,
        lines: &L,
        consumption: &C,
    ) -> Result<(Vec<BudgetLine>, Vec<ConsumptionRecord>), CostError>
    where
        L: BudgetLineRepository + ?Sized,
        C: ConsumptionRepository + ?Sized,
    {
        let lines = lines.find_by_budget_id(budget_id)?;
        let mut records = Vec::new();
        for line in &lines {
            records.extend(consumption.list_by_line_id(line.id)?);
        }
        Ok((lines, records))
    }
}
