//! Hierarchical control report.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cimiento_shared::types::{BudgetId, BudgetLineId};

use super::control::{ControlDatum, execution_percent};
use crate::budget::{Budget, BudgetLine};
use crate::tree::BudgetTree;

/// One line of the report with its nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlReportRow {
    /// Line ID.
    pub line_id: BudgetLineId,
    /// Sequence code.
    pub code: String,
    /// Description.
    pub description: String,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Depth level.
    pub level: u32,
    /// Plan-vs-actual figures.
    pub datum: ControlDatum,
    /// Child rows, sorted by sequence code.
    pub children: Vec<ControlReportRow>,
}

/// Plan-vs-actual report of a whole budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlReport {
    /// Budget ID.
    pub budget_id: BudgetId,
    /// Budget name.
    pub budget_name: String,
    /// Sum of root planned amounts.
    pub total_planned: Decimal,
    /// Sum of root actual amounts.
    pub total_actual: Decimal,
    /// Total planned minus total actual.
    pub total_balance: Decimal,
    /// Budget-wide execution percent.
    pub total_execution_percent: Decimal,
    /// Root rows, sorted by sequence code.
    pub rows: Vec<ControlReportRow>,
}

impl ControlReport {
    /// Arranges a ledger into rows and totals it over the root lines.
    ///
    /// Lines missing from `ledger` are left out together with their subtree.
    #[must_use]
    pub fn build(
        budget: &Budget,
        lines: &[BudgetLine],
        ledger: &HashMap<BudgetLineId, ControlDatum>,
    ) -> Self {
        let tree = BudgetTree::build(lines);
        let mut rows: Vec<Option<ControlReportRow>> = vec![None; lines.len()];

        for idx in tree.post_order_from_roots() {
            let line = tree.line(idx);
            let Some(datum) = ledger.get(&line.id) else {
                continue;
            };
            let children = sorted(
                tree.children(idx)
                    .iter()
                    .filter_map(|&child| rows[child].take())
                    .collect(),
            );
            rows[idx] = Some(ControlReportRow {
                line_id: line.id,
                code: line.code.clone(),
                description: line.description.clone(),
                unit: line.unit.clone(),
                level: line.level,
                datum: datum.clone(),
                children,
            });
        }

        let roots = sorted(
            tree.roots()
                .iter()
                .filter_map(|&root| rows[root].take())
                .collect(),
        );
        let total_planned: Decimal = roots.iter().map(|row| row.datum.planned_amount).sum();
        let total_actual: Decimal = roots.iter().map(|row| row.datum.actual_amount).sum();

        Self {
            budget_id: budget.id,
            budget_name: budget.name.clone(),
            total_planned,
            total_actual,
            total_balance: total_planned - total_actual,
            total_execution_percent: execution_percent(total_actual, total_planned),
            rows: roots,
        }
    }
}

fn sorted(mut rows: Vec<ControlReportRow>) -> Vec<ControlReportRow> {
    rows.sort_by(|a, b| a.code.cmp(&b.code));
    rows
}
