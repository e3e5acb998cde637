//! Plan and plan-vs-actual cost aggregation over the budget tree.

pub mod control;
pub mod error;
pub mod plan;
pub mod report;


pub use control::{ControlCostAggregator, ControlDatum, execution_percent};
pub use error::CostError;
pub use plan::PlanCostAggregator;
pub use report::{ControlReport, ControlReportRow};
