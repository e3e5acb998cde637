//! Budgets and their line forest.

pub mod error;
pub mod line;
pub mod service;
pub mod types;


pub use error::BudgetError;
pub use line::{BudgetLine, NewBudgetLine};
pub use types::{Budget, BudgetStatus};
