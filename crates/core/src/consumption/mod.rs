//! Consumption records: actual-expenditure events booked against a line.

pub mod error;
pub mod types;

pub use error::ConsumptionError;
pub use types::{ConsumptionKind, ConsumptionRecord};
