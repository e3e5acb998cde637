//! Unit-price analyses ("APU") attached to leaf budget lines.
//!
//! Two shapes exist: the working [`UnitPriceAnalysis`] used for cost math and
//! the frozen [`AnalysisSnapshot`] copied from the price catalog, which is
//! what the integrity engine fingerprints.

pub mod error;
pub mod types;

pub use error::AnalysisError;
pub use types::{
    AnalysisResource, AnalysisSnapshot, NewAnalysisSnapshot, ResourceSnapshot, UnitPriceAnalysis,
};
