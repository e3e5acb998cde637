//! Budget tree materialisation and traversal.
//!
//! Repositories hand back a flat list of lines. [`BudgetTree`] indexes that
//! list into an adjacency list and walks it iteratively, so deep bills of
//! quantities never hit recursion limits.

mod index;

pub use index::{BudgetTree, LineKind};
