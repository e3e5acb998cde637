//! Core budget logic for Cimiento.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the repository traits; hash events leave
//! through an injected observer.
//!
//! # Modules
//!
//! - `budget` - Budget aggregate, lines and the approval lifecycle
//! - `analysis` - Unit-price analyses and their hashed snapshots
//! - `consumption` - Actual expenditure records
//! - `tree` - Adjacency-list view and iterative traversal of the line forest
//! - `cost` - Plan and plan-vs-actual cost aggregation
//! - `integrity` - Merkle-based approval and execution hashes
//! - `repository` - Collaborator ports and an in-memory adapter

pub mod analysis;
pub mod budget;
pub mod consumption;
pub mod cost;
pub mod integrity;
pub mod repository;
pub mod tree;
