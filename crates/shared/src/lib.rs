//! Shared types, errors, and configuration for Cimiento.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, IntegrityConfig, LoggingConfig};
pub use error::{AppError, AppResult};
