//! Shared types and utilities for Kernelscope
//!
//! This crate contains the metric value types returned by the report
//! analyzers, plus the small unit and duration helpers used by both the
//! analyzers and the command-line interface.

pub mod types;
pub mod utils;

// Re-export commonly used types
pub use types::metrics::*;
