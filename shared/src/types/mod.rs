//! Result types produced by the report analyzers

pub mod metrics;
