//! Error types for report analysis

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Analyzer error types
///
/// Every variant is fatal: an analysis either produces a complete metric map
/// or fails without partial results.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Requested metric is not provided by this analyzer
    #[error("Unknown {tool} metric: {name}")]
    UnknownMetric { tool: &'static str, name: String },

    /// Input report does not exist
    #[error("The {tool} report at {} does not exist", .path.display())]
    ReportNotFound { tool: &'static str, path: PathBuf },

    /// Profiler executable is not on the search path or configured location
    #[error("Could not find '{tool}' command in {searched}")]
    ToolNotFound { tool: String, searched: String },

    /// Profiler installation lacks an expected directory
    #[error("'{expected}' does not exist in the {tool} installation at {}", .root.display())]
    MalformedInstallation {
        tool: &'static str,
        root: PathBuf,
        expected: &'static str,
    },

    /// Report contains no profiling ranges
    #[error("No profile data found in the report at {}", .0.display())]
    NoRanges(PathBuf),

    /// Default range of the report has no kernel actions
    #[error("No profile data found in the default range of the report at {}", .0.display())]
    EmptyRange(PathBuf),

    /// Kernel record lacks a counter required by a requested metric
    #[error("Kernel '{kernel}' has no value for counter '{counter}'")]
    MissingCounter { kernel: String, counter: String },

    /// Value could not be parsed as a number
    #[error("Invalid value '{value}' for '{field}'")]
    InvalidValue { field: String, value: String },

    /// Weighted average has nothing to weight by
    #[error("Cannot compute {metric}: total {weight} across kernels is zero")]
    ZeroWeight {
        metric: &'static str,
        weight: &'static str,
    },

    /// Export command did not produce an expected CSV file
    #[error("Expected CSV report not found at {}", .0.display())]
    MissingExport(PathBuf),

    /// CSV lacks a required column
    #[error("Column '{column}' missing from {}", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// CSV has a different number of data rows than the report contract allows
    #[error("Expected exactly {expected} row(s) in {}, found {found}", .path.display())]
    UnexpectedRowCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// External profiler command exited unsuccessfully
    #[error("Failed to run {tool} command: {command}\n{status}: {stderr}")]
    ToolFailed {
        tool: String,
        command: String,
        status: String,
        stderr: String,
    },

    /// External profiler command exceeded the configured timeout
    #[error("{tool} did not finish within {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    /// Invalid analyzer configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
