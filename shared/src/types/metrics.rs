//! Metric value types
//!
//! A report analysis produces a map from benchmark metric name to a value.
//! Depending on the metric, that value is a single number, a count, a pair
//! of numbers, or one entry per kernel in report order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metric name -> computed value, ordered by name
pub type MetricMap = BTreeMap<String, MetricValue>;

/// A single computed metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Number of items (e.g. kernels)
    Count(u64),

    /// Single number (milliseconds, ops/byte, ...)
    Scalar(f64),

    /// DRAM bytes read and written
    Traffic { read: f64, write: f64 },

    /// Single and double precision variants of the same quantity
    Precision { fp32: f64, fp64: f64 },

    /// One numeric value per kernel, in report order
    Series(Vec<f64>),

    /// One label per kernel, in report order
    Labels(Vec<String>),
}

impl MetricValue {
    /// Number of per-kernel entries for sequence values
    pub fn entry_count(&self) -> Option<usize> {
        match self {
            MetricValue::Series(v) => Some(v.len()),
            MetricValue::Labels(v) => Some(v.len()),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Scalar(v) => write!(f, "{:.6}", v),
            MetricValue::Traffic { read, write } => {
                write!(f, "read={:.0}B write={:.0}B", read, write)
            }
            MetricValue::Precision { fp32, fp64 } => {
                write!(f, "fp32={:.6} fp64={:.6}", fp32, fp64)
            }
            MetricValue::Series(values) => {
                let items: Vec<String> = values.iter().map(|v| format!("{:.6}", v)).collect();
                write!(f, "[{}]", items.join(", "))
            }
            MetricValue::Labels(labels) => write!(f, "[{}]", labels.join(", ")),
        }
    }
}
