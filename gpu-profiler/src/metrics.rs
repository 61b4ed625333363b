//! Per-kernel metric pairs and the weighted accumulators used to summarize them

use kernelscope_shared::MetricValue;
use serde::Serialize;
use std::ops::{Add, Mul};

/// A quantity tracked separately for single and double precision
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FpPair {
    pub fp32: f64,
    pub fp64: f64,
}

impl FpPair {
    pub fn new(fp32: f64, fp64: f64) -> Self {
        Self { fp32, fp64 }
    }

    /// Apply `f` to both precisions
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            fp32: f(self.fp32),
            fp64: f(self.fp64),
        }
    }
}

impl Add for FpPair {
    type Output = FpPair;

    fn add(self, rhs: FpPair) -> FpPair {
        FpPair::new(self.fp32 + rhs.fp32, self.fp64 + rhs.fp64)
    }
}

impl Mul<f64> for FpPair {
    type Output = FpPair;

    fn mul(self, rhs: f64) -> FpPair {
        self.map(|v| v * rhs)
    }
}

impl From<FpPair> for MetricValue {
    fn from(pair: FpPair) -> Self {
        MetricValue::Precision {
            fp32: pair.fp32,
            fp64: pair.fp64,
        }
    }
}

/// DRAM bytes read and written by one kernel or a whole report
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DramTraffic {
    pub read: f64,
    pub write: f64,
}

impl DramTraffic {
    pub fn total(&self) -> f64 {
        self.read + self.write
    }
}

impl Add for DramTraffic {
    type Output = DramTraffic;

    fn add(self, rhs: DramTraffic) -> DramTraffic {
        DramTraffic {
            read: self.read + rhs.read,
            write: self.write + rhs.write,
        }
    }
}

impl From<DramTraffic> for MetricValue {
    fn from(traffic: DramTraffic) -> Self {
        MetricValue::Traffic {
            read: traffic.read,
            write: traffic.write,
        }
    }
}

/// Weighted average over kernels, accumulated first and normalized once.
///
/// `weighted_sum` and `total_weight` are kept apart until `finish`, so the
/// result does not depend on the order kernels are added in.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedAverage {
    weighted_sum: FpPair,
    total_weight: f64,
    samples: usize,
}

impl WeightedAverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one kernel's value with its weight
    pub fn add(&mut self, value: FpPair, weight: f64) {
        self.weighted_sum = self.weighted_sum + value * weight;
        self.total_weight += weight;
        self.samples += 1;
    }

    /// Sum of value x weight
    pub fn weighted_sum(&self) -> FpPair {
        self.weighted_sum
    }

    /// Sum of weights
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of kernels added
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Normalized average, or None when there is no weight to divide by
    pub fn finish(&self) -> Option<FpPair> {
        if self.total_weight == 0.0 {
            return None;
        }
        let total = self.total_weight;
        Some(self.weighted_sum.map(|v| v / total))
    }
}
