//! Nsight Compute counter tables
//!
//! Code refers to counters by short name only; this table is the single
//! place the vendor counter identifiers appear.

use crate::analyzer::BenchMetric;
use serde::Serialize;
use std::collections::BTreeSet;

/// Short counter name -> Nsight Compute counter identifier
pub const SHORT_COUNTER_NAMES: &[(&str, &str)] = &[
    (
        "inst_executed_ffma_peak",
        "sm__sass_thread_inst_executed_op_ffma_pred_on.sum.peak_sustained",
    ),
    (
        "inst_executed_dfma_peak",
        "sm__sass_thread_inst_executed_op_dfma_pred_on.sum.peak_sustained",
    ),
    (
        "inst_executed_fadd",
        "smsp__sass_thread_inst_executed_op_fadd_pred_on.sum.per_cycle_elapsed",
    ),
    (
        "inst_executed_fmul",
        "smsp__sass_thread_inst_executed_op_fmul_pred_on.sum.per_cycle_elapsed",
    ),
    (
        "inst_executed_ffma",
        "smsp__sass_thread_inst_executed_op_ffma_pred_on.sum.per_cycle_elapsed",
    ),
    (
        "inst_executed_dadd",
        "smsp__sass_thread_inst_executed_op_dadd_pred_on.sum.per_cycle_elapsed",
    ),
    (
        "inst_executed_dmul",
        "smsp__sass_thread_inst_executed_op_dmul_pred_on.sum.per_cycle_elapsed",
    ),
    (
        "inst_executed_dfma",
        "smsp__sass_thread_inst_executed_op_dfma_pred_on.sum.per_cycle_elapsed",
    ),
    ("dram_bytes_write", "dram__bytes_write.sum"),
    ("dram_bytes_read", "dram__bytes_read.sum"),
    ("dram_bytes_per_second", "dram__bytes.sum.per_second"),
    ("dram_bytes", "dram__bytes.sum"),
    ("sm_freq", "smsp__cycles_elapsed.avg.per_second"),
    ("dram_bandwidth", "dram__bytes.sum.per_second"),
    ("duration", "gpu__time_duration.sum"),
];

/// Look up the Nsight Compute counter for a short name
pub fn counter_name(short: &str) -> Option<&'static str> {
    SHORT_COUNTER_NAMES
        .iter()
        .find(|(s, _)| *s == short)
        .map(|(_, full)| *full)
}

/// Benchmark metrics derived from Nsight Compute counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NcuMetric {
    /// DRAM bytes read and written, summed over kernels
    MemoryTraffic,
    /// FP32/FP64 ops per DRAM byte, weighted by DRAM bytes
    ArithmeticIntensity,
    /// Achieved FP32/FP64 TFLOPS, weighted by kernel duration
    Tflops,
}

impl NcuMetric {
    /// Short counter names this metric reads from every kernel
    pub fn short_counters(&self) -> &'static [&'static str] {
        match self {
            NcuMetric::MemoryTraffic => &["dram_bytes_write", "dram_bytes_read"],
            NcuMetric::ArithmeticIntensity => &[
                "inst_executed_ffma_peak",
                "inst_executed_dfma_peak",
                "inst_executed_fadd",
                "inst_executed_fmul",
                "inst_executed_ffma",
                "inst_executed_dadd",
                "inst_executed_dmul",
                "inst_executed_dfma",
                "dram_bytes_write",
                "dram_bytes_read",
                "dram_bytes",
                "sm_freq",
                "dram_bandwidth",
                "duration",
            ],
            NcuMetric::Tflops => &[
                "inst_executed_fadd",
                "inst_executed_fmul",
                "inst_executed_ffma",
                "inst_executed_dadd",
                "inst_executed_dmul",
                "inst_executed_dfma",
                "duration",
                "sm_freq",
            ],
        }
    }

    /// Whether aggregation needs per-kernel durations
    pub fn needs_duration(&self) -> bool {
        matches!(self, NcuMetric::ArithmeticIntensity | NcuMetric::Tflops)
    }
}

impl BenchMetric for NcuMetric {
    fn all() -> &'static [Self] {
        &[
            NcuMetric::MemoryTraffic,
            NcuMetric::ArithmeticIntensity,
            NcuMetric::Tflops,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            NcuMetric::MemoryTraffic => "memory_traffic",
            NcuMetric::ArithmeticIntensity => "arithmetic_intensity",
            NcuMetric::Tflops => "ncu_tflops",
        }
    }
}

/// Nsight Compute counters needed to compute `metrics`, deduplicated and sorted
pub fn required_counters(metrics: impl IntoIterator<Item = NcuMetric>) -> Vec<&'static str> {
    let counters: BTreeSet<&'static str> = metrics
        .into_iter()
        .flat_map(|m| m.short_counters().iter())
        .filter_map(|short| counter_name(short))
        .collect();
    counters.into_iter().collect()
}
