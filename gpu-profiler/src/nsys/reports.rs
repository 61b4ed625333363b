//! Nsight Systems metric and report tables

use crate::analyzer::BenchMetric;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Report types produced by `nsys stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NsysReport {
    /// Per-kernel summary within NVTX ranges
    NvtxKernSum,
    /// NVTX range summary
    NvtxSum,
}

impl NsysReport {
    /// Report name as `nsys stats --report` spells it
    pub fn name(&self) -> &'static str {
        match self {
            NsysReport::NvtxKernSum => "nvtx_kern_sum",
            NsysReport::NvtxSum => "nvtx_sum",
        }
    }
}

impl fmt::Display for NsysReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Benchmark metrics derived from Nsight Systems reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NsysMetric {
    /// Sum of kernel execution time (ms)
    GpuKernelSum,
    /// NVTX range time not spent executing kernels (ms)
    LaunchOverhead,
    /// Kernel names
    KernelNames,
    /// Kernel durations (ms)
    KernelDurations,
    /// Duration of the NVTX range (ms)
    NvtxRangeDuration,
    /// Number of kernels
    NumOfKernels,
}

impl NsysMetric {
    /// Reports this metric is computed from
    pub fn reports(&self) -> &'static [NsysReport] {
        match self {
            NsysMetric::GpuKernelSum | NsysMetric::LaunchOverhead => {
                &[NsysReport::NvtxKernSum, NsysReport::NvtxSum]
            }
            NsysMetric::KernelNames | NsysMetric::KernelDurations | NsysMetric::NumOfKernels => {
                &[NsysReport::NvtxKernSum]
            }
            NsysMetric::NvtxRangeDuration => &[NsysReport::NvtxSum],
        }
    }
}

impl BenchMetric for NsysMetric {
    fn all() -> &'static [Self] {
        &[
            NsysMetric::GpuKernelSum,
            NsysMetric::LaunchOverhead,
            NsysMetric::KernelNames,
            NsysMetric::KernelDurations,
            NsysMetric::NvtxRangeDuration,
            NsysMetric::NumOfKernels,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            NsysMetric::GpuKernelSum => "nsys_gpu_kernel_sum",
            NsysMetric::LaunchOverhead => "nsys_launch_overhead",
            NsysMetric::KernelNames => "nsys_kernel_names",
            NsysMetric::KernelDurations => "nsys_kernel_durations",
            NsysMetric::NvtxRangeDuration => "nsys_nvtx_range_duration",
            NsysMetric::NumOfKernels => "nsys_num_of_kernels",
        }
    }
}

/// Reports needed to compute `metrics`, deduplicated
pub fn required_reports(metrics: impl IntoIterator<Item = NsysMetric>) -> BTreeSet<NsysReport> {
    metrics
        .into_iter()
        .flat_map(|m| m.reports().iter().copied())
        .collect()
}
