//! Per-kernel throughput formulas and report-level aggregation
//!
//! Arithmetic intensity is weighted by each kernel's DRAM bytes; achieved
//! TFLOPS is weighted by each kernel's duration. Both are accumulated over
//! the whole default range before dividing.

use super::counters::NcuMetric;
use super::report::{KernelAction, NcuRange, NcuReport};
use crate::analyzer::MetricSummary;
use crate::error::{AnalyzerError, Result};
use crate::metrics::{DramTraffic, FpPair, WeightedAverage};
use kernelscope_shared::MetricValue;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// FLOPS per TFLOPS
const TERA: f64 = 1e12;

/// DRAM bytes read and written by a kernel
pub fn kernel_traffic(kernel: &KernelAction) -> Result<DramTraffic> {
    Ok(DramTraffic {
        read: kernel.counter("dram_bytes_read")?,
        write: kernel.counter("dram_bytes_write")?,
    })
}

/// Kernel duration in nanoseconds
pub fn kernel_duration(kernel: &KernelAction) -> Result<f64> {
    kernel.counter("duration")
}

/// Achieved FP32/FP64 operations per second.
///
/// Achieved add, multiply and fused multiply-add instructions per cycle are
/// summed with FMA counted as two operations, then scaled by the SM clock.
pub fn kernel_flops(kernel: &KernelAction) -> Result<FpPair> {
    let fp32_achieved = kernel.counter("inst_executed_fadd")?
        + kernel.counter("inst_executed_fmul")?
        + 2.0 * kernel.counter("inst_executed_ffma")?;
    let fp64_achieved = kernel.counter("inst_executed_dadd")?
        + kernel.counter("inst_executed_dmul")?
        + 2.0 * kernel.counter("inst_executed_dfma")?;
    let sm_freq = kernel.counter("sm_freq")?;

    Ok(FpPair::new(fp32_achieved * sm_freq, fp64_achieved * sm_freq))
}

/// Operations per DRAM byte; zero for a kernel that moved no DRAM data
pub fn kernel_arithmetic_intensity(kernel: &KernelAction) -> Result<FpPair> {
    let dram_bandwidth = kernel.counter("dram_bandwidth")?;
    let flops = kernel_flops(kernel)?;
    if dram_bandwidth == 0.0 {
        debug!("Kernel '{}' reports no DRAM bandwidth", kernel.name);
        return Ok(FpPair::default());
    }
    Ok(flops.map(|f| f / dram_bandwidth))
}

/// Raw values recorded for one kernel
#[derive(Debug, Clone, Serialize)]
pub struct KernelSample {
    pub name: String,
    pub duration_ns: Option<f64>,
    pub traffic: Option<DramTraffic>,
    pub dram_bytes: Option<f64>,
    pub arithmetic_intensity: Option<FpPair>,
    pub flops: Option<FpPair>,
}

/// Aggregated Nsight Compute analysis of a report's default range
#[derive(Debug, Clone, Default, Serialize)]
pub struct NcuSummary {
    /// Per-kernel values, in report order
    pub kernels: Vec<KernelSample>,

    /// Sum of kernel durations (ns), when durations were read
    pub total_duration_ns: f64,

    /// Sum of per-kernel DRAM bytes read and written
    pub memory_traffic: Option<DramTraffic>,

    /// DRAM-byte-weighted arithmetic intensity (ops/byte)
    pub arithmetic_intensity: Option<FpPair>,

    /// Duration-weighted achieved TFLOPS
    pub tflops: Option<FpPair>,
}

impl MetricSummary<NcuMetric> for NcuSummary {
    fn value(&self, metric: NcuMetric) -> Option<MetricValue> {
        match metric {
            NcuMetric::MemoryTraffic => self.memory_traffic.map(Into::into),
            NcuMetric::ArithmeticIntensity => self.arithmetic_intensity.map(Into::into),
            NcuMetric::Tflops => self.tflops.map(Into::into),
        }
    }
}

/// Check the report has data, then aggregate its default range
pub fn aggregate_report(
    report: &NcuReport,
    path: &Path,
    metrics: &BTreeSet<NcuMetric>,
) -> Result<NcuSummary> {
    let range = report
        .default_range()
        .ok_or_else(|| AnalyzerError::NoRanges(path.to_path_buf()))?;
    if range.num_actions() == 0 {
        return Err(AnalyzerError::EmptyRange(path.to_path_buf()));
    }
    aggregate_range(range, metrics)
}

/// Aggregate every kernel action of `range` into the requested metrics
pub fn aggregate_range(range: &NcuRange, metrics: &BTreeSet<NcuMetric>) -> Result<NcuSummary> {
    let wants = |m: NcuMetric| metrics.contains(&m);
    let needs_duration = metrics.iter().any(NcuMetric::needs_duration);

    let mut traffic_sum = DramTraffic::default();
    let mut intensity = WeightedAverage::new();
    let mut throughput = WeightedAverage::new();
    let mut total_duration_ns = 0.0;
    let mut idle_kernels = 0usize;
    let mut kernels = Vec::with_capacity(range.num_actions());

    for kernel in &range.actions {
        let mut sample = KernelSample {
            name: kernel.name.clone(),
            duration_ns: None,
            traffic: None,
            dram_bytes: None,
            arithmetic_intensity: None,
            flops: None,
        };

        if needs_duration {
            let duration = kernel_duration(kernel)?;
            total_duration_ns += duration;
            sample.duration_ns = Some(duration);
        }

        if wants(NcuMetric::MemoryTraffic) {
            let traffic = kernel_traffic(kernel)?;
            traffic_sum = traffic_sum + traffic;
            sample.traffic = Some(traffic);
        }

        if wants(NcuMetric::ArithmeticIntensity) {
            let dram_bytes = kernel.counter("dram_bytes")?;
            let ai = kernel_arithmetic_intensity(kernel)?;
            if kernel.counter("dram_bandwidth")? == 0.0 {
                idle_kernels += 1;
            }
            intensity.add(ai, dram_bytes);
            sample.dram_bytes = Some(dram_bytes);
            sample.arithmetic_intensity = Some(ai);
        }

        if wants(NcuMetric::Tflops) {
            let flops = kernel_flops(kernel)?;
            let duration = sample.duration_ns.unwrap_or_default();
            throughput.add(flops, duration);
            sample.flops = Some(flops);
        }

        kernels.push(sample);
    }

    let mut summary = NcuSummary {
        kernels,
        total_duration_ns,
        ..Default::default()
    };

    if wants(NcuMetric::MemoryTraffic) {
        summary.memory_traffic = Some(traffic_sum);
    }

    if wants(NcuMetric::ArithmeticIntensity) {
        let weighted = intensity.finish().ok_or(AnalyzerError::ZeroWeight {
            metric: "arithmetic_intensity",
            weight: "DRAM bytes",
        })?;
        debug!(
            "Arithmetic intensity weighted over {} kernel(s) moving {:.0} DRAM bytes",
            intensity.samples(),
            intensity.total_weight()
        );
        summary.arithmetic_intensity = Some(weighted);
    }

    if wants(NcuMetric::Tflops) {
        if total_duration_ns == 0.0 {
            return Err(AnalyzerError::ZeroWeight {
                metric: "ncu_tflops",
                weight: "kernel duration",
            });
        }
        let tera_sum = throughput.weighted_sum().map(|f| f / TERA);
        summary.tflops = Some(tera_sum.map(|t| t / total_duration_ns));
    }

    if idle_kernels > 0 {
        warn!(
            "{} kernel(s) report no DRAM bandwidth; their arithmetic intensity is counted as zero",
            idle_kernels
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Kernel whose FP32 throughput is `2 * ffma * sm_freq` and FP64 is zero
    fn kernel(name: &str, ffma: f64, sm_freq: f64, bandwidth: f64) -> KernelAction {
        KernelAction::new(name)
            .with_counter("inst_executed_fadd", 0.0)
            .with_counter("inst_executed_fmul", 0.0)
            .with_counter("inst_executed_ffma", ffma)
            .with_counter("inst_executed_dadd", 0.0)
            .with_counter("inst_executed_dmul", 0.0)
            .with_counter("inst_executed_dfma", 0.0)
            .with_counter("sm_freq", sm_freq)
            .with_counter("dram_bandwidth", bandwidth)
    }

    fn metrics(list: &[NcuMetric]) -> BTreeSet<NcuMetric> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_fma_counts_twice() {
        let k = KernelAction::new("k")
            .with_counter("inst_executed_fadd", 1.0)
            .with_counter("inst_executed_fmul", 2.0)
            .with_counter("inst_executed_ffma", 3.0)
            .with_counter("inst_executed_dadd", 0.5)
            .with_counter("inst_executed_dmul", 0.0)
            .with_counter("inst_executed_dfma", 1.0)
            .with_counter("sm_freq", 10.0);
        assert_eq!(kernel_flops(&k).unwrap(), FpPair::new(90.0, 25.0));
    }

    #[test]
    fn test_memory_traffic_is_plain_sum() {
        let range = NcuRange {
            actions: vec![
                KernelAction::new("a")
                    .with_counter("dram_bytes_read", 100.0)
                    .with_counter("dram_bytes_write", 10.0),
                KernelAction::new("b")
                    .with_counter("dram_bytes_read", 300.0)
                    .with_counter("dram_bytes_write", 30.0),
            ],
        };
        let summary = aggregate_range(&range, &metrics(&[NcuMetric::MemoryTraffic])).unwrap();
        let traffic = summary.memory_traffic.unwrap();
        assert_eq!(traffic.read, 400.0);
        assert_eq!(traffic.write, 40.0);
        assert!(summary.arithmetic_intensity.is_none());
        assert!(summary.tflops.is_none());
        // traffic alone does not read durations
        assert!(summary.kernels.iter().all(|k| k.duration_ns.is_none()));
    }

    #[test]
    fn test_memory_traffic_independent_of_order() {
        let a = KernelAction::new("a")
            .with_counter("dram_bytes_read", 7.0)
            .with_counter("dram_bytes_write", 3.0);
        let b = KernelAction::new("b")
            .with_counter("dram_bytes_read", 11.0)
            .with_counter("dram_bytes_write", 5.0);
        let wanted = metrics(&[NcuMetric::MemoryTraffic]);

        let forward = aggregate_range(
            &NcuRange {
                actions: vec![a.clone(), b.clone()],
            },
            &wanted,
        )
        .unwrap();
        let backward = aggregate_range(&NcuRange { actions: vec![b, a] }, &wanted).unwrap();
        assert_eq!(forward.memory_traffic, backward.memory_traffic);
    }

    #[test]
    fn test_arithmetic_intensity_weighted_by_bytes() {
        // A: intensity 2 over 100 bytes; B: intensity 6 over 300 bytes
        let range = NcuRange {
            actions: vec![
                kernel("a", 1.0, 1.0, 1.0)
                    .with_counter("dram_bytes", 100.0)
                    .with_counter("duration", 5.0),
                kernel("b", 3.0, 1.0, 1.0)
                    .with_counter("dram_bytes", 300.0)
                    .with_counter("duration", 5.0),
            ],
        };
        let summary =
            aggregate_range(&range, &metrics(&[NcuMetric::ArithmeticIntensity])).unwrap();
        assert_eq!(summary.arithmetic_intensity, Some(FpPair::new(5.0, 0.0)));
        assert_eq!(summary.kernels[0].arithmetic_intensity, Some(FpPair::new(2.0, 0.0)));
        assert_eq!(summary.total_duration_ns, 10.0);
    }

    #[test]
    fn test_tflops_weighted_by_duration() {
        // A: 2 TFLOPS for 100 ns; B: 4 TFLOPS for 300 ns
        let range = NcuRange {
            actions: vec![
                kernel("a", 1.0, 1e12, 1.0).with_counter("duration", 100.0),
                kernel("b", 2.0, 1e12, 1.0).with_counter("duration", 300.0),
            ],
        };
        let summary = aggregate_range(&range, &metrics(&[NcuMetric::Tflops])).unwrap();
        assert_eq!(summary.tflops, Some(FpPair::new(3.5, 0.0)));
        assert_eq!(summary.kernels[1].flops, Some(FpPair::new(4e12, 0.0)));
    }

    #[test]
    fn test_zero_bandwidth_kernel_contributes_zero() {
        let range = NcuRange {
            actions: vec![
                kernel("idle", 1.0, 1.0, 0.0)
                    .with_counter("dram_bytes", 0.0)
                    .with_counter("duration", 1.0),
                kernel("busy", 2.0, 1.0, 1.0)
                    .with_counter("dram_bytes", 50.0)
                    .with_counter("duration", 1.0),
            ],
        };
        let summary =
            aggregate_range(&range, &metrics(&[NcuMetric::ArithmeticIntensity])).unwrap();
        assert_eq!(summary.arithmetic_intensity, Some(FpPair::new(4.0, 0.0)));
    }

    #[test]
    fn test_no_dram_bytes_is_fatal() {
        let range = NcuRange {
            actions: vec![kernel("idle", 1.0, 1.0, 0.0)
                .with_counter("dram_bytes", 0.0)
                .with_counter("duration", 1.0)],
        };
        let err =
            aggregate_range(&range, &metrics(&[NcuMetric::ArithmeticIntensity])).unwrap_err();
        assert!(matches!(err, AnalyzerError::ZeroWeight { .. }));
    }

    #[test]
    fn test_zero_duration_is_fatal_for_tflops() {
        let range = NcuRange {
            actions: vec![kernel("k", 1.0, 1.0, 1.0).with_counter("duration", 0.0)],
        };
        let err = aggregate_range(&range, &metrics(&[NcuMetric::Tflops])).unwrap_err();
        assert!(matches!(err, AnalyzerError::ZeroWeight { .. }));
    }

    #[test]
    fn test_missing_counter_is_fatal() {
        let range = NcuRange {
            actions: vec![KernelAction::new("k").with_counter("dram_bytes_read", 1.0)],
        };
        let err = aggregate_range(&range, &metrics(&[NcuMetric::MemoryTraffic])).unwrap_err();
        match err {
            AnalyzerError::MissingCounter { kernel, counter } => {
                assert_eq!(kernel, "k");
                assert_eq!(counter, "dram_bytes_write");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_report_is_fatal() {
        let path = Path::new("empty.ncu-rep");
        let wanted = metrics(&[NcuMetric::MemoryTraffic]);

        let err = aggregate_report(&NcuReport::default(), path, &wanted).unwrap_err();
        assert!(matches!(err, AnalyzerError::NoRanges(_)));

        let report = NcuReport {
            ranges: vec![NcuRange::default()],
        };
        let err = aggregate_report(&report, path, &wanted).unwrap_err();
        assert!(matches!(err, AnalyzerError::EmptyRange(_)));
    }

    #[test]
    fn test_summary_values() {
        let summary = NcuSummary {
            tflops: Some(FpPair::new(1.0, 0.5)),
            ..Default::default()
        };
        assert_eq!(
            summary.value(NcuMetric::Tflops),
            Some(MetricValue::Precision {
                fp32: 1.0,
                fp64: 0.5
            })
        );
        assert_eq!(summary.value(NcuMetric::MemoryTraffic), None);
    }
}
