//! Result model shared by the harness, the reporter and the chart.

use serde::{Deserialize, Serialize};

/// Speedup of the primary binary over the baseline: `baseline / primary`.
///
/// A primary time of exactly zero yields `f64::INFINITY`.
pub fn speedup(primary_secs: f64, baseline_secs: f64) -> f64 {
    if primary_secs == 0.0 {
        f64::INFINITY
    } else {
        baseline_secs / primary_secs
    }
}

/// Timings collected over one harness run.
///
/// The three sequences are index-aligned: `primary_times[i]` and
/// `baseline_times[i]` belong to `benchmarks[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResults {
    pub benchmarks: Vec<String>,
    pub primary_times: Vec<f64>,
    pub baseline_times: Vec<f64>,
}

impl ComparisonResults {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a benchmark for which both binaries produced a time.
    ///
    /// A benchmark with a missing time on either side is not recorded.
    /// Returns whether the entry was added.
    pub fn record(
        &mut self,
        benchmark: impl Into<String>,
        primary_secs: Option<f64>,
        baseline_secs: Option<f64>,
    ) -> bool {
        match (primary_secs, baseline_secs) {
            (Some(primary), Some(baseline)) => {
                self.benchmarks.push(benchmark.into());
                self.primary_times.push(primary);
                self.baseline_times.push(baseline);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Iterate over `(name, primary, baseline)` rows in recording order
    pub fn rows(&self) -> impl Iterator<Item = (&str, f64, f64)> + '_ {
        self.benchmarks
            .iter()
            .zip(&self.primary_times)
            .zip(&self.baseline_times)
            .map(|((name, primary), baseline)| (name.as_str(), *primary, *baseline))
    }

    /// Per-benchmark speedups in recording order
    pub fn speedups(&self) -> Vec<f64> {
        self.rows()
            .map(|(_, primary, baseline)| speedup(primary, baseline))
            .collect()
    }

    pub fn total_primary(&self) -> f64 {
        self.primary_times.iter().sum()
    }

    pub fn total_baseline(&self) -> f64 {
        self.baseline_times.iter().sum()
    }

    /// Ratio of the summed times, not the mean of per-benchmark ratios
    pub fn overall_speedup(&self) -> f64 {
        speedup(self.total_primary(), self.total_baseline())
    }

    /// Snapshot with the derived figures, for export
    pub fn summary(&self) -> BenchmarkSummary {
        BenchmarkSummary {
            completed: self.len(),
            total_primary_secs: self.total_primary(),
            total_baseline_secs: self.total_baseline(),
            overall_speedup: finite(self.overall_speedup()),
            benchmarks: self
                .rows()
                .map(|(name, primary, baseline)| BenchmarkEntry {
                    name: name.to_string(),
                    primary_secs: primary,
                    baseline_secs: baseline,
                    speedup: finite(speedup(primary, baseline)),
                })
                .collect(),
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Exported form of a harness run. Infinite speedups serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub completed: usize,
    pub total_primary_secs: f64,
    pub total_baseline_secs: f64,
    pub overall_speedup: Option<f64>,
    pub benchmarks: Vec<BenchmarkEntry>,
}

/// One row of the exported summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub name: String,
    pub primary_secs: f64,
    pub baseline_secs: f64,
    pub speedup: Option<f64>,
}
