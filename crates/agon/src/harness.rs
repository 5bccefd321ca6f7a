//! Sequential benchmark loop

use agon_common::ComparisonResults;

use crate::config::{BinaryConfig, Config};
use crate::executor::{Executor, InvocationOutcome};
use crate::report::{benchmark_lines, print_lines, separator_lines};

/// Drives both binaries over every benchmark, one invocation at a time
pub struct Harness {
    config: Config,
    executor: Executor,
}

impl Harness {
    /// Create a new harness
    pub fn new(config: Config) -> Self {
        let executor = Executor::new(config.program_file.clone(), config.execution.clone());
        Self { config, executor }
    }

    /// Run every benchmark in order and collect those where both binaries succeeded.
    ///
    /// The baseline still runs when the primary fails, so both outcomes are
    /// always reported.
    pub async fn run(&self, benchmarks: &[String]) -> ComparisonResults {
        let mut results = ComparisonResults::new();

        for benchmark in benchmarks {
            println!("Running benchmark: {}", benchmark);
            let benchmark_dir = self.config.benchmark_root.join(benchmark);

            let primary = self.invoke(&self.config.primary, &benchmark_dir).await;
            let baseline = self.invoke(&self.config.baseline, &benchmark_dir).await;

            let primary_secs = primary.elapsed_secs();
            let baseline_secs = baseline.elapsed_secs();

            if results.record(benchmark.clone(), primary_secs, baseline_secs) {
                print_lines(&benchmark_lines(
                    benchmark,
                    &self.config.primary.label,
                    &self.config.baseline.label,
                    primary_secs.unwrap_or_default(),
                    baseline_secs.unwrap_or_default(),
                ));
            } else {
                tracing::info!("Benchmark {} excluded from results", benchmark);
            }

            print_lines(&separator_lines());
        }

        results
    }

    async fn invoke(&self, binary: &BinaryConfig, benchmark_dir: &std::path::Path) -> InvocationOutcome {
        println!("  Running {}...", binary.label);
        let outcome = self.executor.run(binary, benchmark_dir).await;
        print_lines(&outcome.report_lines(&binary.label));
        outcome
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::executor::tests::{execution, fake_binary};

    fn config(dir: &Path, primary: BinaryConfig, baseline: BinaryConfig, timeout: Duration) -> Config {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.benchmark_root = dir.join("inputs");
        config.program_file = dir.join("program.egg");
        config.primary = primary;
        config.baseline = baseline;
        config.execution = execution(timeout, false);
        config
    }

    fn benchmarks(dir: &Path, names: &[&str]) -> Vec<String> {
        for name in names {
            fs::create_dir_all(dir.join("inputs").join(name)).unwrap();
        }
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_both_succeed() {
        let dir = TempDir::new().unwrap();
        let primary = fake_binary(dir.path(), "primary", "exit 0");
        let baseline = fake_binary(dir.path(), "baseline", "exit 0");
        let names = benchmarks(dir.path(), &["a", "b"]);

        let harness = Harness::new(config(dir.path(), primary, baseline, Duration::from_secs(10)));
        let results = harness.run(&names).await;

        assert_eq!(results.benchmarks, vec!["a", "b"]);
        assert_eq!(results.primary_times.len(), 2);
        assert_eq!(results.baseline_times.len(), 2);
    }

    #[tokio::test]
    async fn test_primary_failure_drops_benchmark() {
        let dir = TempDir::new().unwrap();
        let primary = fake_binary(dir.path(), "primary", r#"case "$3" in */bad) exit 1;; esac"#);
        let baseline = fake_binary(dir.path(), "baseline", "exit 0");
        let names = benchmarks(dir.path(), &["bad", "good"]);

        let harness = Harness::new(config(dir.path(), primary, baseline, Duration::from_secs(10)));
        let results = harness.run(&names).await;

        assert_eq!(results.benchmarks, vec!["good"]);
        assert_eq!(results.primary_times.len(), 1);
        assert_eq!(results.baseline_times.len(), 1);
    }

    #[tokio::test]
    async fn test_baseline_timeout_drops_benchmark() {
        let dir = TempDir::new().unwrap();
        let primary = fake_binary(dir.path(), "primary", "exit 0");
        let baseline = fake_binary(dir.path(), "baseline", "exec sleep 30");
        let names = benchmarks(dir.path(), &["slow"]);

        let harness = Harness::new(config(dir.path(), primary, baseline, Duration::from_millis(300)));
        let results = harness.run(&names).await;

        assert!(results.is_empty());
    }
}
