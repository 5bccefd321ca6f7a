//! Default values for the harness configuration

/// Benchmark root; a leading `~` is expanded from `HOME`
pub const DEFAULT_BENCHMARK_ROOT: &str =
    "~/egglog-pointer-analysis-benchmark/benchmark-input/postgresql-9.5.2";

pub const DEFAULT_PRIMARY_BINARY: &str = "egglog/target/release/egglog";
pub const DEFAULT_PRIMARY_LABEL: &str = "egglog";

pub const DEFAULT_BASELINE_BINARY: &str = "egglog-baseline/target/release/egglog";
pub const DEFAULT_BASELINE_LABEL: &str = "egglog-baseline";

/// Program file passed as the first argument to both binaries
pub const DEFAULT_PROGRAM_FILE: &str = "pointer-analysis.egg";

/// Flag preceding the benchmark directory on the command line
pub const DEFAULT_INPUT_FLAG: &str = "-F";

/// Per-invocation wall-clock limit (one hour)
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

pub const DEFAULT_CHART_PATH: &str = "benchmark_comparison.png";

/// Characters of captured stderr shown for a failed invocation
pub const STDERR_EXCERPT_CHARS: usize = 200;

pub const DEFAULT_LOG_FILTER: &str = "agon=info";

/// Width of the separator rules in console output
pub const RULE_WIDTH: usize = 80;
