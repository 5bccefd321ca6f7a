//! Error types for the Agon harness.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a harness run.
///
/// Per-benchmark failures are not errors at this level; they are reported
/// as invocation outcomes and the benchmark is simply left out.
#[derive(Error, Debug)]
pub enum AgonError {
    /// Benchmark root directory does not exist
    #[error("Benchmark directory not found at {}", .0.display())]
    MissingBenchmarkRoot(PathBuf),

    /// One of the two executables does not exist
    #[error("{label} binary not found at {}", .path.display())]
    MissingBinary { label: String, path: PathBuf },

    /// The program file handed to both executables does not exist
    #[error("{} file not found at {}", display_name(.path), .path.display())]
    MissingInputFile { path: PathBuf },

    /// Benchmark root exists but cannot be listed
    #[error("Error reading benchmark directory: {0}")]
    ReadBenchmarkRoot(String),

    /// Benchmark root holds no subdirectories
    #[error("No benchmark directories found in {}", .0.display())]
    NoBenchmarks(PathBuf),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    Chart(String),

    /// Writing the results export failed
    #[error("Export error: {0}")]
    Export(String),
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl AgonError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AgonError::MissingBenchmarkRoot(_)
            | AgonError::MissingBinary { .. }
            | AgonError::MissingInputFile { .. }
            | AgonError::ReadBenchmarkRoot(_)
            | AgonError::NoBenchmarks(_)
            | AgonError::Config(_)
            | AgonError::Chart(_)
            | AgonError::Export(_) => 1,
        }
    }

    /// Returns the error code string for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AgonError::MissingBenchmarkRoot(_) => "MISSING_BENCHMARK_ROOT",
            AgonError::MissingBinary { .. } => "MISSING_BINARY",
            AgonError::MissingInputFile { .. } => "MISSING_INPUT_FILE",
            AgonError::ReadBenchmarkRoot(_) => "READ_BENCHMARK_ROOT",
            AgonError::NoBenchmarks(_) => "NO_BENCHMARKS",
            AgonError::Config(_) => "CONFIG_ERROR",
            AgonError::Chart(_) => "CHART_ERROR",
            AgonError::Export(_) => "EXPORT_ERROR",
        }
    }

    /// Whether the error was raised before any subprocess was launched
    pub fn is_preflight(&self) -> bool {
        !matches!(self, AgonError::Chart(_) | AgonError::Export(_))
    }
}

/// Result type alias using AgonError
pub type AgonResult<T> = Result<T, AgonError>;
