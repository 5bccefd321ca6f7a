//! Configuration for the Agon harness
//!
//! Every setting has a default in `constants.rs` and can be overridden
//! through the environment (or a `.env` file).

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_BASELINE_BINARY, DEFAULT_BASELINE_LABEL, DEFAULT_BENCHMARK_ROOT, DEFAULT_CHART_PATH,
    DEFAULT_INPUT_FLAG, DEFAULT_PRIMARY_BINARY, DEFAULT_PRIMARY_LABEL, DEFAULT_PROGRAM_FILE,
    DEFAULT_TIMEOUT_SECS,
};

/// Harness configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one subdirectory per benchmark
    pub benchmark_root: PathBuf,

    /// Program file given to both binaries
    pub program_file: PathBuf,

    /// Build under test
    pub primary: BinaryConfig,

    /// Reference build
    pub baseline: BinaryConfig,

    /// Invocation settings
    pub execution: ExecutionConfig,

    /// Report outputs
    pub output: OutputConfig,
}

/// One of the two compared executables
#[derive(Debug, Clone)]
pub struct BinaryConfig {
    /// Name used in console output and the chart legend
    pub label: String,
    pub path: PathBuf,
}

/// Invocation settings
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Flag placed before the benchmark directory argument
    pub input_flag: String,

    /// Wall-clock limit per invocation
    pub timeout: Duration,

    /// Capture stderr of both binaries instead of discarding it
    pub capture_stderr: bool,
}

/// Report output settings
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// PNG written after the summary
    pub chart_path: PathBuf,

    /// Open the chart in a viewer when a display is available
    pub show_chart: bool,

    /// Optional JSON export of the results
    pub results_json: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup("HOME");
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_secs: u64 = parse_or(&lookup, "AGON_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("AGON_TIMEOUT_SECS".to_string()));
        }

        Ok(Self {
            benchmark_root: expand_home(
                &var("AGON_BENCHMARK_ROOT", DEFAULT_BENCHMARK_ROOT),
                home.as_deref(),
            ),
            program_file: PathBuf::from(var("AGON_PROGRAM_FILE", DEFAULT_PROGRAM_FILE)),
            primary: BinaryConfig {
                label: var("AGON_PRIMARY_LABEL", DEFAULT_PRIMARY_LABEL),
                path: PathBuf::from(var("AGON_PRIMARY_BINARY", DEFAULT_PRIMARY_BINARY)),
            },
            baseline: BinaryConfig {
                label: var("AGON_BASELINE_LABEL", DEFAULT_BASELINE_LABEL),
                path: PathBuf::from(var("AGON_BASELINE_BINARY", DEFAULT_BASELINE_BINARY)),
            },
            execution: ExecutionConfig {
                input_flag: var("AGON_INPUT_FLAG", DEFAULT_INPUT_FLAG),
                timeout: Duration::from_secs(timeout_secs),
                capture_stderr: parse_bool_or(&lookup, "AGON_CAPTURE_STDERR", false)?,
            },
            output: OutputConfig {
                chart_path: PathBuf::from(var("AGON_CHART_PATH", DEFAULT_CHART_PATH)),
                show_chart: parse_bool_or(&lookup, "AGON_SHOW_CHART", true)?,
                results_json: lookup("AGON_RESULTS_JSON")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(key.to_string())),
        },
    }
}

/// Expand a leading `~` to the home directory. Paths without one, or
/// without a known home, are returned unchanged.
pub fn expand_home(raw: &str, home: Option<&str>) -> PathBuf {
    match (raw.strip_prefix('~'), home) {
        (Some(""), Some(home)) => PathBuf::from(home),
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            Path::new(home).join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(raw),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
