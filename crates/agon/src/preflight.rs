//! Pre-flight checks run before any benchmark is launched

use agon_common::{AgonError, AgonResult};

use crate::config::Config;

/// Verify that the benchmark root, both binaries and the program file exist.
///
/// Checks run in that order and stop at the first missing path.
pub fn check_environment(config: &Config) -> AgonResult<()> {
    if !config.benchmark_root.exists() {
        return Err(AgonError::MissingBenchmarkRoot(config.benchmark_root.clone()));
    }

    for binary in [&config.primary, &config.baseline] {
        if !binary.path.exists() {
            return Err(AgonError::MissingBinary {
                label: binary.label.clone(),
                path: binary.path.clone(),
            });
        }
    }

    if !config.program_file.exists() {
        return Err(AgonError::MissingInputFile {
            path: config.program_file.clone(),
        });
    }

    tracing::debug!(
        "Pre-flight passed: root={:?} primary={:?} baseline={:?} program={:?}",
        config.benchmark_root,
        config.primary.path,
        config.baseline.path,
        config.program_file
    );

    Ok(())
}
