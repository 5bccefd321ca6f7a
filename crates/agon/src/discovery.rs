//! Benchmark enumeration

use std::path::Path;

use agon_common::{AgonError, AgonResult};
use walkdir::WalkDir;

/// List the benchmark directories directly under `root`, sorted by name.
///
/// Plain files are ignored. Entries that cannot be inspected are skipped
/// with a warning; failing to read `root` itself is fatal.
pub fn discover_benchmarks(root: &Path) -> AgonResult<Vec<String>> {
    // WalkDir yields nothing for a plain file, so check the root up front
    let metadata = std::fs::metadata(root)
        .map_err(|e| AgonError::ReadBenchmarkRoot(format!("{}: {}", e, root.display())))?;
    if !metadata.is_dir() {
        return Err(AgonError::ReadBenchmarkRoot(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let mut benchmarks = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(AgonError::ReadBenchmarkRoot(e.to_string()));
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", root, e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            benchmarks.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    if benchmarks.is_empty() {
        return Err(AgonError::NoBenchmarks(root.to_path_buf()));
    }

    benchmarks.sort();
    Ok(benchmarks)
}
