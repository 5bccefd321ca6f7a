//! Console report and results export

use std::fs;
use std::path::Path;

use agon_common::{speedup, AgonError, AgonResult, ComparisonResults};

use crate::constants::RULE_WIDTH;

/// Lines announcing the discovered benchmarks
pub fn discovery_lines(benchmarks: &[String]) -> Vec<String> {
    let mut lines = Vec::with_capacity(benchmarks.len() + 2);
    lines.push(format!("Found {} benchmark directories:", benchmarks.len()));
    lines.extend(benchmarks.iter().map(|name| format!("  - {}", name)));
    lines.push(String::new());
    lines
}

/// Lines printed right after a benchmark has produced both times
pub fn benchmark_lines(
    benchmark: &str,
    primary_label: &str,
    baseline_label: &str,
    primary_secs: f64,
    baseline_secs: f64,
) -> Vec<String> {
    vec![
        format!("Results for {}:", benchmark),
        format!("  {}: {:.3}s", primary_label, primary_secs),
        format!("  {}: {:.3}s", baseline_label, baseline_secs),
        format!("  speedup: {:.2}x", speedup(primary_secs, baseline_secs)),
    ]
}

/// Closing rule after each benchmark, successful or not
pub fn separator_lines() -> Vec<String> {
    vec!["-".repeat(RULE_WIDTH), String::new()]
}

/// Totals followed by one aligned row per benchmark
pub fn summary_lines(
    results: &ComparisonResults,
    primary_label: &str,
    baseline_label: &str,
) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        "BENCHMARK SUMMARY".to_string(),
        rule,
        format!("Total benchmarks completed: {}", results.len()),
        format!("Total {} time: {:.3}s", primary_label, results.total_primary()),
        format!("Total {} time: {:.3}s", baseline_label, results.total_baseline()),
        format!("Overall speedup: {:.2}x", results.overall_speedup()),
        String::new(),
        "Individual results:".to_string(),
    ];

    for (name, primary, baseline) in results.rows() {
        lines.push(format!(
            "  {:<30} | {}: {:8.3}s | baseline: {:8.3}s | speedup: {:6.2}x",
            name,
            primary_label,
            primary,
            baseline,
            speedup(primary, baseline)
        ));
    }

    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Write the results and derived figures as pretty JSON
pub fn export_json(results: &ComparisonResults, path: &Path) -> AgonResult<()> {
    let json = serde_json::to_string_pretty(&results.summary())
        .map_err(|e| AgonError::Export(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AgonError::Export(format!("{}: {}", parent.display(), e)))?;
    }

    fs::write(path, json).map_err(|e| AgonError::Export(format!("{}: {}", path.display(), e)))?;
    tracing::info!("Results written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_benchmark_lines() {
        let lines = benchmark_lines("bench-a", "egglog", "egglog-baseline", 2.0, 4.0);
        assert_eq!(
            lines,
            vec![
                "Results for bench-a:",
                "  egglog: 2.000s",
                "  egglog-baseline: 4.000s",
                "  speedup: 2.00x",
            ]
        );
    }

    #[test]
    fn test_zero_primary_time_reports_infinite_speedup() {
        let lines = benchmark_lines("instant", "egglog", "egglog-baseline", 0.0, 1.0);
        assert_eq!(lines[3], "  speedup: infx");
    }

    #[test]
    fn test_summary_lines() {
        let mut results = ComparisonResults::new();
        results.record("a", Some(1.0), Some(2.0));
        results.record("b", Some(3.0), Some(6.0));

        let lines = summary_lines(&results, "egglog", "egglog-baseline");
        assert_eq!(lines[2], "BENCHMARK SUMMARY");
        assert_eq!(lines[1], "=".repeat(80));
        assert!(lines.contains(&"Total benchmarks completed: 2".to_string()));
        assert!(lines.contains(&"Total egglog time: 4.000s".to_string()));
        assert!(lines.contains(&"Total egglog-baseline time: 8.000s".to_string()));
        assert!(lines.contains(&"Overall speedup: 2.00x".to_string()));

        let row = lines.last().unwrap();
        assert_eq!(
            row,
            &format!(
                "  {:<30} | egglog:    3.000s | baseline:    6.000s | speedup:   2.00x",
                "b"
            )
        );
    }

    #[test]
    fn test_discovery_lines() {
        let lines = discovery_lines(&["a".to_string(), "b".to_string()]);
        assert_eq!(lines, vec!["Found 2 benchmark directories:", "  - a", "  - b", ""]);
    }

    #[test]
    fn test_export_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/results.json");
        let mut results = ComparisonResults::new();
        results.record("a", Some(2.0), Some(4.0));

        export_json(&results, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["completed"], 1);
        assert_eq!(value["overall_speedup"], 2.0);
        assert_eq!(value["benchmarks"][0]["name"], "a");
    }
}
