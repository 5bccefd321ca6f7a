//! Agon - Benchmark comparison harness
//!
//! Runs a primary and a baseline build of the same tool over every
//! benchmark directory under a root, times each invocation, prints a
//! comparison and renders it as a bar chart.

mod chart;
mod config;
mod constants;
mod discovery;
mod executor;
mod harness;
mod preflight;
mod report;
mod time;

use agon_common::{AgonError, AgonResult};
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::constants::DEFAULT_LOG_FILTER;
use crate::harness::Harness;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Agon benchmark harness");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => abort(AgonError::Config(e.to_string())),
    };

    match run(config).await {
        Ok(RunOutcome::NoComparisons) => {
            tracing::warn!("Every benchmark failed on at least one side");
        }
        Ok(RunOutcome::Compared { benchmarks }) => {
            tracing::debug!("Compared {} benchmarks", benchmarks);
        }
        Err(e) => abort(e),
    }

    tracing::info!("Agon run complete");
    Ok(())
}

/// How a run that got past pre-flight ended
#[derive(Debug, Clone, PartialEq)]
enum RunOutcome {
    /// Every benchmark failed on at least one side
    NoComparisons,
    /// At least one benchmark was compared and the chart was written
    Compared { benchmarks: usize },
}

async fn run(config: Config) -> AgonResult<RunOutcome> {
    preflight::check_environment(&config)?;

    let benchmarks = discovery::discover_benchmarks(&config.benchmark_root)?;
    report::print_lines(&report::discovery_lines(&benchmarks));

    let harness = Harness::new(config.clone());
    let results = harness.run(&benchmarks).await;

    if results.is_empty() {
        println!("No successful benchmark runs to compare.");
        return Ok(RunOutcome::NoComparisons);
    }

    report::print_lines(&report::summary_lines(
        &results,
        &config.primary.label,
        &config.baseline.label,
    ));

    // The chart is written even when the export below fails
    let chart_path = &config.output.chart_path;
    let written = chart::render_chart(
        &results,
        &config.primary.label,
        &config.baseline.label,
        chart_path,
    )
    .map_err(|e| AgonError::Chart(format!("{:#}", e)))?;

    if written {
        if config.output.show_chart && chart::display_available() {
            chart::show_chart(chart_path);
        }
        println!();
        println!("Chart saved as '{}'", chart_path.display());
    }

    if let Some(path) = &config.output.results_json {
        report::export_json(&results, path)?;
    }

    Ok(RunOutcome::Compared {
        benchmarks: results.len(),
    })
}

/// Print a fatal error the way the console report expects and exit
fn abort(err: AgonError) -> ! {
    match &err {
        AgonError::ReadBenchmarkRoot(_) | AgonError::NoBenchmarks(_) => println!("{}", err),
        _ => println!("Error: {}", err),
    }
    if err.is_preflight() {
        tracing::debug!("Aborting before any benchmark ran: {}", err.error_code());
    } else {
        tracing::error!("Aborting after benchmarks completed: {}", err.error_code());
    }
    std::process::exit(err.exit_code())
}
