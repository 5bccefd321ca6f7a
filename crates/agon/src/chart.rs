//! Bar chart rendering for a completed run

use std::env;
use std::path::Path;

use agon_common::ComparisonResults;
use anyhow::{Context, Result};
use plotters::chart::SeriesLabelPosition;
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tokio::process::Command;

/// 15 x 6 inches at 300 dpi
const CHART_SIZE: (u32, u32) = (4500, 1800);

/// Half the width of a benchmark slot
const BAR_WIDTH: f64 = 0.35;

const PRIMARY_COLOR: RGBColor = RGBColor(31, 119, 180);
const BASELINE_COLOR: RGBColor = RGBColor(255, 127, 14);
const SPEEDUP_COLOR: RGBColor = RGBColor(0, 128, 0);

const FONT: &str = "sans-serif";

/// Render the time and speedup panels side by side into a PNG at `path`.
///
/// Returns `false` without touching the filesystem when there is nothing
/// to plot.
pub fn render_chart(
    results: &ComparisonResults,
    primary_label: &str,
    baseline_label: &str,
    path: &Path,
) -> Result<bool> {
    if results.is_empty() {
        return Ok(false);
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (left, right) = root.split_horizontally(CHART_SIZE.0 / 2);
    draw_times(&left, results, primary_label, baseline_label).context("drawing time panel")?;
    draw_speedups(&right, results, primary_label).context("drawing speedup panel")?;

    root.present()
        .with_context(|| format!("writing chart to {}", path.display()))?;

    Ok(true)
}

fn draw_times(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    results: &ComparisonResults,
    primary_label: &str,
    baseline_label: &str,
) -> Result<()> {
    let y_max = results
        .primary_times
        .iter()
        .chain(&results.baseline_times)
        .copied()
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption("Execution Time Comparison", (FONT, 56))
        .margin(40)
        .x_label_area_size(label_area_height(&results.benchmarks))
        .y_label_area_size(160)
        .build_cartesian_2d(slot_range(results.len()), 0f64..headroom(y_max))?;

    let names = &results.benchmarks;
    let label_for = |x: &f64| benchmark_label(names, *x);
    configure_mesh(&mut chart, results.len(), &label_for, "Execution Time (seconds)")?;

    let primary_style = PRIMARY_COLOR.mix(0.8).filled();
    chart
        .draw_series(results.primary_times.iter().enumerate().map(|(i, t)| {
            let x = i as f64;
            Rectangle::new([(x - BAR_WIDTH, 0.0), (x, *t)], primary_style)
        }))?
        .label(primary_label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 12), (x + 24, y + 12)], primary_style));

    let baseline_style = BASELINE_COLOR.mix(0.8).filled();
    chart
        .draw_series(results.baseline_times.iter().enumerate().map(|(i, t)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + BAR_WIDTH, *t)], baseline_style)
        }))?
        .label(baseline_label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 12), (x + 24, y + 12)], baseline_style));

    draw_legend(&mut chart)
}

fn draw_speedups(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    results: &ComparisonResults,
    primary_label: &str,
) -> Result<()> {
    // Infinite ratios cannot be drawn as bars
    let speedups: Vec<f64> = results
        .speedups()
        .into_iter()
        .map(|s| if s.is_finite() { s } else { 0.0 })
        .collect();
    let y_max = speedups.iter().copied().fold(1.0, f64::max);
    let n = results.len();

    let mut chart = ChartBuilder::on(area)
        .caption("Speedup Comparison (higher is better)", (FONT, 56))
        .margin(40)
        .x_label_area_size(label_area_height(&results.benchmarks))
        .y_label_area_size(160)
        .build_cartesian_2d(slot_range(n), 0f64..headroom(y_max))?;

    let names = &results.benchmarks;
    let label_for = |x: &f64| benchmark_label(names, *x);
    let y_desc = format!("Speedup (baseline/{})", primary_label);
    configure_mesh(&mut chart, n, &label_for, &y_desc)?;

    let bar_style = SPEEDUP_COLOR.mix(0.8).filled();
    chart.draw_series(speedups.iter().enumerate().map(|(i, s)| {
        let x = i as f64;
        Rectangle::new([(x - BAR_WIDTH, 0.0), (x + BAR_WIDTH, *s)], bar_style)
    }))?;

    let reference_style = RED.mix(0.7).stroke_width(4);
    chart
        .draw_series(DashedLineSeries::new(
            vec![(-0.5, 1.0), (n as f64 - 0.5, 1.0)],
            24,
            12,
            reference_style,
        ))?
        .label("No speedup")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], reference_style));

    draw_legend(&mut chart)
}

type SlotChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn configure_mesh(
    chart: &mut SlotChart<'_, '_>,
    slots: usize,
    label_for: &dyn Fn(&f64) -> String,
    y_desc: &str,
) -> Result<()> {
    chart
        .configure_mesh()
        .x_labels(slots)
        .x_label_formatter(label_for)
        .x_label_style((FONT, 32).into_font().transform(FontTransform::Rotate90))
        .y_label_style((FONT, 32))
        .x_desc("Benchmarks")
        .y_desc(y_desc)
        .axis_desc_style((FONT, 40))
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(TRANSPARENT)
        .draw()?;
    Ok(())
}

fn draw_legend<'a, 'b: 'a>(chart: &mut SlotChart<'a, 'b>) -> Result<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 32))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

/// One unit-wide slot per benchmark, centred on its index
fn slot_range(slots: usize) -> std::ops::Range<f64> {
    -0.5..(slots as f64 - 0.5)
}

fn headroom(max: f64) -> f64 {
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Pixels reserved under the x axis for rotated benchmark names
fn label_area_height(names: &[String]) -> u32 {
    let longest = names.iter().map(|n| n.chars().count()).max().unwrap_or(0) as u32;
    (longest * 20 + 120).clamp(160, 700)
}

/// Axis label for position `x`: the benchmark name at whole indices, blank elsewhere
fn benchmark_label(names: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names.get(index as usize).cloned().unwrap_or_default()
}

/// Whether a viewer can be shown at all
pub fn display_available() -> bool {
    cfg!(target_os = "macos")
        || env::var_os("DISPLAY").is_some_and(|v| !v.is_empty())
        || env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty())
}

/// Open the chart in the platform image viewer without waiting for it
pub fn show_chart(path: &Path) {
    let viewer = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };

    match Command::new(viewer).arg(path).spawn() {
        Ok(_) => tracing::debug!("Opened {:?} with {}", path, viewer),
        Err(e) => tracing::warn!("Could not open chart with {}: {}", viewer, e),
    }
}
