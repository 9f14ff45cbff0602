//! Pure numeric helpers behind every chart overlay and axis.

use super::entities::BarSeries;
use serde::Serialize;

/// Per-index overlay aligned 1:1 with a series.
pub type DerivedOverlay = Vec<Option<f64>>;

pub const DEFAULT_TICK_COUNT: usize = 5;

/// Round-number ticks bracketing a value range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTickSet {
    pub ticks: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl AxisTickSet {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Simple moving average. Index `i` holds `None` while fewer than `window`
/// closes are available, then the mean of `closes[i + 1 - window..=i]`.
pub fn moving_average(closes: &[f64], window: usize) -> DerivedOverlay {
    let mut out = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return out;
    }

    for (offset, slice) in closes.windows(window).enumerate() {
        let sum: f64 = slice.iter().sum();
        out[offset + window - 1] = Some(sum / window as f64);
    }
    out
}

/// Tick ladder for `[min, max]`.
///
/// The step is picked from `{1, 2, 5, 10} × 10^k` so that roughly
/// `desired_count` ticks cover the range; both ends are widened to the next
/// multiple of the step.
pub fn nice_axis_ticks(min: f64, max: f64, desired_count: usize) -> AxisTickSet {
    if !min.is_finite() || !max.is_finite() {
        return AxisTickSet { ticks: Vec::new(), min: 0.0, max: 1.0, step: 1.0 };
    }
    let (min, max) = if min > max { (max, min) } else { (min, max) };

    if min == max {
        return AxisTickSet {
            ticks: vec![min],
            min,
            max: if max == 0.0 { 1.0 } else { max },
            step: 0.0,
        };
    }

    let count = desired_count.max(2);
    let rough_step = (max - min) / (count - 1) as f64;
    let magnitude = 10f64.powf(rough_step.log10().floor());
    let residual = rough_step / magnitude;
    let nice_step = if residual <= 1.5 {
        magnitude
    } else if residual <= 3.0 {
        2.0 * magnitude
    } else if residual <= 7.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    let first = (min / nice_step).floor() as i64;
    let last = (max / nice_step).ceil() as i64;
    let decimals = step_decimals(nice_step);

    let ticks: Vec<f64> = (first..=last).map(|k| round_to(k as f64 * nice_step, decimals)).collect();

    AxisTickSet {
        min: ticks[0],
        max: ticks[ticks.len() - 1],
        ticks,
        step: nice_step,
    }
}

/// Rescale a comparison series so its first value lands on `series_start`.
/// Returns an empty vector when the benchmark cannot be anchored.
pub fn normalize_benchmark(benchmark_closes: &[f64], benchmark_start: f64, series_start: f64) -> Vec<f64> {
    if !(benchmark_start.is_finite() && benchmark_start > 0.0) || !series_start.is_finite() {
        return Vec::new();
    }
    let factor = series_start / benchmark_start;
    benchmark_closes.iter().map(|v| v * factor).collect()
}

/// Keep drawn values inside the primary axis.
pub fn clamp_to_axis(values: &[f64], axis: &AxisTickSet) -> Vec<f64> {
    values.iter().map(|v| v.clamp(axis.min, axis.max)).collect()
}

/// `clamp_to_axis` for an overlay, leaving gaps untouched.
pub fn clamp_overlay_to_axis(overlay: &DerivedOverlay, axis: &AxisTickSet) -> DerivedOverlay {
    overlay.iter().map(|v| v.map(|v| v.clamp(axis.min, axis.max))).collect()
}

/// As-of join of a benchmark onto the primary series timestamps: each primary
/// bar takes the latest benchmark close at or before it.
pub fn align_benchmark(primary: &BarSeries, benchmark: &BarSeries) -> DerivedOverlay {
    let bench = benchmark.bars();
    let mut cursor = 0usize;
    let mut current: Option<f64> = None;

    primary
        .bars()
        .iter()
        .map(|bar| {
            while cursor < bench.len() && bench[cursor].timestamp <= bar.timestamp {
                current = Some(bench[cursor].close());
                cursor += 1;
            }
            current
        })
        .collect()
}

/// Normalized benchmark overlay for `primary`, anchored at the first index
/// where both series have a value. All-`None` when no anchor exists.
pub fn benchmark_overlay(primary: &BarSeries, benchmark: &BarSeries) -> DerivedOverlay {
    let aligned = align_benchmark(primary, benchmark);
    let mut overlay = vec![None; aligned.len()];

    let Some(anchor) = aligned.iter().position(Option::is_some) else {
        return overlay;
    };
    let (Some(bench_start), Some(series_start)) = (aligned[anchor], primary.get(anchor).map(|b| b.close())) else {
        return overlay;
    };

    let indices: Vec<usize> = (anchor..aligned.len()).filter(|&i| aligned[i].is_some()).collect();
    let raw: Vec<f64> = indices.iter().filter_map(|&i| aligned[i]).collect();
    let normalized = normalize_benchmark(&raw, bench_start, series_start);

    for (i, value) in indices.into_iter().zip(normalized) {
        overlay[i] = Some(value);
    }
    overlay
}

/// Decimal places needed to print multiples of `step` exactly.
pub fn step_decimals(step: f64) -> i32 {
    if !(step.is_finite() && step > 0.0) {
        return 0;
    }
    (-step.log10().floor()).max(0.0) as i32
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}
