use super::BarSeries;
use super::series_math::{DerivedOverlay, benchmark_overlay, moving_average};
use crate::domain::chart::ChartConfig;

pub const MA50_WINDOW: usize = 50;
pub const MA200_WINDOW: usize = 200;

/// Overlays enabled for one render, each aligned with the primary series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySet {
    pub ma50: Option<DerivedOverlay>,
    pub ma200: Option<DerivedOverlay>,
    pub benchmark: Option<DerivedOverlay>,
}

impl OverlaySet {
    /// Derive the overlays selected by `config`. The benchmark overlay is only
    /// built when comparison is enabled and benchmark bars are available.
    pub fn build(series: &BarSeries, config: &ChartConfig, benchmark: Option<&BarSeries>) -> Self {
        let closes = series.closes();

        Self {
            ma50: config.show_ma50.then(|| moving_average(&closes, MA50_WINDOW)),
            ma200: config.show_ma200.then(|| moving_average(&closes, MA200_WINDOW)),
            benchmark: match (config.show_benchmark, benchmark) {
                (true, Some(bench)) if !bench.is_empty() => Some(benchmark_overlay(series, bench)),
                _ => None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ma50.is_none() && self.ma200.is_none() && self.benchmark.is_none()
    }

    /// Every overlay has exactly one slot per bar.
    pub fn is_aligned_with(&self, series: &BarSeries) -> bool {
        [&self.ma50, &self.ma200, &self.benchmark]
            .into_iter()
            .flatten()
            .all(|overlay| overlay.len() == series.len())
    }
}
