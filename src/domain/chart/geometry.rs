//! Pixel mapping for the SVG price chart.
//!
//! Everything here is a pure function of its inputs: the same series, axis and
//! rectangle always produce the same coordinates and path strings.

use super::value_objects::{PlotRect, Point};
use crate::domain::market_data::BarSeries;
use crate::domain::market_data::series_math::{AxisTickSet, DerivedOverlay};
use serde::Serialize;
use std::fmt::Write;

/// Fraction of the per-bar slot taken by a volume bar.
pub const VOLUME_BAR_FILL: f64 = 0.7;

/// Maps series indices and prices into the price rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryMapper {
    rect: PlotRect,
    len: usize,
    axis_min: f64,
    axis_max: f64,
}

impl GeometryMapper {
    pub fn new(rect: PlotRect, len: usize, axis_min: f64, axis_max: f64) -> Self {
        Self { rect, len, axis_min, axis_max }
    }

    pub fn for_axis(rect: PlotRect, len: usize, axis: &AxisTickSet) -> Self {
        Self::new(rect, len, axis.min, axis.max)
    }

    pub fn rect(&self) -> PlotRect {
        self.rect
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Horizontal position of bar `index`. Undefined below two bars.
    pub fn x(&self, index: usize) -> Option<f64> {
        if self.len <= 1 {
            return None;
        }
        let fraction = index as f64 / (self.len - 1) as f64;
        Some(self.rect.x + fraction * self.rect.width)
    }

    fn scale(&self) -> f64 {
        let span = self.axis_max - self.axis_min;
        if span == 0.0 || !span.is_finite() { 0.0 } else { self.rect.height / span }
    }

    /// Vertical position of `value`; a flat axis collapses onto the bottom edge.
    pub fn y(&self, value: f64) -> f64 {
        self.rect.y + self.rect.height - (value - self.axis_min) * self.scale()
    }

    pub fn point(&self, index: usize, value: f64) -> Option<Point> {
        self.x(index).map(|x| Point::new(x, self.y(value)))
    }

    pub fn polyline(&self, values: &[f64]) -> Vec<Point> {
        values.iter().enumerate().filter_map(|(i, v)| self.point(i, *v)).collect()
    }

    /// Continuous runs of an overlay; `None` slots break the line.
    pub fn overlay_segments(&self, overlay: &DerivedOverlay) -> Vec<Vec<Point>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();

        for (i, value) in overlay.iter().enumerate() {
            match value.and_then(|v| self.point(i, v)) {
                Some(point) => current.push(point),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    pub fn price_path(&self, series: &BarSeries) -> String {
        svg_path(&self.polyline(&series.closes()))
    }

    pub fn overlay_path(&self, overlay: &DerivedOverlay) -> String {
        self.overlay_segments(overlay)
            .iter()
            .map(|segment| svg_path(segment))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `M x,y L x,y ...` with two decimals. Empty input yields an empty path.
pub fn svg_path(points: &[Point]) -> String {
    let mut path = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            path.push(' ');
        }
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{command}{},{}", fmt2(p.x), fmt2(p.y));
    }
    path
}

fn fmt2(value: f64) -> String {
    let s = format!("{value:.2}");
    if s == "-0.00" { "0.00".to_string() } else { s }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeBar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub bullish: bool,
}

/// Bottom-anchored volume bars inside the volume sub-rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeMapper {
    rect: PlotRect,
    len: usize,
    max_volume: u64,
}

impl VolumeMapper {
    pub fn new(rect: PlotRect, len: usize, max_volume: u64) -> Self {
        Self { rect, len, max_volume }
    }

    pub fn scale(&self) -> f64 {
        if self.max_volume == 0 { 0.0 } else { self.rect.height / self.max_volume as f64 }
    }

    pub fn bar_width(&self) -> f64 {
        if self.len == 0 { 0.0 } else { self.rect.width / self.len as f64 * VOLUME_BAR_FILL }
    }

    fn center(&self, index: usize) -> f64 {
        if self.len <= 1 {
            return self.rect.x + self.rect.width / 2.0;
        }
        self.rect.x + index as f64 / (self.len - 1) as f64 * self.rect.width
    }

    pub fn bar(&self, index: usize, volume: u64, bullish: bool) -> VolumeBar {
        let height = volume as f64 * self.scale();
        let width = self.bar_width();
        VolumeBar {
            x: self.center(index) - width / 2.0,
            y: self.rect.bottom() - height,
            width,
            height,
            bullish,
        }
    }

    pub fn bars(&self, series: &BarSeries) -> Vec<VolumeBar> {
        series.bars().iter().enumerate().map(|(i, b)| self.bar(i, b.volume(), b.is_bullish())).collect()
    }
}
