use super::value_objects::{PlotRect, Point, Size};
use crate::domain::market_data::BarSeries;
use serde::Serialize;

/// Gap between the pointer and the tooltip box.
pub const TOOLTIP_OFFSET: f64 = 12.0;

/// Data shown for the bar under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    pub index: usize,
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Snapped to the bar's x, pointer's y.
    pub anchor: Point,
}

/// Index of the bar nearest to pointer `x`; `None` outside the plot.
pub fn pointer_to_index(x: f64, rect: &PlotRect, len: usize) -> Option<usize> {
    if len == 0 || !x.is_finite() || !rect.contains_x(x) {
        return None;
    }
    if len == 1 || rect.width == 0.0 {
        return Some(0);
    }
    let raw = ((x - rect.x) / rect.width * (len - 1) as f64).round();
    Some((raw.max(0.0) as usize).min(len - 1))
}

pub fn tooltip_at(pointer: Point, rect: &PlotRect, series: &BarSeries) -> Option<TooltipContent> {
    if !rect.contains(pointer) {
        return None;
    }
    let index = pointer_to_index(pointer.x, rect, series.len())?;
    let bar = series.get(index)?;

    let anchor_x = if series.len() > 1 {
        rect.x + index as f64 / (series.len() - 1) as f64 * rect.width
    } else {
        rect.x + rect.width / 2.0
    };

    Some(TooltipContent {
        index,
        timestamp: bar.timestamp.value(),
        open: bar.ohlcv.open.value(),
        high: bar.ohlcv.high.value(),
        low: bar.ohlcv.low.value(),
        close: bar.close(),
        volume: bar.volume(),
        anchor: Point::new(anchor_x, pointer.y),
    })
}

/// Top-left corner for a tooltip of `size` near `anchor`. Prefers the lower
/// right side and flips on each axis that would overflow the viewport.
pub fn place_tooltip(anchor: Point, size: Size, viewport: Size) -> Point {
    Point::new(
        place_axis(anchor.x, size.width, viewport.width),
        place_axis(anchor.y, size.height, viewport.height),
    )
}

fn place_axis(anchor: f64, extent: f64, limit: f64) -> f64 {
    let after = anchor + TOOLTIP_OFFSET;
    if after + extent <= limit {
        return after;
    }
    let before = anchor - TOOLTIP_OFFSET - extent;
    if before >= 0.0 {
        return before;
    }
    (limit - extent).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_rounds_and_clamps() {
        let rect = PlotRect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(pointer_to_index(0.0, &rect, 5), Some(0));
        assert_eq!(pointer_to_index(12.4, &rect, 5), Some(0));
        assert_eq!(pointer_to_index(12.6, &rect, 5), Some(1));
        assert_eq!(pointer_to_index(100.0, &rect, 5), Some(4));
        assert_eq!(pointer_to_index(-1.0, &rect, 5), None);
        assert_eq!(pointer_to_index(101.0, &rect, 5), None);
        assert_eq!(pointer_to_index(50.0, &rect, 0), None);
    }

    #[test]
    fn placement_flips_near_edges() {
        let viewport = Size::new(200.0, 100.0);
        let size = Size::new(50.0, 30.0);
        assert_eq!(place_tooltip(Point::new(10.0, 10.0), size, viewport), Point::new(22.0, 22.0));
        assert_eq!(place_tooltip(Point::new(190.0, 90.0), size, viewport), Point::new(128.0, 48.0));
    }

    #[test]
    fn oversized_tooltip_pins_to_origin() {
        let placed = place_tooltip(Point::new(5.0, 5.0), Size::new(300.0, 300.0), Size::new(200.0, 100.0));
        assert_eq!(placed, Point::new(0.0, 0.0));
    }
}
