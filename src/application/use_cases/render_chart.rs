use crate::application::chart_data_controller::LoadState;
use crate::domain::{
    chart::{
        ChartDimensions, GeometryMapper, PlotRect, Point, Size, TooltipContent, VolumeBar, VolumeMapper,
        place_tooltip, tooltip_at,
    },
    market_data::{
        BarSeries, FlashColor, LivePriceState, OverlaySet,
        series_math::{AxisTickSet, DEFAULT_TICK_COUNT, clamp_overlay_to_axis, nice_axis_ticks, step_decimals},
        services::{MarketAnalysisService, SeriesStatistics},
    },
};
use crate::time_utils::{format_time_label, format_tooltip_time};
use serde::Serialize;

pub const TOOLTIP_SIZE: Size = Size { width: 168.0, height: 104.0 };
pub const X_LABEL_COUNT: usize = 5;

pub struct RenderInput<'a> {
    pub series: Option<&'a BarSeries>,
    pub overlays: &'a OverlaySet,
    pub live: &'a LivePriceState,
    pub dimensions: ChartDimensions,
    pub pointer: Option<Point>,
    pub load_state: &'a LoadState,
    pub desired_tick_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    /// Pixel position along the axis (y for price ticks, x for time labels).
    pub position: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMarker {
    pub y: f64,
    pub text: String,
    pub flash: FlashColor,
    /// The live price lies outside the axis and was pinned to its edge.
    pub clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub content: TooltipContent,
    pub position: Point,
    pub time: String,
    pub lines: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub dimensions: ChartDimensions,
    pub price_rect: PlotRect,
    pub volume_rect: Option<PlotRect>,
    pub axis: AxisTickSet,
    pub price_path: String,
    pub ma50_path: Option<String>,
    pub ma200_path: Option<String>,
    pub benchmark_path: Option<String>,
    pub volume_bars: Vec<VolumeBar>,
    pub y_ticks: Vec<AxisLabel>,
    pub x_labels: Vec<AxisLabel>,
    pub current_price: Option<PriceMarker>,
    pub tooltip: Option<TooltipView>,
    pub statistics: Option<SeriesStatistics>,
    pub trend_up: bool,
    pub loading: bool,
    pub error_banner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartRender {
    NoData { message: String, loading: bool, error_banner: Option<String> },
    Chart(Box<ChartGeometry>),
}

impl ChartRender {
    pub fn geometry(&self) -> Option<&ChartGeometry> {
        match self {
            ChartRender::Chart(geometry) => Some(geometry),
            ChartRender::NoData { .. } => None,
        }
    }
}

/// Turns cached data, overlays and live state into drawable SVG geometry.
pub struct RenderChartUseCase;

impl RenderChartUseCase {
    pub fn render(input: RenderInput<'_>) -> ChartRender {
        let loading = matches!(input.load_state, LoadState::Loading { .. });
        let error_banner = match input.load_state {
            LoadState::Failed { error, .. } => Some(error.banner().to_string()),
            _ => None,
        };

        let Some(series) = input.series.filter(|s| s.is_plottable()) else {
            let message = if loading {
                "Loading chart data..."
            } else if error_banner.is_some() {
                "Chart data unavailable"
            } else {
                "No data available for this period"
            };
            return ChartRender::NoData { message: message.to_string(), loading, error_banner };
        };

        let Some((low, high)) = series.close_range() else {
            let message = "No data available for this period".to_string();
            return ChartRender::NoData { message, loading, error_banner };
        };

        let tick_count = if input.desired_tick_count == 0 { DEFAULT_TICK_COUNT } else { input.desired_tick_count };
        let axis = nice_axis_ticks(low, high, tick_count);
        let price_rect = input.dimensions.price_rect();
        let mapper = GeometryMapper::for_axis(price_rect, series.len(), &axis);

        let benchmark_path = input
            .overlays
            .benchmark
            .as_ref()
            .map(|overlay| mapper.overlay_path(&clamp_overlay_to_axis(overlay, &axis)));

        let volume_rect = input.dimensions.volume_rect();
        let volume_bars = volume_rect
            .map(|rect| VolumeMapper::new(rect, series.len(), series.max_volume()).bars(series))
            .unwrap_or_default();

        let decimals = step_decimals(axis.step).max(2) as usize;
        let y_ticks = axis
            .ticks
            .iter()
            .map(|tick| AxisLabel { position: mapper.y(*tick), text: format!("{tick:.decimals$}") })
            .collect();

        let x_labels = label_indices(series.len(), X_LABEL_COUNT)
            .into_iter()
            .filter_map(|i| {
                let bar = series.get(i)?;
                Some(AxisLabel {
                    position: mapper.x(i)?,
                    text: format_time_label(bar.timestamp.value(), series.period()),
                })
            })
            .collect();

        let current_price = input.live.price.filter(|p| p.is_finite()).map(|price| {
            let pinned = price.clamp(axis.min, axis.max);
            PriceMarker {
                y: mapper.y(pinned),
                text: format_price(price),
                flash: input.live.flash_color,
                clamped: pinned != price,
            }
        });

        let tooltip = input.pointer.and_then(|pointer| {
            let content = tooltip_at(pointer, &price_rect, series)?;
            Some(TooltipView {
                position: place_tooltip(content.anchor, TOOLTIP_SIZE, input.dimensions.size()),
                time: format_tooltip_time(content.timestamp, series.period()),
                lines: vec![
                    ("Open".to_string(), format_price(content.open)),
                    ("High".to_string(), format_price(content.high)),
                    ("Low".to_string(), format_price(content.low)),
                    ("Close".to_string(), format_price(content.close)),
                    ("Volume".to_string(), format_volume(content.volume)),
                ],
                content,
            })
        });

        let statistics = MarketAnalysisService::statistics(series, input.live.price);
        let trend_up = statistics.map(|s| s.change >= 0.0).unwrap_or(true);

        ChartRender::Chart(Box::new(ChartGeometry {
            dimensions: input.dimensions,
            price_rect,
            volume_rect,
            price_path: mapper.price_path(series),
            ma50_path: input.overlays.ma50.as_ref().map(|o| mapper.overlay_path(o)),
            ma200_path: input.overlays.ma200.as_ref().map(|o| mapper.overlay_path(o)),
            benchmark_path,
            volume_bars,
            y_ticks,
            x_labels,
            current_price,
            tooltip,
            statistics,
            trend_up,
            loading,
            error_banner,
            axis,
        }))
    }
}

/// Up to `count` evenly spread indices including both ends.
fn label_indices(len: usize, count: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    if len <= count || count < 2 {
        return (0..len.min(count.max(1))).collect();
    }
    let mut indices: Vec<usize> = (0..count)
        .map(|k| ((k * (len - 1)) as f64 / (count - 1) as f64).round() as usize)
        .collect();
    indices.dedup();
    indices
}

pub fn format_price(value: f64) -> String {
    if value.abs() < 1.0 && value != 0.0 {
        format!("{value:.4}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_volume(volume: u64) -> String {
    let v = volume as f64;
    if v >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        volume.to_string()
    }
}
