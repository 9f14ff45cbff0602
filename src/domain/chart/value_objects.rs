use serde::{Deserialize, Serialize};

/// Feature switches of the consolidated chart component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    pub show_volume: bool,
    #[serde(rename = "showMA50")]
    pub show_ma50: bool,
    #[serde(rename = "showMA200")]
    pub show_ma200: bool,
    pub show_benchmark: bool,
    pub fullscreen: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            show_volume: true,
            show_ma50: false,
            show_ma200: false,
            show_benchmark: false,
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self { top: 20.0, right: 60.0, bottom: 30.0, left: 10.0 }
    }
}

/// Value Object - axis-aligned drawing rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width: width.max(0.0), height: height.max(0.0) }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x <= self.right()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.contains_x(point.x) && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Static layout settings; fullscreen swaps in the viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub volume_height: f64,
    pub volume_gap: f64,
    pub fullscreen_width: f64,
    pub fullscreen_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            padding: Padding::default(),
            volume_height: 60.0,
            volume_gap: 10.0,
            fullscreen_width: 1600.0,
            fullscreen_height: 900.0,
        }
    }
}

/// Resolved pixel dimensions handed to the geometry mapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub volume_height: f64,
    pub volume_gap: f64,
    pub show_volume: bool,
}

impl ChartDimensions {
    /// Dimensions for the current mode. In fullscreen the measured viewport is
    /// used when known, otherwise the configured fullscreen size.
    pub fn resolve(layout: &LayoutConfig, config: &ChartConfig, viewport: Option<Size>) -> Self {
        let (width, height) = if config.fullscreen {
            viewport
                .filter(|v| v.width > 0.0 && v.height > 0.0)
                .map(|v| (v.width, v.height))
                .unwrap_or((layout.fullscreen_width, layout.fullscreen_height))
        } else {
            (layout.width, layout.height)
        };

        Self {
            width,
            height,
            padding: layout.padding,
            volume_height: layout.volume_height,
            volume_gap: layout.volume_gap,
            show_volume: config.show_volume,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn reserved_volume(&self) -> f64 {
        if self.show_volume { self.volume_height + self.volume_gap } else { 0.0 }
    }

    pub fn price_rect(&self) -> PlotRect {
        let p = &self.padding;
        PlotRect::new(
            p.left,
            p.top,
            self.width - p.left - p.right,
            self.height - p.top - p.bottom - self.reserved_volume(),
        )
    }

    /// Sub-rectangle under the price area; `None` when volume is hidden.
    pub fn volume_rect(&self) -> Option<PlotRect> {
        if !self.show_volume {
            return None;
        }
        let price = self.price_rect();
        Some(PlotRect::new(price.x, price.bottom() + self.volume_gap, price.width, self.volume_height))
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> u32 {
        let r = (self.r * 255.0).round() as u32;
        let g = (self.g * 255.0).round() as u32;
        let b = (self.b * 255.0).round() as u32;
        (r << 16) | (g << 8) | b
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:06x}", self.to_hex())
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                (self.r * 255.0).round() as u8,
                (self.g * 255.0).round() as u8,
                (self.b * 255.0).round() as u8,
                self.a
            )
        }
    }

    pub const PRICE_UP: Color = Color { r: 0.086, g: 0.639, b: 0.290, a: 1.0 };
    pub const PRICE_DOWN: Color = Color { r: 0.863, g: 0.149, b: 0.149, a: 1.0 };
    pub const NEUTRAL: Color = Color { r: 0.216, g: 0.255, b: 0.318, a: 1.0 };
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}
