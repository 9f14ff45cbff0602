//! Engine configuration handed over from the host page as JSON.

use crate::domain::{
    chart::{ChartConfig, LayoutConfig},
    errors::{ChartError, ChartResult},
    logging::LogLevel,
    market_data::Symbol,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub api_base_url: String,
    pub benchmark_symbol: String,
    pub flash_duration_ms: u32,
    /// Poll interval of the REST quote feed; ignored when a socket URL is set.
    pub quote_poll_interval_ms: u32,
    pub quote_socket_url: Option<String>,
    pub desired_tick_count: usize,
    pub log_level: String,
    pub layout: LayoutConfig,
    pub chart: ChartConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "/api/v1".to_string(),
            benchmark_symbol: "SPY".to_string(),
            flash_duration_ms: 1000,
            quote_poll_interval_ms: 5000,
            quote_socket_url: None,
            desired_tick_count: 5,
            log_level: "info".to_string(),
            layout: LayoutConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ChartResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ChartError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ChartError::Configuration("apiBaseUrl must not be empty".into()));
        }
        Symbol::new(self.benchmark_symbol.clone()).map_err(ChartError::Configuration)?;
        if self.flash_duration_ms == 0 {
            return Err(ChartError::Configuration("flashDurationMs must be positive".into()));
        }
        if self.quote_poll_interval_ms < 250 {
            return Err(ChartError::Configuration("quotePollIntervalMs must be at least 250".into()));
        }
        if self.desired_tick_count < 2 {
            return Err(ChartError::Configuration("desiredTickCount must be at least 2".into()));
        }
        let layout = &self.layout;
        if !(layout.width > 0.0 && layout.height > 0.0) {
            return Err(ChartError::Configuration(format!(
                "layout size must be positive, got {}x{}",
                layout.width, layout.height
            )));
        }
        self.log_level.parse::<LogLevel>().map_err(ChartError::Configuration)?;
        Ok(())
    }

    pub fn benchmark(&self) -> Symbol {
        Symbol::from(self.benchmark_symbol.as_str())
    }

    pub fn min_log_level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or(LogLevel::Info)
    }

    /// `api_base_url` without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
