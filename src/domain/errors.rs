use derive_more::Display;

/// Flat error type for the chart engine. Every variant carries a message that
/// is safe to show in the UI error indicator.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ChartError {
    #[display(fmt = "Network Error: {}", _0)]
    Network(String),
    #[display(fmt = "HTTP Error: {} {}", status, message)]
    HttpStatus { status: u16, message: String },
    #[display(fmt = "Parse Error: {}", _0)]
    Parse(String),
    #[display(fmt = "Configuration Error: {}", _0)]
    Configuration(String),
    #[display(fmt = "Stream Error: {}", _0)]
    Stream(String),
}

impl std::error::Error for ChartError {}

impl ChartError {
    /// Short label for the error banner drawn over a preserved series.
    pub fn banner(&self) -> &'static str {
        match self {
            ChartError::Network(_) | ChartError::HttpStatus { .. } => "Unable to load chart data",
            ChartError::Parse(_) => "Chart data could not be read",
            ChartError::Configuration(_) => "Chart is misconfigured",
            ChartError::Stream(_) => "Live prices paused",
        }
    }
}

impl From<serde_json::Error> for ChartError {
    fn from(error: serde_json::Error) -> Self {
        ChartError::Parse(error.to_string())
    }
}

impl From<gloo_net::Error> for ChartError {
    fn from(error: gloo_net::Error) -> Self {
        match error {
            gloo_net::Error::SerdeError(e) => ChartError::Parse(e.to_string()),
            other => ChartError::Network(other.to_string()),
        }
    }
}

pub type ChartResult<T> = Result<T, ChartError>;
