use crate::domain::{
    errors::{ChartError, ChartResult},
    logging::{LogComponent, get_logger},
    market_data::{
        BarSeries, Period, Quote, Symbol,
        repositories::{ChartDataSource, QuoteFeed},
    },
};
use crate::infrastructure::dto::{parse_chart_response, parse_quote_response};
use futures::stream::{self, LocalBoxStream, StreamExt};
use gloo_net::http::Request;
use gloo_timers::future::sleep;
use std::time::Duration;

const COMPONENT: LogComponent = LogComponent::Infrastructure("TickerApi");

/// REST client for `{base}/tickers/{symbol}/chart` and `/price`.
#[derive(Debug, Clone)]
pub struct TickerApiClient {
    base_url: String,
}

impl TickerApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn chart_url(&self, symbol: &Symbol, period: Period) -> String {
        format!("{}/tickers/{}/chart?period={}", self.base_url, symbol.value(), period.as_query())
    }

    pub fn price_url(&self, symbol: &Symbol) -> String {
        format!("{}/tickers/{}/price", self.base_url, symbol.value())
    }

    pub async fn fetch_quote(&self, symbol: &Symbol) -> ChartResult<Quote> {
        let body = get_text(&self.price_url(symbol)).await?;
        parse_quote_response(&body)
    }
}

async fn get_text(url: &str) -> ChartResult<String> {
    let response = Request::get(url).send().await?;
    if !response.ok() {
        return Err(ChartError::HttpStatus { status: response.status(), message: response.status_text() });
    }
    Ok(response.text().await?)
}

impl ChartDataSource for TickerApiClient {
    async fn fetch_series(&self, symbol: &Symbol, period: Period) -> ChartResult<BarSeries> {
        let url = self.chart_url(symbol, period);
        get_logger().info(COMPONENT, &format!("GET {url}"));

        let body = get_text(&url).await.inspect_err(|e| {
            get_logger().error(COMPONENT, &format!("chart request failed: {e}"));
        })?;
        let series = parse_chart_response(&body, period)?;

        get_logger().info(COMPONENT, &format!("loaded {} bars for {symbol} {period}", series.len()));
        Ok(series)
    }
}

/// Live quotes by polling the price endpoint.
#[derive(Debug, Clone)]
pub struct QuotePoller {
    client: TickerApiClient,
    interval: Duration,
}

impl QuotePoller {
    pub fn new(client: TickerApiClient, interval_ms: u32) -> Self {
        Self { client, interval: Duration::from_millis(u64::from(interval_ms)) }
    }
}

impl QuoteFeed for QuotePoller {
    fn subscribe(&self, symbol: &Symbol) -> LocalBoxStream<'static, Result<Quote, ChartError>> {
        let client = self.client.clone();
        let symbol = symbol.clone();
        let interval = self.interval;

        // first poll is immediate; the stream ends after the first error
        stream::unfold((true, false), move |(first, failed)| {
            let client = client.clone();
            let symbol = symbol.clone();
            async move {
                if failed {
                    return None;
                }
                if !first {
                    sleep(interval).await;
                }
                let result = client.fetch_quote(&symbol).await;
                let failed = result.is_err();
                Some((result, (false, failed)))
            }
        })
        .boxed_local()
    }
}
