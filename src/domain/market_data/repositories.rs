use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::market_data::{BarSeries, Period, Quote, Symbol};
use futures::stream::LocalBoxStream;

/// Source of historical bars for one (symbol, period).
#[allow(async_fn_in_trait)]
pub trait ChartDataSource {
    async fn fetch_series(&self, symbol: &Symbol, period: Period) -> ChartResult<BarSeries>;
}

/// Open-ended live quote subscription. The stream ends after its first error.
pub trait QuoteFeed {
    fn subscribe(&self, symbol: &Symbol) -> LocalBoxStream<'static, Result<Quote, ChartError>>;
}
