use super::BarSeries;
use serde::Serialize;

/// Summary numbers shown next to the chart. Always derived, never authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub current_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub average_volume: f64,
}

/// Domain service computing period statistics
pub struct MarketAnalysisService;

impl MarketAnalysisService {
    /// Statistics for the period. `live_price` replaces the last close as the
    /// current price when a quote has arrived. `None` for an empty series.
    pub fn statistics(series: &BarSeries, live_price: Option<f64>) -> Option<SeriesStatistics> {
        let first = series.first()?.close();
        let last = series.latest()?.close();
        let current_price = live_price.filter(|p| p.is_finite()).unwrap_or(last);

        let change = current_price - first;
        let change_percent = if first != 0.0 { change / first * 100.0 } else { 0.0 };

        let (low, high) = series.high_low().unwrap_or((last, last));
        let total_volume: f64 = series.bars().iter().map(|b| b.volume() as f64).sum();

        Some(SeriesStatistics {
            current_price,
            change,
            change_percent,
            high: high.max(current_price),
            low: low.min(current_price),
            average_volume: total_volume / series.len() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Bar, OHLCV, Period, Price, Timestamp, Volume};

    fn bar(ts: i64, low: f64, high: f64, close: f64, volume: u64) -> Bar {
        Bar::new(
            Timestamp::from_millis(ts),
            OHLCV::new(Price::from(close), Price::from(high), Price::from(low), Price::from(close), Volume::from(volume)),
        )
    }

    #[test]
    fn statistics_over_period() {
        let series = BarSeries::new(
            Period::OneMonth,
            vec![bar(0, 95.0, 105.0, 100.0, 10), bar(1, 98.0, 112.0, 110.0, 30)],
        );
        let stats = MarketAnalysisService::statistics(&series, None).unwrap();
        assert_eq!(stats.current_price, 110.0);
        assert_eq!(stats.change, 10.0);
        assert_eq!(stats.change_percent, 10.0);
        assert_eq!((stats.low, stats.high), (95.0, 112.0));
        assert_eq!(stats.average_volume, 20.0);
    }

    #[test]
    fn live_price_extends_range() {
        let series = BarSeries::new(Period::OneDay, vec![bar(0, 9.0, 11.0, 10.0, 1), bar(1, 9.0, 11.0, 10.0, 1)]);
        let stats = MarketAnalysisService::statistics(&series, Some(12.5)).unwrap();
        assert_eq!(stats.current_price, 12.5);
        assert_eq!(stats.high, 12.5);
        assert_eq!(stats.change_percent, 25.0);
    }

    #[test]
    fn empty_series_has_no_statistics() {
        assert!(MarketAnalysisService::statistics(&BarSeries::empty(Period::Max), None).is_none());
    }
}
