pub use super::value_objects::{OHLCV, Period, Price, Symbol, Timestamp, Volume};
use serde::{Deserialize, Serialize};

/// Domain entity - one OHLCV sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: Timestamp,
    pub ohlcv: OHLCV,
}

impl Bar {
    pub fn new(timestamp: Timestamp, ohlcv: OHLCV) -> Self {
        Self { timestamp, ohlcv }
    }

    pub fn close(&self) -> f64 {
        self.ohlcv.close.value()
    }

    pub fn volume(&self) -> u64 {
        self.ohlcv.volume.value()
    }

    pub fn is_bullish(&self) -> bool {
        self.ohlcv.close >= self.ohlcv.open
    }
}

/// Domain entity - immutable bar series for one (symbol, period)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarSeries {
    period: Period,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series in ascending timestamp order. Bars sharing a timestamp
    /// collapse into the one that arrived last.
    pub fn new(period: Period, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);

        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self { period, bars: deduped }
    }

    pub fn empty(period: Period) -> Self {
        Self { period, bars: Vec::new() }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// A line needs at least two points.
    pub fn is_plottable(&self) -> bool {
        self.bars.len() >= 2
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(Bar::close).collect()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.bars.iter().map(|bar| bar.timestamp).collect()
    }

    /// (min, max) over closing prices; the price line is drawn from closes.
    pub fn close_range(&self) -> Option<(f64, f64)> {
        fold_range(self.bars.iter().map(Bar::close))
    }

    /// (lowest low, highest high) over the whole period.
    pub fn high_low(&self) -> Option<(f64, f64)> {
        let low = fold_range(self.bars.iter().map(|b| b.ohlcv.low.value()))?.0;
        let high = fold_range(self.bars.iter().map(|b| b.ohlcv.high.value()))?.1;
        Some((low, high))
    }

    pub fn max_volume(&self) -> u64 {
        self.bars.iter().map(Bar::volume).max().unwrap_or(0)
    }
}

fn fold_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
