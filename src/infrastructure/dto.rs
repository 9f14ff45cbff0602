//! Wire formats of the ticker REST API and their lenient conversion into
//! domain types. Malformed fields never abort a whole response.

use crate::domain::{
    errors::{ChartError, ChartResult},
    logging::LogComponent,
    market_data::{Bar, BarSeries, OHLCV, Period, Price, Quote, Timestamp, Volume},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Unix timestamps below this are seconds, above are milliseconds.
const SECONDS_CUTOFF: f64 = 100_000_000_000.0;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChartResponseDto {
    Envelope { data: ChartPayloadDto },
    Flat(ChartPayloadDto),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartPayloadDto {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub data_points: Vec<BarDto>,
    pub count: Option<usize>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BarDto {
    pub timestamp: Value,
    pub open: Value,
    pub high: Value,
    pub low: Value,
    pub close: Value,
    pub volume: Value,
}

impl BarDto {
    /// `None` when close or timestamp is unusable. Bad open/high/low fall
    /// back to close, bad volume to zero.
    pub fn to_bar(&self) -> Option<Bar> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        let close = parse_number(&self.close)?;
        let open = parse_number(&self.open).unwrap_or(close);
        let high = parse_number(&self.high).unwrap_or(close);
        let low = parse_number(&self.low).unwrap_or(close);
        let volume = parse_volume(&self.volume).unwrap_or(0);

        Some(Bar::new(
            Timestamp::from_millis(timestamp),
            OHLCV::new(Price::from(open), Price::from(high), Price::from(low), Price::from(close), Volume::from(volume)),
        ))
    }
}

impl ChartPayloadDto {
    pub fn into_series(self, requested: Period) -> BarSeries {
        let period = self.period.as_deref().and_then(|p| p.parse().ok()).unwrap_or(requested);
        let total = self.data_points.len();
        let bars: Vec<Bar> = self.data_points.iter().filter_map(BarDto::to_bar).collect();

        if bars.len() < total {
            crate::log_warn!(
                LogComponent::Infrastructure("ChartDto"),
                "skipped {} of {total} malformed bars",
                total - bars.len()
            );
        }
        BarSeries::new(period, bars)
    }
}

/// Parse a chart response body in either the flat or the enveloped form.
pub fn parse_chart_response(body: &str, requested: Period) -> ChartResult<BarSeries> {
    let dto: ChartResponseDto = serde_json::from_str(body)?;
    let payload = match dto {
        ChartResponseDto::Envelope { data } => data,
        ChartResponseDto::Flat(payload) => payload,
    };
    Ok(payload.into_series(requested))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuoteResponseDto {
    Envelope { data: QuoteDto },
    Flat(QuoteDto),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteDto {
    pub price: Value,
    pub change: Value,
    pub change_percent: Value,
    pub volume: Value,
    pub timestamp: Value,
    pub last_updated: Value,
}

impl QuoteDto {
    pub fn into_quote(self) -> ChartResult<Quote> {
        let price = parse_number(&self.price)
            .ok_or_else(|| ChartError::Parse(format!("quote without usable price: {}", self.price)))?;

        let last_updated = parse_timestamp(&self.last_updated)
            .or_else(|| parse_timestamp(&self.timestamp))
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Ok(Quote {
            price,
            change: parse_number(&self.change).unwrap_or(0.0),
            change_percent: parse_number(&self.change_percent).unwrap_or(0.0),
            volume: parse_volume(&self.volume).unwrap_or(0),
            last_updated,
        })
    }
}

pub fn parse_quote_response(body: &str) -> ChartResult<Quote> {
    let dto: QuoteResponseDto = serde_json::from_str(body)?;
    match dto {
        QuoteResponseDto::Envelope { data } => data.into_quote(),
        QuoteResponseDto::Flat(quote) => quote.into_quote(),
    }
}

/// Decimal string or JSON number; non-finite values are rejected.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn parse_volume(value: &Value) -> Option<u64> {
    if let Value::Number(n) = value
        && let Some(v) = n.as_u64()
    {
        return Some(v);
    }
    if let Value::String(s) = value
        && let Ok(v) = s.trim().parse::<u64>()
    {
        return Some(v);
    }
    parse_number(value).filter(|v| *v >= 0.0).map(|v| v.round() as u64)
}

/// Milliseconds since epoch from an RFC 3339 string or a unix number.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    if let Value::String(s) = value
        && let Ok(time) = DateTime::parse_from_rfc3339(s.trim())
    {
        return Some(time.with_timezone(&Utc).timestamp_millis());
    }
    let raw = parse_number(value)?;
    if raw <= 0.0 {
        return None;
    }
    let millis = if raw < SECONDS_CUTOFF { raw * 1000.0 } else { raw };
    Some(millis.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamps_accept_strings_and_numbers() {
        assert_eq!(parse_timestamp(&json!("2024-01-02T00:00:00Z")), Some(1_704_153_600_000));
        assert_eq!(parse_timestamp(&json!(1_704_153_600)), Some(1_704_153_600_000));
        assert_eq!(parse_timestamp(&json!(1_704_153_600_000i64)), Some(1_704_153_600_000));
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&Value::Null), None);
    }

    #[test]
    fn volume_from_strings_and_floats() {
        assert_eq!(parse_volume(&json!("1200")), Some(1200));
        assert_eq!(parse_volume(&json!(12.6)), Some(13));
        assert_eq!(parse_volume(&json!(-5)), None);
    }
}
