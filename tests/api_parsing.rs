use hybrid_chart_wasm::domain::errors::ChartError;
use hybrid_chart_wasm::domain::market_data::Period;
use hybrid_chart_wasm::infrastructure::dto::{parse_chart_response, parse_quote_response};
use hybrid_chart_wasm::infrastructure::websocket::{QuoteSocket, decode_frame};
use hybrid_chart_wasm::domain::market_data::Symbol;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn enveloped_chart_response() {
    let body = r#"{
        "data": {
            "symbol": "AAPL",
            "period": "1M",
            "dataPoints": [
                {"timestamp": "2024-03-02T00:00:00Z", "open": 180.1, "high": 182.0, "low": 179.5, "close": 181.2, "volume": 1200},
                {"timestamp": "2024-03-01T00:00:00Z", "open": "179.0", "high": "181.0", "low": "178.0", "close": "180.0", "volume": "900"}
            ],
            "count": 2,
            "lastUpdated": "2024-03-02T21:00:00Z"
        }
    }"#;

    let series = parse_chart_response(body, Period::OneYear).expect("valid body");
    assert_eq!(series.period(), Period::OneMonth);
    assert_eq!(series.closes(), vec![180.0, 181.2]);
    assert_eq!(series.latest().map(|b| b.volume()), Some(1200));
}

#[wasm_bindgen_test]
fn malformed_bars_are_skipped_or_patched() {
    let body = r#"{
        "dataPoints": [
            {"timestamp": 1709251200, "open": null, "high": "x", "low": 9.0, "close": 10.0, "volume": "n/a"},
            {"timestamp": 1709337600, "close": "oops"},
            {"timestamp": null, "close": 11.0},
            {"timestamp": 1709424000000, "open": 11.0, "high": 12.5, "low": 10.5, "close": 12.0, "volume": 7}
        ]
    }"#;

    let series = parse_chart_response(body, Period::FiveDays).expect("lenient parse");
    assert_eq!(series.period(), Period::FiveDays);
    assert_eq!(series.len(), 2);

    let first = series.first().expect("first bar");
    assert_eq!(first.timestamp.value(), 1_709_251_200_000);
    assert_eq!(first.ohlcv.open.value(), 10.0);
    assert_eq!(first.ohlcv.high.value(), 10.0);
    assert_eq!(first.ohlcv.low.value(), 9.0);
    assert_eq!(first.volume(), 0);
}

#[wasm_bindgen_test]
fn empty_and_invalid_chart_bodies() {
    let empty = parse_chart_response(r#"{"data": {"dataPoints": []}}"#, Period::OneDay).expect("empty is fine");
    assert!(empty.is_empty());

    assert!(matches!(parse_chart_response("<html>", Period::OneDay), Err(ChartError::Parse(_))));
}

#[wasm_bindgen_test]
fn quote_requires_price() {
    let quote = parse_quote_response(
        r#"{"data": {"price": "187.32", "change": 1.5, "changePercent": 0.81, "volume": 5400000, "lastUpdated": "2024-03-05T14:07:00Z"}}"#,
    )
    .expect("valid quote");
    assert_eq!(quote.price, 187.32);
    assert_eq!(quote.change_percent, 0.81);
    assert_eq!(quote.volume, 5_400_000);
    assert_eq!(quote.last_updated, 1_709_647_620_000);

    assert!(matches!(parse_quote_response(r#"{"change": 1.0}"#), Err(ChartError::Parse(_))));
}

#[wasm_bindgen_test]
fn socket_frames_without_quotes_are_ignored() {
    assert_eq!(decode_frame(r#"{"price": 10.5, "timestamp": 1709647620}"#).map(|q| q.last_updated), Some(1_709_647_620_000));
    assert!(decode_frame(r#"{"type": "heartbeat"}"#).is_none());
    assert!(decode_frame("not json").is_none());
}

#[wasm_bindgen_test]
fn socket_url_substitutes_symbol() {
    let socket = QuoteSocket::new("wss://quotes.example/ws?s={symbol}");
    assert_eq!(socket.url_for(&Symbol::from("brk.b")), "wss://quotes.example/ws?s=BRK.B");
}
