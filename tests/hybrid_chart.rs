use futures::executor::block_on;
use hybrid_chart_wasm::application::chart_data_controller::{LoadState, ResolveOutcome};
use hybrid_chart_wasm::application::coordinator::HybridChart;
use hybrid_chart_wasm::application::live_price_service::FlashScheduler;
use hybrid_chart_wasm::config::EngineConfig;
use hybrid_chart_wasm::domain::errors::ChartResult;
use hybrid_chart_wasm::domain::market_data::{
    Bar, BarSeries, FlashColor, OHLCV, Period, Quote, Symbol, Timestamp, repositories::ChartDataSource,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen_test::*;

/// Drops every callback; flashes never revert on their own.
struct NoTimers;

impl FlashScheduler for NoTimers {
    type Handle = ();

    fn schedule(&self, _delay_ms: u32, _callback: Box<dyn FnOnce()>) {}
}

#[derive(Default)]
struct RecordingSource {
    requests: RefCell<Vec<(String, Period)>>,
}

impl ChartDataSource for RecordingSource {
    async fn fetch_series(&self, symbol: &Symbol, period: Period) -> ChartResult<BarSeries> {
        self.requests.borrow_mut().push((symbol.to_string(), period));
        let base = match symbol.value() {
            "SPY" => 500.0,
            "MSFT" => 400.0,
            _ => 180.0,
        };
        let bars = (0..10)
            .map(|i| Bar::new(Timestamp::from_millis(1_700_000_000_000 + i * 86_400_000), OHLCV::flat(base + i as f64, 100)))
            .collect();
        Ok(BarSeries::new(period, bars))
    }
}

fn chart() -> HybridChart<RecordingSource, NoTimers> {
    HybridChart::new(Symbol::from("AAPL"), &EngineConfig::default(), RecordingSource::default(), NoTimers)
}

fn requests(chart: &HybridChart<RecordingSource, NoTimers>) -> Vec<(String, Period)> {
    chart.source().requests.borrow().clone()
}

fn quote(price: f64) -> Quote {
    Quote { price, change: 1.0, change_percent: 0.5, volume: 10, last_updated: 1_700_000_000_000 }
}

#[wasm_bindgen_test]
fn selecting_a_period_loads_and_seeds_live_price() {
    let chart = chart();
    let changes = Rc::new(Cell::new(0));
    let counter = Rc::clone(&changes);
    chart.set_change_listener(Rc::new(move || counter.set(counter.get() + 1)));

    assert_eq!(block_on(chart.select_period(Period::OneMonth)), Some(ResolveOutcome::Applied));
    assert_eq!(chart.load_state(), LoadState::Loaded { period: Period::OneMonth });
    assert_eq!(chart.live_state().price, Some(189.0));
    assert!(changes.get() >= 2);

    // seeded price makes the first quote flash
    chart.push_quote(&quote(190.0));
    assert_eq!(chart.live_state().flash_color, FlashColor::Up);
    assert_eq!(chart.statistics().map(|s| s.current_price), Some(190.0));
}

#[wasm_bindgen_test]
fn benchmark_follows_selected_period() {
    let chart = chart();
    block_on(chart.select_period(Period::ThreeMonths));
    assert!(chart.render().geometry().and_then(|g| g.benchmark_path.clone()).is_none());

    block_on(chart.toggle_benchmark());
    assert!(chart.config().show_benchmark);
    assert!(chart.render().geometry().and_then(|g| g.benchmark_path.clone()).is_some());

    block_on(chart.select_period(Period::OneYear));
    let seen = requests(&chart);
    assert!(seen.contains(&("SPY".to_string(), Period::ThreeMonths)));
    assert!(seen.contains(&("SPY".to_string(), Period::OneYear)));

    // both series of a visited period are cached
    block_on(chart.select_period(Period::ThreeMonths));
    assert_eq!(requests(&chart).len(), seen.len());
}

#[wasm_bindgen_test]
fn symbol_change_refetches_current_period() {
    let chart = chart();
    block_on(chart.select_period(Period::SixMonths));
    chart.push_quote(&quote(200.0));

    assert_eq!(block_on(chart.change_symbol(Symbol::from("msft"))), Some(ResolveOutcome::Applied));
    assert_eq!(chart.symbol(), Symbol::from("MSFT"));
    assert_eq!(chart.selected_period(), Some(Period::SixMonths));
    assert_eq!(chart.live_state().price, Some(409.0));
    assert_eq!(chart.live_state().flash_color, FlashColor::None);

    assert_eq!(block_on(chart.change_symbol(Symbol::from("MSFT"))), None);
}

#[wasm_bindgen_test]
fn fullscreen_switches_dimensions_only() {
    let chart = chart();
    block_on(chart.select_period(Period::OneMonth));
    let before = requests(&chart).len();

    assert!(chart.toggle_fullscreen());
    assert_eq!((chart.dimensions().width, chart.dimensions().height), (1600.0, 900.0));
    assert!(!chart.toggle_fullscreen());
    assert_eq!((chart.dimensions().width, chart.dimensions().height), (800.0, 400.0));
    assert_eq!(requests(&chart).len(), before);
}

#[wasm_bindgen_test]
fn disposed_chart_stops_loading() {
    let chart = chart();
    block_on(chart.select_period(Period::OneMonth));
    chart.dispose();

    assert!(chart.is_disposed());
    assert_eq!(block_on(chart.select_period(Period::OneYear)), None);
    chart.push_quote(&quote(1.0));
    assert!(chart.render().geometry().is_none());
}
