use futures::executor::block_on;
use hybrid_chart_wasm::application::chart_data_controller::{
    ChartDataController, LoadState, PeriodSelection, ResolveOutcome, load_period,
};
use hybrid_chart_wasm::domain::errors::{ChartError, ChartResult};
use hybrid_chart_wasm::domain::market_data::{
    Bar, BarSeries, OHLCV, Period, Symbol, Timestamp, repositories::ChartDataSource,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen_test::*;

fn series(period: Period, first_close: f64) -> BarSeries {
    let bars = (0..4)
        .map(|i| Bar::new(Timestamp::from_millis(1_000 + i * 1_000), OHLCV::flat(first_close + i as f64, 10)))
        .collect();
    BarSeries::new(period, bars)
}

#[derive(Default)]
struct ScriptedSource {
    failures: RefCell<HashMap<Period, ChartError>>,
    calls: Cell<usize>,
}

impl ScriptedSource {
    fn failing(self, period: Period, error: ChartError) -> Self {
        self.failures.borrow_mut().insert(period, error);
        self
    }
}

impl ChartDataSource for ScriptedSource {
    async fn fetch_series(&self, _symbol: &Symbol, period: Period) -> ChartResult<BarSeries> {
        self.calls.set(self.calls.get() + 1);
        match self.failures.borrow().get(&period) {
            Some(error) => Err(error.clone()),
            None => Ok(series(period, 100.0)),
        }
    }
}

fn controller() -> Rc<RefCell<ChartDataController>> {
    Rc::new(RefCell::new(ChartDataController::new(Symbol::from("AAPL"))))
}

fn fetch_ticket(selection: PeriodSelection) -> hybrid_chart_wasm::application::chart_data_controller::FetchTicket {
    match selection {
        PeriodSelection::Fetch(ticket) => ticket,
        other => panic!("expected a fetch, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn revisiting_a_period_is_served_from_cache() {
    let source = ScriptedSource::default();
    let chart = controller();

    assert_eq!(block_on(load_period(&chart, &source, Period::OneYear)), Some(ResolveOutcome::Applied));
    assert_eq!(block_on(load_period(&chart, &source, Period::OneMonth)), Some(ResolveOutcome::Applied));
    assert_eq!(block_on(load_period(&chart, &source, Period::OneYear)), None);

    assert_eq!(source.calls.get(), 2);
    let chart = chart.borrow();
    assert_eq!(chart.state(), &LoadState::Loaded { period: Period::OneYear });
    assert_eq!(chart.displayed_series().map(|s| s.period()), Some(Period::OneYear));
    assert_eq!(chart.cache_len(), 2);
}

#[wasm_bindgen_test]
fn out_of_order_response_is_cached_but_not_shown() {
    let mut chart = ChartDataController::new(Symbol::from("AAPL"));
    let slow = fetch_ticket(chart.select_period(Period::OneMonth));
    let fast = fetch_ticket(chart.select_period(Period::ThreeMonths));

    assert_eq!(chart.resolve(fast, Ok(series(Period::ThreeMonths, 50.0))), ResolveOutcome::Applied);
    assert_eq!(chart.resolve(slow, Ok(series(Period::OneMonth, 70.0))), ResolveOutcome::Stale);

    assert_eq!(chart.displayed_series().map(|s| s.period()), Some(Period::ThreeMonths));
    assert!(chart.cached(Period::OneMonth).is_some());
    assert_eq!(chart.select_period(Period::OneMonth), PeriodSelection::Cached);
}

#[wasm_bindgen_test]
fn failure_keeps_previous_series_on_screen() {
    let source = ScriptedSource::default().failing(Period::OneMonth, ChartError::Network("offline".into()));
    let chart = controller();

    block_on(load_period(&chart, &source, Period::OneYear));
    block_on(load_period(&chart, &source, Period::OneMonth));

    {
        let chart = chart.borrow();
        assert!(matches!(chart.state(), LoadState::Failed { period: Period::OneMonth, .. }));
        assert_eq!(chart.error().map(ChartError::banner), Some("Unable to load chart data"));
        assert_eq!(chart.displayed_series().map(|s| s.period()), Some(Period::OneYear));
        assert!(chart.cached(Period::OneMonth).is_none());
    }

    // failures are not cached, so the period is requested again
    block_on(load_period(&chart, &source, Period::OneMonth));
    assert_eq!(source.calls.get(), 3);
}

#[wasm_bindgen_test]
fn reselecting_an_in_flight_period_is_deduplicated() {
    let mut chart = ChartDataController::new(Symbol::from("AAPL"));
    let ticket = fetch_ticket(chart.select_period(Period::SixMonths));

    assert_eq!(chart.select_period(Period::SixMonths), PeriodSelection::AlreadyLoading);
    assert!(chart.is_loading());
    assert_eq!(chart.resolve(ticket, Ok(series(Period::SixMonths, 1.0))), ResolveOutcome::Applied);
    assert!(!chart.is_loading());
}

#[wasm_bindgen_test]
fn older_failure_does_not_override_newer_request() {
    let mut chart = ChartDataController::new(Symbol::from("AAPL"));
    let first = fetch_ticket(chart.select_period(Period::OneMonth));
    let _second = fetch_ticket(chart.select_period(Period::OneYear));

    let outcome = chart.resolve(first, Err(ChartError::HttpStatus { status: 500, message: "boom".into() }));
    assert_eq!(outcome, ResolveOutcome::Stale);
    assert_eq!(chart.state(), &LoadState::Loading { period: Period::OneYear });
}

#[wasm_bindgen_test]
fn symbol_change_discards_old_responses() {
    let mut chart = ChartDataController::new(Symbol::from("AAPL"));
    let old = fetch_ticket(chart.select_period(Period::OneMonth));

    let fresh = fetch_ticket(chart.change_symbol(Symbol::from("msft")));
    assert_eq!(fresh.symbol, Symbol::from("MSFT"));
    assert_eq!(fresh.period, Period::OneMonth);

    assert_eq!(chart.resolve(old, Ok(series(Period::OneMonth, 1.0))), ResolveOutcome::Stale);
    assert_eq!(chart.cache_len(), 0);
    assert_eq!(chart.resolve(fresh, Ok(series(Period::OneMonth, 2.0))), ResolveOutcome::Applied);
    assert_eq!(chart.displayed_series().and_then(|s| s.first().map(|b| b.close())), Some(2.0));
}

#[wasm_bindgen_test]
fn disposed_controller_ignores_everything() {
    let mut chart = ChartDataController::new(Symbol::from("AAPL"));
    let ticket = fetch_ticket(chart.select_period(Period::OneMonth));
    chart.dispose();

    assert_eq!(chart.resolve(ticket, Ok(series(Period::OneMonth, 1.0))), ResolveOutcome::Disposed);
    assert_eq!(chart.select_period(Period::OneYear), PeriodSelection::Disposed);
    assert!(chart.displayed_series().is_none());
    assert_eq!(chart.state(), &LoadState::Idle);
}

#[wasm_bindgen_test]
fn returning_to_an_in_flight_period_reuses_the_request() {
    let mut chart = ChartDataController::new(Symbol::from("AAPL"));
    let month = fetch_ticket(chart.select_period(Period::OneMonth));
    let _year = fetch_ticket(chart.select_period(Period::OneYear));

    assert_eq!(chart.select_period(Period::OneMonth), PeriodSelection::AlreadyLoading);
    assert_eq!(chart.state(), &LoadState::Loading { period: Period::OneMonth });
    assert_eq!(chart.resolve(month, Ok(series(Period::OneMonth, 1.0))), ResolveOutcome::Applied);
    assert_eq!(chart.state(), &LoadState::Loaded { period: Period::OneMonth });
}

#[wasm_bindgen_test]
fn late_failure_does_not_replace_loaded_period() {
    let mut chart = ChartDataController::new(Symbol::from("AAPL"));
    let month = fetch_ticket(chart.select_period(Period::OneMonth));
    let year = fetch_ticket(chart.select_period(Period::OneYear));
    assert_eq!(chart.select_period(Period::OneMonth), PeriodSelection::AlreadyLoading);

    assert_eq!(chart.resolve(month.clone(), Ok(series(Period::OneMonth, 1.0))), ResolveOutcome::Applied);
    assert_eq!(chart.select_period(Period::OneMonth), PeriodSelection::Cached);

    let offline = || -> ChartResult<BarSeries> { Err(ChartError::Network("offline".into())) };
    assert_eq!(chart.resolve(month, offline()), ResolveOutcome::Stale);
    assert_eq!(chart.resolve(year, offline()), ResolveOutcome::Stale);
    assert_eq!(chart.state(), &LoadState::Loaded { period: Period::OneMonth });
    assert!(chart.error().is_none());
    assert!(chart.cached(Period::OneMonth).is_some());
}

#[wasm_bindgen_test]
fn revisiting_an_in_flight_period_through_the_driver_fetches_once() {
    let source = ScriptedSource::default();
    let chart = controller();
    let pending = fetch_ticket(chart.borrow_mut().select_period(Period::FiveDays));

    assert_eq!(block_on(load_period(&chart, &source, Period::OneYear)), Some(ResolveOutcome::Applied));
    assert_eq!(block_on(load_period(&chart, &source, Period::FiveDays)), None);
    assert_eq!(source.calls.get(), 1);

    let outcome = chart.borrow_mut().resolve(pending, Ok(series(Period::FiveDays, 3.0)));
    assert_eq!(outcome, ResolveOutcome::Applied);
    assert_eq!(chart.borrow().state(), &LoadState::Loaded { period: Period::FiveDays });
}
