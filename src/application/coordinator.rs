use crate::application::{
    chart_data_controller::{
        ChartDataController, LoadState, PeriodSelection, ResolveOutcome, load_period, run_fetch,
    },
    live_price_service::{FlashScheduler, LivePriceService, PriceListener, spawn_quote_subscription},
    use_cases::render_chart::{ChartRender, RenderChartUseCase, RenderInput},
};
use crate::config::EngineConfig;
use crate::domain::{
    chart::{ChartConfig, ChartDimensions, LayoutConfig, Point, Size},
    errors::ChartError,
    logging::{LogComponent, get_logger},
    market_data::{
        LivePriceState, OverlaySet, Period, Quote, Symbol, repositories::ChartDataSource,
        services::{MarketAnalysisService, SeriesStatistics},
    },
};
use futures::future::AbortHandle;
use futures::stream::LocalBoxStream;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const COMPONENT: LogComponent = LogComponent::Application("HybridChart");

/// One chart instance: owns its caches, live price state and subscriptions.
/// Nothing is shared between instances; `dispose` releases everything.
pub struct HybridChart<S: ChartDataSource, T: FlashScheduler> {
    source: S,
    primary: Rc<RefCell<ChartDataController>>,
    benchmark: Rc<RefCell<ChartDataController>>,
    live: Rc<LivePriceService<T>>,
    chart_config: Cell<ChartConfig>,
    layout: LayoutConfig,
    desired_tick_count: usize,
    viewport: Cell<Option<Size>>,
    pointer: Cell<Option<Point>>,
    quote_subscription: RefCell<Option<AbortHandle>>,
    change_listener: RefCell<Option<Rc<dyn Fn()>>>,
}

impl<S: ChartDataSource, T: FlashScheduler + 'static> HybridChart<S, T> {
    pub fn new(symbol: Symbol, config: &EngineConfig, source: S, scheduler: T) -> Self {
        get_logger().info(COMPONENT, &format!("creating chart for {symbol}"));
        Self {
            source,
            primary: Rc::new(RefCell::new(ChartDataController::new(symbol))),
            benchmark: Rc::new(RefCell::new(ChartDataController::new(config.benchmark()))),
            live: Rc::new(LivePriceService::new(scheduler, config.flash_duration_ms)),
            chart_config: Cell::new(config.chart),
            layout: config.layout,
            desired_tick_count: config.desired_tick_count,
            viewport: Cell::new(None),
            pointer: Cell::new(None),
            quote_subscription: RefCell::new(None),
            change_listener: RefCell::new(None),
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.primary.borrow().symbol().clone()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> ChartConfig {
        self.chart_config.get()
    }

    pub fn load_state(&self) -> LoadState {
        self.primary.borrow().state().clone()
    }

    pub fn selected_period(&self) -> Option<Period> {
        self.primary.borrow().selected_period()
    }

    pub fn live_state(&self) -> LivePriceState {
        self.live.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.primary.borrow().is_disposed()
    }

    pub fn set_price_listener(&self, listener: PriceListener) {
        self.live.set_listener(listener);
    }

    /// Called whenever load state, data or switches change.
    pub fn set_change_listener(&self, listener: Rc<dyn Fn()>) {
        *self.change_listener.borrow_mut() = Some(listener);
    }

    fn notify_changed(&self) {
        let listener = self.change_listener.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    /// Timeframe button. Cached periods switch without a request; the
    /// benchmark follows the same period when comparison is on.
    pub async fn select_period(&self, period: Period) -> Option<ResolveOutcome> {
        let primary = self.primary.borrow_mut().select_period(period);
        let benchmark =
            self.chart_config.get().show_benchmark.then(|| self.benchmark.borrow_mut().select_period(period));
        self.notify_changed();

        let (outcome, _) = futures::join!(
            self.fetch(&self.primary, Some(primary)),
            self.fetch(&self.benchmark, benchmark)
        );
        self.seed_live_price();
        self.notify_changed();
        outcome
    }

    async fn fetch(
        &self,
        controller: &Rc<RefCell<ChartDataController>>,
        selection: Option<PeriodSelection>,
    ) -> Option<ResolveOutcome> {
        match selection {
            Some(PeriodSelection::Fetch(ticket)) => Some(run_fetch(controller, &self.source, ticket).await),
            _ => None,
        }
    }

    /// Replace the feature switches. Turning the comparison on loads the
    /// benchmark for the current period.
    pub async fn set_config(&self, config: ChartConfig) {
        let previous = self.chart_config.replace(config);
        self.notify_changed();
        if config.show_benchmark && !previous.show_benchmark {
            self.load_benchmark().await;
            self.notify_changed();
        }
    }

    pub async fn toggle_benchmark(&self) {
        let config = self.chart_config.get();
        self.set_config(ChartConfig { show_benchmark: !config.show_benchmark, ..config }).await;
    }

    /// Layout-only switch; the data and overlays stay as they are.
    pub fn toggle_fullscreen(&self) -> bool {
        let mut config = self.chart_config.get();
        config.fullscreen = !config.fullscreen;
        self.chart_config.set(config);
        self.notify_changed();
        config.fullscreen
    }

    pub fn set_viewport(&self, viewport: Option<Size>) {
        self.viewport.set(viewport);
        self.notify_changed();
    }

    pub fn set_pointer(&self, pointer: Option<Point>) {
        if self.pointer.replace(pointer) != pointer {
            self.notify_changed();
        }
    }

    async fn load_benchmark(&self) {
        let Some(period) = self.selected_period() else {
            return;
        };
        load_period(&self.benchmark, &self.source, period).await;
    }

    fn seed_live_price(&self) {
        let last_close = self.primary.borrow().displayed_series().and_then(|s| s.latest().map(|b| b.close()));
        if let Some(close) = last_close {
            self.live.seed(close);
        }
    }

    /// Apply one quote directly; used by hosts that push quotes themselves.
    pub fn push_quote(&self, quote: &Quote) {
        self.live.on_quote(quote);
    }

    /// Start consuming `quotes`, replacing any previous subscription.
    pub fn attach_quote_feed(&self, quotes: LocalBoxStream<'static, Result<Quote, ChartError>>) {
        if self.is_disposed() {
            return;
        }
        let handle = spawn_quote_subscription(quotes, Rc::clone(&self.live));
        if let Some(previous) = self.quote_subscription.borrow_mut().replace(handle) {
            previous.abort();
        }
    }

    fn detach_quote_feed(&self) {
        if let Some(handle) = self.quote_subscription.borrow_mut().take() {
            handle.abort();
        }
    }

    /// Switch the ticker: cached series, live price and the quote feed of the
    /// old symbol are dropped, then the current period is fetched again.
    pub async fn change_symbol(&self, symbol: Symbol) -> Option<ResolveOutcome> {
        if self.is_disposed() || self.symbol() == symbol {
            return None;
        }
        self.detach_quote_feed();
        self.live.reset();

        let selection = self.primary.borrow_mut().change_symbol(symbol);
        self.notify_changed();
        let outcome = self.fetch(&self.primary, Some(selection)).await;
        self.seed_live_price();
        self.notify_changed();
        outcome
    }

    pub fn statistics(&self) -> Option<SeriesStatistics> {
        let series = self.primary.borrow().displayed_series()?;
        MarketAnalysisService::statistics(&series, self.live.state().price)
    }

    pub fn dimensions(&self) -> ChartDimensions {
        ChartDimensions::resolve(&self.layout, &self.chart_config.get(), self.viewport.get())
    }

    pub fn render(&self) -> ChartRender {
        let config = self.chart_config.get();
        let series = self.primary.borrow().displayed_series();
        let load_state = self.load_state();

        let benchmark = if config.show_benchmark {
            let controller = self.benchmark.borrow();
            match controller.state() {
                LoadState::Loaded { period } if Some(*period) == self.selected_period() => {
                    controller.displayed_series()
                }
                _ => None,
            }
        } else {
            None
        };

        let overlays = match &series {
            Some(series) => OverlaySet::build(series, &config, benchmark.as_deref()),
            None => OverlaySet::default(),
        };
        let live = self.live.state();

        RenderChartUseCase::render(RenderInput {
            series: series.as_deref(),
            overlays: &overlays,
            live: &live,
            dimensions: self.dimensions(),
            pointer: self.pointer.get(),
            load_state: &load_state,
            desired_tick_count: self.desired_tick_count,
        })
    }

    pub fn dispose(&self) {
        get_logger().info(COMPONENT, &format!("disposing chart for {}", self.symbol()));
        self.detach_quote_feed();
        self.live.dispose();
        self.primary.borrow_mut().dispose();
        self.benchmark.borrow_mut().dispose();
        self.change_listener.borrow_mut().take();
    }
}
