//! Drives the live price reducer from a quote stream and owns the single
//! pending flash-reversion timer.

use crate::domain::{
    errors::ChartError,
    logging::{LogComponent, get_logger},
    market_data::{LivePriceReducer, LivePriceState, Quote},
};
use futures::future::{AbortHandle, Abortable};
use futures::stream::{LocalBoxStream, StreamExt};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const COMPONENT: LogComponent = LogComponent::Application("LivePrice");

pub const DEFAULT_FLASH_DURATION_MS: u32 = 1000;

/// One-shot timers. Dropping a handle cancels its callback.
pub trait FlashScheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers via `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooFlashScheduler;

impl FlashScheduler for GlooFlashScheduler {
    type Handle = gloo_timers::callback::Timeout;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle {
        gloo_timers::callback::Timeout::new(delay_ms, callback)
    }
}

pub type PriceListener = Rc<dyn Fn(&LivePriceState)>;

pub struct LivePriceService<T: FlashScheduler> {
    reducer: Rc<RefCell<LivePriceReducer>>,
    scheduler: T,
    pending: RefCell<Option<T::Handle>>,
    listener: Rc<RefCell<Option<PriceListener>>>,
    flash_duration_ms: u32,
    disposed: Cell<bool>,
}

impl<T: FlashScheduler> LivePriceService<T> {
    pub fn new(scheduler: T, flash_duration_ms: u32) -> Self {
        Self {
            reducer: Rc::new(RefCell::new(LivePriceReducer::new())),
            scheduler,
            pending: RefCell::new(None),
            listener: Rc::new(RefCell::new(None)),
            flash_duration_ms,
            disposed: Cell::new(false),
        }
    }

    pub fn state(&self) -> LivePriceState {
        self.reducer.borrow().state().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn has_pending_flash(&self) -> bool {
        self.reducer.borrow().pending().is_some()
    }

    /// Called after every visible change, including the flash reverting.
    pub fn set_listener(&self, listener: PriceListener) {
        *self.listener.borrow_mut() = Some(listener);
    }

    /// Use `last_close` as the comparison base until the first quote arrives.
    pub fn seed(&self, last_close: f64) {
        let mut reducer = self.reducer.borrow_mut();
        if reducer.state().price.is_none() {
            *reducer = LivePriceReducer::seeded(last_close);
        }
    }

    pub fn on_quote(&self, quote: &Quote) {
        if self.disposed.get() {
            return;
        }
        crate::log_trace!(COMPONENT, "quote {} at {}", quote.price, quote.last_updated);
        let ticket = self.reducer.borrow_mut().apply(quote);

        if let Some(ticket) = ticket {
            let reducer = Rc::clone(&self.reducer);
            let listener = Rc::clone(&self.listener);
            let handle = self.scheduler.schedule(
                self.flash_duration_ms,
                Box::new(move || {
                    let reverted = reducer.borrow_mut().revert_flash(ticket);
                    if reverted {
                        let state = reducer.borrow().state().clone();
                        notify(&listener, &state);
                    }
                }),
            );
            // replacing the handle cancels the superseded reversion
            self.pending.borrow_mut().replace(handle);
        }

        notify(&self.listener, &self.state());
    }

    /// Forget the previous symbol's price and any running flash.
    pub fn reset(&self) {
        self.pending.borrow_mut().take();
        *self.reducer.borrow_mut() = LivePriceReducer::new();
        notify(&self.listener, &self.state());
    }

    pub fn dispose(&self) {
        self.disposed.set(true);
        self.pending.borrow_mut().take();
        self.reducer.borrow_mut().cancel_pending();
        self.listener.borrow_mut().take();
    }
}

fn notify(listener: &Rc<RefCell<Option<PriceListener>>>, state: &LivePriceState) {
    let current = listener.borrow().clone();
    if let Some(callback) = current {
        callback(state);
    }
}

/// Feed quotes into `service` in arrival order. The first stream error ends
/// the subscription; the last price stays on screen.
pub async fn pump_quotes<T: FlashScheduler>(
    mut quotes: LocalBoxStream<'static, Result<Quote, ChartError>>,
    service: Rc<LivePriceService<T>>,
) {
    while let Some(item) = quotes.next().await {
        if service.is_disposed() {
            break;
        }
        match item {
            Ok(quote) => service.on_quote(&quote),
            Err(error) => {
                get_logger().warn(COMPONENT, &format!("quote stream stopped: {error}"));
                break;
            }
        }
    }
}

/// Run `pump_quotes` on the browser event loop; abort the handle to stop it.
pub fn spawn_quote_subscription<T: FlashScheduler + 'static>(
    quotes: LocalBoxStream<'static, Result<Quote, ChartError>>,
    service: Rc<LivePriceService<T>>,
) -> AbortHandle {
    let (handle, registration) = AbortHandle::new_pair();
    wasm_bindgen_futures::spawn_local(async move {
        if Abortable::new(pump_quotes(quotes, service), registration).await.is_err() {
            get_logger().debug(COMPONENT, "quote subscription aborted");
        }
    });
    handle
}
