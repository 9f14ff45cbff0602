//! Per-symbol, per-period cache of fetched bar series and the state machine
//! that decides which fetch responses may change what is on screen.

use crate::domain::{
    errors::{ChartError, ChartResult},
    logging::{LogComponent, LogLevel, get_logger},
    market_data::{BarSeries, Period, Symbol, repositories::ChartDataSource},
};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const COMPONENT: LogComponent = LogComponent::Application("ChartDataController");

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading { period: Period },
    Loaded { period: Period },
    Failed { period: Period, error: ChartError },
}

#[derive(Debug, Clone)]
pub struct ChartCacheEntry {
    pub series: Rc<BarSeries>,
    pub fetched_at: DateTime<Utc>,
    request_id: u64,
}

/// Issued for every network request; carries what the response must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub symbol: Symbol,
    pub period: Period,
    request_id: u64,
    epoch: u64,
}

impl FetchTicket {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSelection {
    /// Served from cache, state is already `Loaded`.
    Cached,
    /// Same period is in flight; no new request.
    AlreadyLoading,
    /// Caller must fetch and hand the result to `resolve`.
    Fetch(FetchTicket),
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Applied,
    Stale,
    Disposed,
}

#[derive(Debug)]
pub struct ChartDataController {
    symbol: Symbol,
    selected: Option<Period>,
    state: LoadState,
    cache: HashMap<Period, ChartCacheEntry>,
    displayed: Option<Rc<BarSeries>>,
    in_flight: HashMap<Period, u64>,
    next_request_id: u64,
    epoch: u64,
    disposed: bool,
}

impl ChartDataController {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            selected: None,
            state: LoadState::Idle,
            cache: HashMap::new(),
            displayed: None,
            in_flight: HashMap::new(),
            next_request_id: 0,
            epoch: 0,
            disposed: false,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn selected_period(&self) -> Option<Period> {
        self.selected
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Series currently on screen. Survives a failed refetch.
    pub fn displayed_series(&self) -> Option<Rc<BarSeries>> {
        self.displayed.clone()
    }

    pub fn error(&self) -> Option<&ChartError> {
        match &self.state {
            LoadState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn cached(&self, period: Period) -> Option<&ChartCacheEntry> {
        self.cache.get(&period)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn select_period(&mut self, period: Period) -> PeriodSelection {
        if self.disposed {
            return PeriodSelection::Disposed;
        }
        self.selected = Some(period);

        if let Some(entry) = self.cache.get(&period) {
            self.in_flight.remove(&period);
            self.displayed = Some(Rc::clone(&entry.series));
            self.state = LoadState::Loaded { period };
            get_logger().debug(COMPONENT, &format!("cache hit {} {period}", self.symbol));
            return PeriodSelection::Cached;
        }

        if self.in_flight.contains_key(&period) {
            self.state = LoadState::Loading { period };
            return PeriodSelection::AlreadyLoading;
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.in_flight.insert(period, request_id);
        self.state = LoadState::Loading { period };

        get_logger().log_with_metadata(
            LogLevel::Info,
            COMPONENT,
            "fetching series",
            &format!("symbol={} period={period} request={request_id}", self.symbol),
        );

        PeriodSelection::Fetch(FetchTicket {
            symbol: self.symbol.clone(),
            period,
            request_id,
            epoch: self.epoch,
        })
    }

    /// Apply a fetch result. Responses from a superseded symbol are dropped;
    /// successful responses for this symbol are cached even when their period
    /// is no longer selected, but only touch the screen if it still is.
    pub fn resolve(&mut self, ticket: FetchTicket, result: ChartResult<BarSeries>) -> ResolveOutcome {
        if self.disposed {
            return ResolveOutcome::Disposed;
        }
        if ticket.epoch != self.epoch {
            get_logger().debug(COMPONENT, &format!("dropping response for old symbol {}", ticket.symbol));
            return ResolveOutcome::Stale;
        }

        let is_selected = self.selected == Some(ticket.period);
        let is_latest = self.in_flight.get(&ticket.period) == Some(&ticket.request_id);
        if is_latest {
            self.in_flight.remove(&ticket.period);
        }

        match result {
            Ok(series) => {
                let newer = self.cache.get(&ticket.period).is_none_or(|e| e.request_id < ticket.request_id);
                if !newer {
                    return ResolveOutcome::Stale;
                }
                let series = Rc::new(series);
                self.cache.insert(
                    ticket.period,
                    ChartCacheEntry { series: Rc::clone(&series), fetched_at: Utc::now(), request_id: ticket.request_id },
                );
                get_logger().log_with_metadata(
                    LogLevel::Info,
                    COMPONENT,
                    "series cached",
                    &format!("period={} bars={} request={}", ticket.period, series.len(), ticket.request_id),
                );

                if !is_selected {
                    return ResolveOutcome::Stale;
                }
                self.displayed = Some(series);
                self.state = LoadState::Loaded { period: ticket.period };
                ResolveOutcome::Applied
            }
            Err(error) => {
                if !(is_selected && is_latest) || self.cache.contains_key(&ticket.period) {
                    return ResolveOutcome::Stale;
                }
                get_logger().warn(COMPONENT, &format!("fetch {} {} failed: {error}", ticket.symbol, ticket.period));
                self.state = LoadState::Failed { period: ticket.period, error };
                ResolveOutcome::Applied
            }
        }
    }

    /// Switch to another symbol. The cache is cleared, in-flight requests are
    /// invalidated and the current period is selected again.
    pub fn change_symbol(&mut self, symbol: Symbol) -> PeriodSelection {
        if self.disposed {
            return PeriodSelection::Disposed;
        }
        get_logger().info(COMPONENT, &format!("symbol {} -> {symbol}", self.symbol));
        let period = self.selected.unwrap_or_default();
        self.reset();
        self.symbol = symbol;
        self.select_period(period)
    }

    pub fn dispose(&mut self) {
        self.reset();
        self.selected = None;
        self.disposed = true;
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.cache.clear();
        self.displayed = None;
        self.in_flight.clear();
        self.state = LoadState::Idle;
    }
}

/// Select `period` and, when that needs the network, fetch and resolve it.
/// Returns `None` when no request was issued.
pub async fn load_period<S: ChartDataSource>(
    controller: &Rc<RefCell<ChartDataController>>,
    source: &S,
    period: Period,
) -> Option<ResolveOutcome> {
    let selection = controller.borrow_mut().select_period(period);
    match selection {
        PeriodSelection::Fetch(ticket) => Some(run_fetch(controller, source, ticket).await),
        _ => None,
    }
}

/// Execute a ticket. No borrow of the controller is held across the await.
pub async fn run_fetch<S: ChartDataSource>(
    controller: &Rc<RefCell<ChartDataController>>,
    source: &S,
    ticket: FetchTicket,
) -> ResolveOutcome {
    let result = source.fetch_series(&ticket.symbol, ticket.period).await;
    controller.borrow_mut().resolve(ticket, result)
}
