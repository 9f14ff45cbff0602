//! Live quote reducer: merges real-time quotes into the displayed price and
//! decides when the price flash starts and ends.

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

/// One real-time quote as delivered by the quote feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    /// Milliseconds since epoch, as reported by the backend.
    pub last_updated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum FlashColor {
    #[default]
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LivePriceState {
    pub price: Option<f64>,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub last_updated: Option<i64>,
    pub flash_color: FlashColor,
}

/// Identifies the flash a reversion timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashTicket(u64);

/// Pure state machine; timers live in the application layer.
#[derive(Debug, Clone, Default)]
pub struct LivePriceReducer {
    state: LivePriceState,
    generation: u64,
    pending: Option<FlashTicket>,
}

impl LivePriceReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known price (typically the last close) so the first quote
    /// already flashes relative to it.
    pub fn seeded(price: f64) -> Self {
        Self {
            state: LivePriceState { price: Some(price), ..LivePriceState::default() },
            ..Self::default()
        }
    }

    pub fn state(&self) -> &LivePriceState {
        &self.state
    }

    pub fn pending(&self) -> Option<FlashTicket> {
        self.pending
    }

    /// Apply a quote. Returns a ticket when a new flash started; the caller
    /// must schedule `revert_flash(ticket)` and drop any earlier timer.
    pub fn apply(&mut self, quote: &Quote) -> Option<FlashTicket> {
        let flash = match self.state.price {
            Some(previous) if quote.price > previous => Some(FlashColor::Up),
            Some(previous) if quote.price < previous => Some(FlashColor::Down),
            _ => None,
        };

        self.state.price = Some(quote.price);
        self.state.change = quote.change;
        self.state.change_percent = quote.change_percent;
        self.state.volume = quote.volume;
        self.state.last_updated = Some(quote.last_updated);

        let color = flash?;
        self.state.flash_color = color;
        self.generation += 1;
        let ticket = FlashTicket(self.generation);
        self.pending = Some(ticket);
        Some(ticket)
    }

    /// Timer callback. Only the most recent ticket clears the flash, and only
    /// once; returns whether the state changed.
    pub fn revert_flash(&mut self, ticket: FlashTicket) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.state.flash_color = FlashColor::None;
        true
    }

    /// Drop any pending reversion and clear the flash (teardown).
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.state.flash_color = FlashColor::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: f64) -> Quote {
        Quote { price, change: 0.0, change_percent: 0.0, volume: 0, last_updated: 0 }
    }

    #[test]
    fn first_unseeded_quote_does_not_flash() {
        let mut reducer = LivePriceReducer::new();
        assert!(reducer.apply(&quote(10.0)).is_none());
        assert_eq!(reducer.state().flash_color, FlashColor::None);
        assert_eq!(reducer.state().price, Some(10.0));
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut reducer = LivePriceReducer::seeded(100.0);
        let first = reducer.apply(&quote(105.0)).unwrap();
        let second = reducer.apply(&quote(98.0)).unwrap();

        assert!(!reducer.revert_flash(first));
        assert_eq!(reducer.state().flash_color, FlashColor::Down);
        assert!(reducer.revert_flash(second));
        assert!(!reducer.revert_flash(second));
        assert_eq!(reducer.state().flash_color, FlashColor::None);
    }

    #[test]
    fn unchanged_price_updates_fields_only() {
        let mut reducer = LivePriceReducer::seeded(100.0);
        let ticket = reducer.apply(&quote(101.0));
        let same = Quote { volume: 77, ..quote(101.0) };
        assert!(reducer.apply(&same).is_none());
        assert_eq!(reducer.state().volume, 77);
        assert_eq!(reducer.pending(), ticket);
        assert_eq!(reducer.state().flash_color, FlashColor::Up);
    }
}
