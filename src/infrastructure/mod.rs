pub mod dto;
pub mod http;
pub mod services;
pub mod websocket;

pub use http::{QuotePoller, TickerApiClient};
pub use services::{BrowserTimeProvider, ConsoleLogger};
pub use websocket::QuoteSocket;
