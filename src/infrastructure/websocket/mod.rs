//! Push-based live quote feed over a WebSocket.

pub mod quote_socket;

pub use quote_socket::*;
