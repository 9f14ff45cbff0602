use crate::domain::{
    errors::ChartError,
    logging::{LogComponent, get_logger},
    market_data::{Quote, Symbol, repositories::QuoteFeed},
};
use crate::infrastructure::dto::parse_quote_response;
use futures::stream::{self, LocalBoxStream, StreamExt};
use gloo_net::websocket::{Message, futures::WebSocket};

const COMPONENT: LogComponent = LogComponent::Infrastructure("QuoteSocket");

/// Quote feed backed by a WebSocket carrying the price endpoint's JSON.
///
/// `url_template` may contain `{symbol}`. Unreadable messages are skipped;
/// a transport error ends the stream and no reconnect is attempted.
#[derive(Debug, Clone)]
pub struct QuoteSocket {
    url_template: String,
}

impl QuoteSocket {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self { url_template: url_template.into() }
    }

    pub fn url_for(&self, symbol: &Symbol) -> String {
        self.url_template.replace("{symbol}", symbol.value())
    }
}

/// Decode one text frame; `None` for frames that carry no quote.
pub fn decode_frame(frame: &str) -> Option<Quote> {
    match parse_quote_response(frame) {
        Ok(quote) => Some(quote),
        Err(e) => {
            get_logger().debug(COMPONENT, &format!("ignoring frame: {e}"));
            None
        }
    }
}

impl QuoteFeed for QuoteSocket {
    fn subscribe(&self, symbol: &Symbol) -> LocalBoxStream<'static, Result<Quote, ChartError>> {
        let url = self.url_for(symbol);
        get_logger().info(COMPONENT, &format!("connecting to {url}"));

        let socket = match WebSocket::open(&url) {
            Ok(socket) => socket,
            Err(e) => {
                let error = ChartError::Stream(format!("failed to open {url}: {e}"));
                return stream::once(async move { Err(error) }).boxed_local();
            }
        };

        socket
            .scan(false, |closed, message| {
                let item = if *closed {
                    None
                } else {
                    match message {
                        Ok(Message::Text(text)) => Some(decode_frame(&text).map(Ok)),
                        Ok(Message::Bytes(_)) => Some(None),
                        Err(e) => {
                            *closed = true;
                            Some(Some(Err(ChartError::Stream(e.to_string()))))
                        }
                    }
                };
                futures::future::ready(item)
            })
            .filter_map(futures::future::ready)
            .boxed_local()
    }
}
