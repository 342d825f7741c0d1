//! Socket transport seam.
//!
//! [`ConnectionManager`](crate::ConnectionManager) only sees a split
//! sink/stream pair produced by a [`Connector`], so the reconnect state
//! machine can be driven by an in-memory transport in tests.

use std::future::Future;
use std::pin::Pin;

use futures_util::{Sink, Stream, StreamExt};
use tokio_tungstenite::tungstenite;

/// Outbound half of a connected socket.
pub type FrameSink = Pin<Box<dyn Sink<tungstenite::Message, Error = tungstenite::Error> + Send>>;

/// Inbound half of a connected socket.
pub type FrameStream =
    Pin<Box<dyn Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Send>>;

/// A boxed future resolving to a connected socket.
pub type ConnectFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(FrameSink, FrameStream), tungstenite::Error>> + Send + 'a>>;

/// Opens duplex sockets.
pub trait Connector: Send + Sync + 'static {
    /// Performs the handshake against `url`.
    fn connect(&self, url: &str) -> ConnectFuture<'_>;
}

/// [`Connector`] backed by `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &str) -> ConnectFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            // Ignored if a provider is already installed.
            let _ = rustls::crypto::ring::default_provider().install_default();
            let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
            let (write, read) = ws_stream.split();
            Ok((Box::pin(write) as FrameSink, Box::pin(read) as FrameStream))
        })
    }
}

/// A data frame read off the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    Text(&'a str),
    Binary(&'a [u8]),
}

/// Receives what the socket produces.
///
/// Both methods are called from the connection task, one at a time and in
/// arrival order.
pub trait FrameHandler: Send + Sync + 'static {
    /// Called for each data frame.
    fn on_frame(&self, frame: Frame<'_>);

    /// Called when a connection attempt or a live socket fails.
    fn on_transport_error(&self, reason: &str);
}
