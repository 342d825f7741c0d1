//! Caller-facing event channel.
//!
//! [`EventChannelClient::open`] validates the address, appends the auth
//! token and activates a [`ConnectionManager`]. Every inbound text frame is
//! decoded and validated before it reaches [`ChannelListener::on_event`];
//! frames that fail are reported through [`ChannelListener::on_error`] and
//! dropped while the channel keeps running.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, trace, warn};

use emsg_protocol::ChannelEvent;

use crate::address::{connection_url, display_endpoint};
use crate::error::ChannelError;
use crate::frame::decode_frame;
use crate::manager::{CloseHandle, ConnectionManager};
use crate::transport::{Connector, Frame, FrameHandler, WsConnector};
use crate::types::{ConnectionState, ReconnectConfig, SendOutcome};

/// Receives what a channel delivers.
///
/// Calls happen on the channel's connection task, one at a time and in
/// arrival order. Closing the channel from inside a callback is allowed.
pub trait ChannelListener: Send + Sync + 'static {
    /// Called once per validated inbound event.
    fn on_event(&self, event: ChannelEvent);

    /// Called for transport failures and for every dropped frame.
    fn on_error(&self, error: &ChannelError) {
        let _ = error;
    }
}

impl<F> ChannelListener for F
where
    F: Fn(ChannelEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: ChannelEvent) {
        self(event)
    }
}

/// Per-channel settings. Fixed for the lifetime of the channel; open a new
/// channel to change the token or the filter.
#[derive(Clone, Default)]
pub struct ChannelConfig {
    /// Sent as the `token` query parameter on the connection address.
    pub auth_token: Option<String>,
    /// Event types to deliver. `None` delivers every type.
    pub allowed_types: Option<HashSet<String>>,
}

impl ChannelConfig {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

impl std::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("allowed_types", &self.allowed_types)
            .finish()
    }
}

/// Opens event channels.
#[derive(Clone)]
pub struct EventChannelClient {
    connector: Arc<dyn Connector>,
    reconnect: ReconnectConfig,
}

impl Default for EventChannelClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannelClient {
    /// Creates a client that connects with `tokio-tungstenite`.
    pub fn new() -> Self {
        Self::with_connector(Arc::new(WsConnector))
    }

    /// Creates a client using a custom transport.
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn with_reconnect_config(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Opens a channel to `address` and starts connecting immediately.
    ///
    /// Must be called from within a Tokio runtime. Fails only if `address`
    /// is not a `ws://` or `wss://` URL.
    pub fn open(
        &self,
        address: &str,
        listener: impl ChannelListener,
        config: ChannelConfig,
    ) -> Result<ChannelHandle, ChannelError> {
        let url = connection_url(address, config.auth_token.as_deref())?;
        info!(
            endpoint = %display_endpoint(url.as_str()),
            authenticated = config.auth_token.is_some(),
            filtered = config.allowed_types.is_some(),
            "opening event channel"
        );

        let inbound = Arc::new(Inbound {
            listener: Box::new(listener),
            allowed_types: config.allowed_types,
            last_error: Mutex::new(None),
        });
        let manager = ConnectionManager::activate(
            url.as_str(),
            self.connector.clone(),
            self.reconnect.clone(),
            inbound.clone(),
        );

        Ok(ChannelHandle { manager, inbound })
    }
}

/// Handle to an open channel. Dropping it closes the channel.
pub struct ChannelHandle {
    manager: ConnectionManager,
    inbound: Arc<Inbound>,
}

impl ChannelHandle {
    /// Closes the channel. Idempotent; safe before the socket ever opened.
    pub fn close(&self) {
        self.manager.terminate();
    }

    /// Returns a cloneable handle that can close this channel, e.g. from
    /// inside its listener.
    pub fn close_handle(&self) -> CloseHandle {
        self.manager.close_handle()
    }

    /// Serializes `message` and writes it to the socket.
    ///
    /// Returns [`SendOutcome::Rejected`] when the channel is not open. The
    /// message is not queued; retrying is up to the caller.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<SendOutcome, ChannelError> {
        if self.manager.current_state() != ConnectionState::Open {
            trace!("channel not open, send dropped");
            return Ok(SendOutcome::Rejected);
        }
        let frame = serde_json::to_string(message)?;
        Ok(self.manager.send(frame))
    }

    /// Current socket state. Informational; [`send`](Self::send) re-checks
    /// the live state itself.
    pub fn state(&self) -> ConnectionState {
        self.manager.current_state()
    }

    /// Subscribes to state changes, e.g. for a connectivity indicator.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.manager.subscribe()
    }

    /// The most recent transport or frame error, if any.
    pub fn last_error(&self) -> Option<ChannelError> {
        self.inbound
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.manager.is_terminated()
    }

    /// Returns `true` while a socket or reconnect timer may still be alive.
    pub fn is_active(&self) -> bool {
        self.manager.is_running()
    }
}

/// Inbound side of a channel: validation, filtering and delivery.
struct Inbound {
    listener: Box<dyn ChannelListener>,
    allowed_types: Option<HashSet<String>>,
    last_error: Mutex<Option<ChannelError>>,
}

impl Inbound {
    fn report(&self, error: ChannelError) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error.clone());
        self.listener.on_error(&error);
    }
}

impl FrameHandler for Inbound {
    fn on_frame(&self, frame: Frame<'_>) {
        let decoded = match frame {
            Frame::Text(text) => decode_frame(text, self.allowed_types.as_ref()),
            Frame::Binary(data) => Err(ChannelError::MalformedFrame(format!(
                "unexpected binary frame ({} bytes)",
                data.len()
            ))),
        };

        match decoded {
            Ok(event) => {
                trace!(event_type = %event.event_type, "delivering event");
                self.listener.on_event(event);
            }
            Err(error) => {
                warn!(%error, "dropping inbound frame");
                self.report(error);
            }
        }
    }

    fn on_transport_error(&self, reason: &str) {
        self.report(ChannelError::Transport(reason.to_string()));
    }
}
