//! Real-time event channel for EMSG clients.
//!
//! [`ConnectionManager`] keeps one WebSocket alive against an address,
//! reconnecting after a fixed delay whenever it drops. [`EventChannelClient`]
//! layers token injection, inbound frame validation, type filtering and
//! send gating on top of it.

pub mod address;
pub mod client;
pub mod error;
pub mod frame;
pub mod manager;
pub(crate) mod reconnection;
pub mod transport;
pub mod types;

pub(crate) mod pumps {
    pub(crate) mod read;
    pub(crate) mod write;
}

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ChannelConfig, ChannelHandle, ChannelListener, EventChannelClient};
pub use error::ChannelError;
pub use manager::{CloseHandle, ConnectionManager};
pub use transport::{Connector, Frame, FrameHandler, WsConnector};
pub use types::{ConnectionState, ReconnectConfig, SendOutcome};

pub use emsg_protocol::ChannelEvent;
