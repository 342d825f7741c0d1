//! Public types for the event channel.

use std::time::Duration;

use emsg_protocol::constants::RECONNECT_DELAY;

/// Observable state of the underlying socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connection attempt is in flight.
    Connecting,
    /// Handshake complete; frames flow both ways.
    Open,
    /// Socket is gone. A reconnect is pending unless the channel was closed.
    Closed,
    /// The transport reported a failure. A close always follows.
    Error,
}

impl ConnectionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Error => "error",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handing a frame to the channel.
///
/// Frames are never queued: anything sent while the socket is not open is
/// dropped and reported as [`SendOutcome::Rejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Rejected,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        self == SendOutcome::Sent
    }
}

/// Configuration for automatic reconnection.
///
/// The retry policy is a fixed delay with no backoff and no attempt cap.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay between a disconnect and the next connection attempt.
    pub delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: RECONNECT_DELAY,
        }
    }
}
