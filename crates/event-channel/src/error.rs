//! Error types for the event channel.

/// Errors surfaced by the event channel.
///
/// None of these are fatal: transport errors are followed by an automatic
/// reconnect and frame errors only cost the offending frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    MalformedFrame(String),

    #[error("rejected event type: {0}")]
    RejectedType(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to encode message: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ChannelError {
    fn from(e: serde_json::Error) -> Self {
        ChannelError::Encode(e.to_string())
    }
}

impl ChannelError {
    /// Returns `true` for errors tied to a single inbound frame.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            ChannelError::MalformedFrame(_) | ChannelError::RejectedType(_)
        )
    }
}
