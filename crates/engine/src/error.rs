//! Error types for engine and settings operations.

/// Errors reported by a [`MessagingEngine`](crate::MessagingEngine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("client not initialized; import or generate a key first")]
    NotInitialized,

    #[error("engine error: {0}")]
    Engine(String),
}

/// Errors from settings persistence.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
