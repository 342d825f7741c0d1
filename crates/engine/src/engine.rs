//! Messaging engine boundary.
//!
//! Key generation, import and message cryptography live in an external
//! engine. The trait mirrors its surface so the client can be wired to the
//! real engine or to [`MockEngine`](crate::MockEngine).

use std::future::Future;
use std::pin::Pin;

use emsg_protocol::Message;

use crate::error::EngineError;

/// A boxed future returned by engine methods.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, EngineError>> + Send + 'a>>;

/// Hex-encoded key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: String,
    pub public_key: String,
}

/// Signing and messaging engine.
pub trait MessagingEngine: Send + Sync {
    /// Generates a fresh key pair.
    fn generate_key_pair(&self) -> EngineFuture<'_, KeyPair>;

    /// Derives the key pair for an existing hex-encoded private key.
    fn import_private_key(&self, private_hex: &str) -> EngineFuture<'_, KeyPair>;

    /// Loads the private key used to sign outgoing messages.
    fn init_client(&self, private_hex: &str) -> EngineFuture<'_, ()>;

    /// Signs and sends a message. Returns the message as stored.
    fn send_message(&self, from: &str, to: &str, content: &str) -> EngineFuture<'_, Message>;

    /// Returns the messages sent to or from `address`, oldest first.
    fn get_messages(&self, address: &str) -> EngineFuture<'_, Vec<Message>>;
}

/// Splits an EMSG address into `(user, domain)`.
///
/// Both `user@domain` and `user#domain` are accepted.
pub fn parse_address(address: &str) -> Result<(&str, &str), EngineError> {
    let (user, domain) = address
        .split_once('#')
        .or_else(|| address.split_once('@'))
        .ok_or_else(|| EngineError::InvalidAddress(format!("{address}: missing domain")))?;
    if user.is_empty() || domain.is_empty() {
        return Err(EngineError::InvalidAddress(format!(
            "{address}: empty user or domain"
        )));
    }
    Ok((user, domain))
}
