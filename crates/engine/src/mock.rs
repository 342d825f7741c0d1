//! In-memory messaging engine.
//!
//! Stands in for the real signing engine during development. Keys are
//! random 32-byte secrets with the public key derived as their SHA-256
//! digest; messages live in memory for the lifetime of the engine.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use emsg_protocol::Message;

use crate::engine::{EngineFuture, KeyPair, MessagingEngine, parse_address};
use crate::error::EngineError;

/// Length of a private key in bytes.
const PRIVATE_KEY_BYTES: usize = 32;

#[derive(Default)]
struct MockState {
    signer: Option<KeyPair>,
    messages: Vec<Message>,
}

/// In-memory [`MessagingEngine`].
#[derive(Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine whose store already holds a greeting and a system
    /// notice for `user`.
    pub fn with_sample_inbox(user: &str) -> Self {
        let engine = Self::new();
        engine.push(Message {
            id: uuid::Uuid::new_v4().to_string(),
            from: "alice@emsg".into(),
            to: user.into(),
            content: "Hello Bob!".into(),
            timestamp: Utc::now(),
            group: None,
            system: false,
        });
        engine.push(Message {
            id: uuid::Uuid::new_v4().to_string(),
            from: "system".into(),
            to: user.into(),
            content: "You joined the group.".into(),
            timestamp: Utc::now(),
            group: None,
            system: true,
        });
        engine
    }

    /// Stores a message as if it had arrived from the network.
    pub fn push(&self, message: Message) {
        self.lock().messages.push(message);
    }

    /// Returns the key pair loaded by `init_client`, if any.
    pub fn signer(&self) -> Option<KeyPair> {
        self.lock().signer.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn derive_key_pair(secret: &[u8]) -> KeyPair {
    KeyPair {
        private_key: hex::encode(secret),
        public_key: hex::encode(Sha256::digest(secret)),
    }
}

fn decode_private_key(private_hex: &str) -> Result<Vec<u8>, EngineError> {
    let bytes =
        hex::decode(private_hex.trim()).map_err(|e| EngineError::InvalidKey(e.to_string()))?;
    if bytes.len() != PRIVATE_KEY_BYTES {
        return Err(EngineError::InvalidKey(format!(
            "expected {PRIVATE_KEY_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

impl MessagingEngine for MockEngine {
    fn generate_key_pair(&self) -> EngineFuture<'_, KeyPair> {
        Box::pin(async move {
            let mut secret = [0u8; PRIVATE_KEY_BYTES];
            rand::thread_rng().fill_bytes(&mut secret);
            Ok(derive_key_pair(&secret))
        })
    }

    fn import_private_key(&self, private_hex: &str) -> EngineFuture<'_, KeyPair> {
        let decoded = decode_private_key(private_hex);
        Box::pin(async move { Ok(derive_key_pair(&decoded?)) })
    }

    fn init_client(&self, private_hex: &str) -> EngineFuture<'_, ()> {
        let decoded = decode_private_key(private_hex);
        Box::pin(async move {
            let pair = derive_key_pair(&decoded?);
            debug!(public_key = %pair.public_key, "mock engine initialized");
            self.lock().signer = Some(pair);
            Ok(())
        })
    }

    fn send_message(&self, from: &str, to: &str, content: &str) -> EngineFuture<'_, Message> {
        let from = from.to_string();
        let to = to.to_string();
        let content = content.to_string();
        Box::pin(async move {
            parse_address(&from)?;
            parse_address(&to)?;

            let mut state = self.lock();
            if state.signer.is_none() {
                return Err(EngineError::NotInitialized);
            }
            let message = Message {
                id: uuid::Uuid::new_v4().to_string(),
                from,
                to,
                content,
                timestamp: Utc::now(),
                group: None,
                system: false,
            };
            debug!(id = %message.id, to = %message.to, "mock engine stored message");
            state.messages.push(message.clone());
            Ok(message)
        })
    }

    fn get_messages(&self, address: &str) -> EngineFuture<'_, Vec<Message>> {
        let address = address.to_string();
        Box::pin(async move {
            let state = self.lock();
            Ok(state
                .messages
                .iter()
                .filter(|m| m.involves(&address))
                .cloned()
                .collect())
        })
    }
}
