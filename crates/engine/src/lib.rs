//! Collaborators of the EMSG event channel.
//!
//! The signing/messaging engine owns key material and message storage; the
//! client only talks to it through [`MessagingEngine`]. [`MockEngine`] is
//! an in-memory implementation for development and tests.
//! [`SettingsStore`] persists client preferences such as the home domain.

pub mod engine;
pub mod error;
pub mod mock;
pub mod settings;

pub use engine::{EngineFuture, KeyPair, MessagingEngine, parse_address};
pub use error::{EngineError, SettingsError};
pub use mock::MockEngine;
pub use settings::{DEFAULT_DOMAIN, DOMAIN_KEY, SettingsStore, config_dir, default_settings_path};
