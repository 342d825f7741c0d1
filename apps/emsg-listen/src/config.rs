//! Listener configuration.
//!
//! Configuration is stored as TOML next to the client settings:
//! - Linux: `~/.config/emsg/listen.toml`
//! - Windows: `%APPDATA%/emsg/listen.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use emsg_event_channel::{ChannelConfig, ReconnectConfig};
use emsg_protocol::constants::RECONNECT_DELAY;
use serde::{Deserialize, Serialize};

/// Listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Channel address. Empty means `wss://<home domain>/ws`.
    #[serde(default)]
    pub address: String,

    /// Authentication token appended to the address.
    #[serde(default)]
    pub token: String,

    /// Event types to deliver. Empty means all.
    #[serde(default)]
    pub allowed_types: Vec<String>,

    /// Recipient for stdin lines. Empty broadcasts them.
    #[serde(default)]
    pub default_recipient: String,

    /// Delay between reconnect attempts, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_reconnect_delay_ms() -> u64 {
    RECONNECT_DELAY.as_millis() as u64
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            token: String::new(),
            allowed_types: Vec::new(),
            default_recipient: String::new(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl ListenConfig {
    /// Loads configuration from the default path, writing defaults if absent.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = ListenConfig::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // May contain the auth token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Resolves the address to connect to.
    pub fn resolve_address(&self, home_domain: &str) -> String {
        if self.address.trim().is_empty() {
            format!("wss://{home_domain}/ws")
        } else {
            self.address.trim().to_string()
        }
    }

    pub fn channel_config(&self) -> ChannelConfig {
        let mut config = ChannelConfig::default();
        if !self.token.is_empty() {
            config = config.with_token(self.token.clone());
        }
        if !self.allowed_types.is_empty() {
            config = config.with_allowed_types(self.allowed_types.iter().cloned());
        }
        config
    }

    pub fn reconnect_config(&self) -> ReconnectConfig {
        ReconnectConfig {
            delay: Duration::from_millis(self.reconnect_delay_ms),
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    emsg_engine::config_dir()
        .map(|d| d.join("emsg").join("listen.toml"))
        .ok_or_else(|| anyhow::anyhow!("no user config directory"))
}
