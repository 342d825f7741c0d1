//! EMSG event channel listener.
//!
//! Opens a channel, prints every delivered event as one JSON line on stdout
//! and forwards stdin lines as outbound chat frames. A line of the form
//! `/group <name> <text>` is sent to a group chat.

mod config;

use anyhow::Context;
use emsg_engine::{DEFAULT_DOMAIN, SettingsStore};
use emsg_event_channel::{
    ChannelError, ChannelEvent, ChannelHandle, ChannelListener, EventChannelClient,
};
use emsg_protocol::OutboundMessage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ListenConfig;

struct PrintListener;

impl ChannelListener for PrintListener {
    fn on_event(&self, event: ChannelEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "failed to print event"),
        }
    }

    fn on_error(&self, error: &ChannelError) {
        warn!(%error, "channel error");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "starting emsg-listen");

    let config = ListenConfig::load().context("loading configuration")?;
    let domain = match SettingsStore::open_default() {
        Ok(settings) => settings.domain(),
        Err(e) => {
            warn!(error = %e, "settings unavailable, using default domain");
            DEFAULT_DOMAIN.to_string()
        }
    };
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.resolve_address(&domain));

    let client = EventChannelClient::new().with_reconnect_config(config.reconnect_config());
    let handle = client
        .open(&address, PrintListener, config.channel_config())
        .with_context(|| format!("opening channel to {address}"))?;

    let mut states = handle.subscribe_state();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            info!(%state, "connection state changed");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => forward_line(&handle, &config, &line)?,
                None => {
                    info!("stdin closed");
                    break;
                }
            },
        }
    }

    handle.close();
    if let Some(error) = handle.last_error() {
        info!(%error, "last channel error");
    }
    Ok(())
}

fn forward_line(handle: &ChannelHandle, config: &ListenConfig, line: &str) -> anyhow::Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let message = match line.strip_prefix("/group ") {
        Some(rest) => match rest.trim().split_once(' ') {
            Some((group, text)) => OutboundMessage::group(group, text.trim()),
            None => {
                warn!("usage: /group <name> <text>");
                return Ok(());
            }
        },
        None if !config.default_recipient.is_empty() => {
            OutboundMessage::direct(config.default_recipient.clone(), line)
        }
        None => OutboundMessage::broadcast(line),
    };

    if !handle.send(&message)?.is_sent() {
        warn!(state = %handle.state(), "channel not open, message dropped");
    }
    Ok(())
}
