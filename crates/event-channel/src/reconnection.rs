//! Connection state machine and the reconnect loop.
//!
//! One task per channel runs [`connection_loop`]: connect, pump frames
//! until the socket goes away, wait the reconnect delay, repeat. Every
//! state change goes through [`transition`]; the delay is the only timer
//! and it is cancelled together with the socket when the owner closes
//! the channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tracing::{debug, info, warn};

use emsg_protocol::constants::WS_WRITE_QUEUE;

use crate::address::display_endpoint;
use crate::manager::Shared;
use crate::pumps::read::{ReadOutcome, read_pump};
use crate::pumps::write::write_pump;
use crate::transport::{Connector, FrameHandler, FrameSink, FrameStream};
use crate::types::{ConnectionState, ReconnectConfig};

/// Transport signals driving [`ConnectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// A connection attempt is starting.
    Attempt,
    /// The handshake succeeded.
    Opened,
    /// The transport reported an error.
    Failed,
    /// The socket is gone.
    Disconnected,
}

/// The transition table. `None` means the signal is ignored in `from`.
pub(crate) fn transition(from: ConnectionState, signal: Signal) -> Option<ConnectionState> {
    use crate::types::ConnectionState::*;

    match (from, signal) {
        (Connecting | Closed, Signal::Attempt) => Some(Connecting),
        (Connecting, Signal::Opened) => Some(Open),
        (_, Signal::Failed) => Some(Error),
        (Connecting | Open | Error, Signal::Disconnected) => Some(Closed),
        _ => None,
    }
}

/// Runs connect/reconnect cycles until the channel is terminated.
pub(crate) async fn connection_loop(
    url: String,
    connector: Arc<dyn Connector>,
    config: ReconnectConfig,
    shared: Arc<Shared>,
    handler: Arc<dyn FrameHandler>,
) {
    let endpoint = display_endpoint(&url);
    let cancel = shared.cancel.clone();
    let mut attempt: u64 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        shared.apply(Signal::Attempt);
        debug!(%endpoint, attempt, "connecting");

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = connector.connect(&url) => result,
        };

        match connected {
            Ok((sink, stream)) => {
                info!(%endpoint, attempt, "channel open");
                match run_socket(sink, stream, &shared, handler.as_ref()).await {
                    ReadOutcome::Cancelled => break,
                    ReadOutcome::Closed => {
                        info!(%endpoint, "channel closed");
                        shared.apply(Signal::Disconnected);
                    }
                    ReadOutcome::Failed(reason) => {
                        report_failure(&shared, handler.as_ref(), &reason);
                    }
                }
            }
            Err(e) => {
                warn!(%endpoint, attempt, error = %e, "connection attempt failed");
                report_failure(&shared, handler.as_ref(), &e.to_string());
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        info!(
            %endpoint,
            delay_ms = config.delay.as_millis() as u64,
            "reconnecting"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%endpoint, "reconnect cancelled");
                break;
            }
            _ = tokio::time::sleep(config.delay) => {}
        }
    }

    debug!(%endpoint, "connection loop stopped");
}

/// Drives one live socket until it goes away.
async fn run_socket(
    sink: FrameSink,
    stream: FrameStream,
    shared: &Shared,
    handler: &dyn FrameHandler,
) -> ReadOutcome {
    let (write_tx, write_rx) = mpsc::channel::<tungstenite::Message>(WS_WRITE_QUEUE);
    let socket_cancel = shared.cancel.child_token();
    let writer = tokio::spawn(write_pump(sink, write_rx, socket_cancel.clone()));

    // Writer goes in before the state flips so a send observing `Open`
    // always finds a queue.
    shared.set_writer(Some(write_tx));
    shared.apply(Signal::Opened);

    let outcome = read_pump(stream, handler, &shared.cancel).await;

    shared.set_writer(None);
    socket_cancel.cancel();
    match writer.await {
        Ok(written) => debug!(written, "socket writer finished"),
        Err(e) => warn!("write pump panicked: {e}"),
    }
    outcome
}

/// Reports a transport failure as `Error` followed by `Closed`.
fn report_failure(shared: &Shared, handler: &dyn FrameHandler, reason: &str) {
    if shared.is_terminated() {
        return;
    }
    shared.apply(Signal::Failed);
    handler.on_transport_error(reason);
    shared.apply(Signal::Disconnected);
}
