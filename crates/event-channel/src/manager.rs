//! Connection manager owning one socket lifecycle.
//!
//! Activating a manager spawns the connection task immediately; the
//! manager then reconnects after [`ReconnectConfig::delay`] whenever the
//! socket drops, until [`ConnectionManager::terminate`] is called.
//! A terminated manager cannot be restarted; activate a new one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::reconnection::{Signal, connection_loop, transition};
use crate::transport::{Connector, FrameHandler};
use crate::types::{ConnectionState, ReconnectConfig, SendOutcome};

/// State shared between the manager and its connection task.
pub(crate) struct Shared {
    state_tx: watch::Sender<ConnectionState>,
    /// Queue of the live socket's write pump, if one is open.
    writer: Mutex<Option<mpsc::Sender<tungstenite::Message>>>,
    terminated: AtomicBool,
    pub(crate) cancel: CancellationToken,
}

impl Shared {
    fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        Self {
            state_tx,
            writer: Mutex::new(None),
            terminated: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Applies a transport signal. Returns `true` if the state changed.
    ///
    /// Signals arriving after termination are dropped.
    pub(crate) fn apply(&self, signal: Signal) -> bool {
        self.state_tx.send_if_modified(|state| {
            if self.terminated.load(Ordering::Acquire) {
                return false;
            }
            match transition(*state, signal) {
                Some(next) if next != *state => {
                    trace!(from = %state, to = %next, ?signal, "state transition");
                    *state = next;
                    true
                }
                Some(_) => false,
                None => {
                    debug!(state = %state, ?signal, "ignoring signal");
                    false
                }
            }
        })
    }

    pub(crate) fn set_writer(&self, writer: Option<mpsc::Sender<tungstenite::Message>>) {
        *self.writer.lock().unwrap_or_else(PoisonError::into_inner) = writer;
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn send(&self, frame: String) -> SendOutcome {
        if self.is_terminated() || self.state() != ConnectionState::Open {
            trace!(state = %self.state(), "dropping outbound frame, channel not open");
            return SendOutcome::Rejected;
        }

        let guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(writer) = guard.as_ref() else {
            return SendOutcome::Rejected;
        };
        match writer.try_send(tungstenite::Message::Text(frame.into())) {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                warn!("dropping outbound frame: {e}");
                SendOutcome::Rejected
            }
        }
    }

    /// Cancels the pending reconnect, requests the socket to close and
    /// freezes the state at [`ConnectionState::Closed`].
    fn terminate(&self) -> bool {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.cancel.cancel();
        self.set_writer(None);
        self.state_tx.send_replace(ConnectionState::Closed);
        true
    }
}

/// Manages the socket lifecycle for a single address.
pub struct ConnectionManager {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl ConnectionManager {
    /// Starts connecting to `url` right away.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn activate(
        url: impl Into<String>,
        connector: Arc<dyn Connector>,
        config: ReconnectConfig,
        handler: Arc<dyn FrameHandler>,
    ) -> Self {
        let shared = Arc::new(Shared::new());
        let task = tokio::spawn(connection_loop(
            url.into(),
            connector,
            config,
            shared.clone(),
            handler,
        ));
        Self { shared, task }
    }

    /// Returns the current connection state.
    pub fn current_state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Queues a text frame on the live socket.
    ///
    /// Returns [`SendOutcome::Rejected`] without side effects unless the
    /// state is [`ConnectionState::Open`].
    pub fn send(&self, frame: impl Into<String>) -> SendOutcome {
        self.shared.send(frame.into())
    }

    /// Stops the manager. Idempotent; safe from inside frame callbacks.
    pub fn terminate(&self) {
        if self.shared.terminate() {
            debug!("connection manager terminated");
        }
    }

    /// Returns a cloneable handle that can terminate this manager.
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.shared.is_terminated()
    }

    /// Returns `true` while the connection task (and with it any socket or
    /// pending reconnect timer) is still alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.shared.terminate();
    }
}

/// Terminates a [`ConnectionManager`] from elsewhere, e.g. from inside a
/// listener reacting to an event.
#[derive(Clone)]
pub struct CloseHandle {
    shared: Arc<Shared>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.shared.terminate();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_terminated()
    }
}

impl std::fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloseHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}
