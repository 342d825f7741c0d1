//! In-memory transport for driving the connection task in tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::{sink, stream};
use tokio::sync::{Notify, mpsc};
use tokio_tungstenite::tungstenite;

use crate::transport::{ConnectFuture, Connector, Frame, FrameHandler, FrameSink, FrameStream};

/// What the next connection attempt does.
pub(crate) enum Step {
    Accept,
    Refuse,
}

/// Server side of an accepted in-memory socket.
pub(crate) struct ServerEnd {
    inbound: mpsc::UnboundedSender<Result<tungstenite::Message, tungstenite::Error>>,
    pub(crate) outbound: mpsc::UnboundedReceiver<tungstenite::Message>,
}

impl ServerEnd {
    pub(crate) fn push_text(&self, text: &str) {
        let _ = self
            .inbound
            .send(Ok(tungstenite::Message::Text(text.to_string().into())));
    }

    pub(crate) fn push_binary(&self, data: &[u8]) {
        let _ = self
            .inbound
            .send(Ok(tungstenite::Message::Binary(data.to_vec().into())));
    }

    /// Makes the client's next read fail.
    pub(crate) fn fail(&self) {
        let _ = self.inbound.send(Err(tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ))));
    }
}

/// Observers for a [`ScriptedConnector`].
pub(crate) struct Harness {
    /// URL of every connection attempt, in order.
    pub(crate) attempts: mpsc::UnboundedReceiver<String>,
    /// Server end of every accepted socket.
    pub(crate) servers: mpsc::UnboundedReceiver<ServerEnd>,
}

/// Connector following a fixed script. Once the script runs out, attempts
/// never complete.
pub(crate) struct ScriptedConnector {
    script: Mutex<VecDeque<Step>>,
    attempts_tx: mpsc::UnboundedSender<String>,
    servers_tx: mpsc::UnboundedSender<ServerEnd>,
}

pub(crate) fn scripted(
    steps: impl IntoIterator<Item = Step>,
) -> (Arc<ScriptedConnector>, Harness) {
    let (attempts_tx, attempts) = mpsc::unbounded_channel();
    let (servers_tx, servers) = mpsc::unbounded_channel();
    let connector = ScriptedConnector {
        script: Mutex::new(steps.into_iter().collect()),
        attempts_tx,
        servers_tx,
    };
    (Arc::new(connector), Harness { attempts, servers })
}

impl Connector for ScriptedConnector {
    fn connect(&self, url: &str) -> ConnectFuture<'_> {
        let _ = self.attempts_tx.send(url.to_string());
        let step = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            match step {
                Some(Step::Accept) => {
                    let (sink, stream, server) = socket_pair();
                    let _ = self.servers_tx.send(server);
                    Ok((sink, stream))
                }
                Some(Step::Refuse) => Err(tungstenite::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
                None => std::future::pending().await,
            }
        })
    }
}

fn socket_pair() -> (FrameSink, FrameStream, ServerEnd) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<tungstenite::Message>();

    let stream = stream::unfold(inbound_rx, |mut rx| async move {
        rx.recv().await.map(|msg| (msg, rx))
    });
    let sink = sink::unfold(outbound_tx, |tx, msg: tungstenite::Message| async move {
        tx.send(msg)
            .map_err(|_| tungstenite::Error::ConnectionClosed)?;
        Ok::<_, tungstenite::Error>(tx)
    });

    let server = ServerEnd {
        inbound: inbound_tx,
        outbound: outbound_rx,
    };
    (
        Box::pin(sink) as FrameSink,
        Box::pin(stream) as FrameStream,
        server,
    )
}

/// [`FrameHandler`] that records everything it is given.
#[derive(Default)]
pub(crate) struct RecordingHandler {
    texts: Mutex<Vec<String>>,
    binary: Mutex<usize>,
    errors: Mutex<Vec<String>>,
    notify: Notify,
}

impl RecordingHandler {
    pub(crate) fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub(crate) fn binary_count(&self) -> usize {
        *self.binary.lock().unwrap()
    }

    pub(crate) fn transport_errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub(crate) async fn wait_for_texts(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.texts.lock().unwrap().len() >= n {
                return;
            }
            notified.await;
        }
    }
}

impl FrameHandler for RecordingHandler {
    fn on_frame(&self, frame: Frame<'_>) {
        match frame {
            Frame::Text(text) => self.texts.lock().unwrap().push(text.to_string()),
            Frame::Binary(_) => *self.binary.lock().unwrap() += 1,
        }
        self.notify.notify_waiters();
    }

    fn on_transport_error(&self, reason: &str) {
        self.errors.lock().unwrap().push(reason.to_string());
    }
}
