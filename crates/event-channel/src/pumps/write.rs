//! Outbound half of a live socket.

use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

/// Drains the outbound queue into the socket.
///
/// Stops when `cancel` fires or the queue closes, finishing with a close
/// frame, or when a write fails. Returns the number of frames written.
pub(crate) async fn write_pump<S>(
    mut sink: S,
    mut queue: mpsc::Receiver<Message>,
    cancel: CancellationToken,
) -> usize
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let mut written = 0usize;
    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            frame = queue.recv() => frame,
        };
        let Some(frame) = frame else { break };

        if let Err(e) = sink.send(frame).await {
            warn!(error = %e, written, "socket write failed");
            return written;
        }
        written += 1;
    }

    trace!(written, "write pump stopping");
    if let Err(e) = sink.send(Message::Close(None)).await {
        trace!(error = %e, "close frame not sent");
    }
    written
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use futures_util::sink;

    fn recording_sink(
        tx: mpsc::UnboundedSender<Message>,
    ) -> impl Sink<Message, Error = tungstenite::Error> + Unpin {
        Box::pin(sink::unfold(tx, |tx, msg: Message| async move {
            let _ = tx.send(msg);
            Ok::<_, tungstenite::Error>(tx)
        }))
    }

    #[tokio::test]
    async fn forwards_in_order_then_closes() {
        let (sink_tx, mut sink_rx) = mpsc::unbounded_channel();
        let (queue_tx, queue_rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let pump = tokio::spawn(write_pump(recording_sink(sink_tx), queue_rx, cancel.clone()));

        for text in ["one", "two", "three"] {
            queue_tx.send(Message::Text(text.to_string().into())).await.unwrap();
        }
        for expected in ["one", "two", "three"] {
            match sink_rx.recv().await.unwrap() {
                Message::Text(t) => assert_eq!(t.as_str(), expected),
                other => panic!("expected text frame, got {other:?}"),
            }
        }

        cancel.cancel();
        assert_eq!(pump.await.unwrap(), 3);
        assert!(matches!(sink_rx.recv().await, Some(Message::Close(None))));
    }

    #[tokio::test]
    async fn stops_when_queue_closes() {
        let (sink_tx, mut sink_rx) = mpsc::unbounded_channel();
        let (queue_tx, queue_rx) = mpsc::channel(16);
        drop(queue_tx);

        let written = tokio::time::timeout(
            Duration::from_secs(2),
            write_pump(recording_sink(sink_tx), queue_rx, CancellationToken::new()),
        )
        .await
        .expect("should stop");

        assert_eq!(written, 0);
        assert!(matches!(sink_rx.recv().await, Some(Message::Close(_))));
    }
}
