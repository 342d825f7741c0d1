//! Inbound half of a live socket.

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::transport::{Frame, FrameHandler};

/// Why the read pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    /// The channel was closed by its owner.
    Cancelled,
    /// The peer closed the socket or the stream ended.
    Closed,
    /// The socket failed.
    Failed(String),
}

/// Reads frames from the socket and dispatches them to `handler`.
///
/// Cancellation is checked before every read, so a handler that closes the
/// channel never sees another frame.
pub(crate) async fn read_pump<S>(
    mut read: S,
    handler: &dyn FrameHandler,
    cancel: &CancellationToken,
) -> ReadOutcome
where
    S: StreamExt<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => return ReadOutcome::Cancelled,

            msg = read.next() => {
                match msg {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        trace!(len = text.len(), "received text frame");
                        handler.on_frame(Frame::Text(text.as_str()));
                    }
                    Some(Ok(tungstenite::Message::Binary(data))) => {
                        trace!(len = data.len(), "received binary frame");
                        handler.on_frame(Frame::Binary(&data));
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        trace!("received ping");
                    }
                    Some(Ok(tungstenite::Message::Pong(_))) => {
                        trace!("received pong");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        debug!(?frame, "received close frame");
                        return ReadOutcome::Closed;
                    }
                    Some(Ok(tungstenite::Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket read error: {e}");
                        return ReadOutcome::Failed(e.to_string());
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        return ReadOutcome::Closed;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHandler;
    use futures_util::stream;

    fn text(s: &str) -> Result<tungstenite::Message, tungstenite::Error> {
        Ok(tungstenite::Message::Text(s.to_string().into()))
    }

    #[tokio::test]
    async fn dispatches_frames_in_order() {
        let handler = RecordingHandler::default();
        let cancel = CancellationToken::new();
        let frames = stream::iter(vec![
            text("first"),
            Ok(tungstenite::Message::Ping(vec![1].into())),
            text("second"),
            Ok(tungstenite::Message::Binary(vec![0xde, 0xad].into())),
        ]);

        let outcome = read_pump(frames, &handler, &cancel).await;

        assert_eq!(outcome, ReadOutcome::Closed);
        assert_eq!(handler.texts(), vec!["first", "second"]);
        assert_eq!(handler.binary_count(), 1);
    }

    #[tokio::test]
    async fn close_frame_ends_pump() {
        let handler = RecordingHandler::default();
        let cancel = CancellationToken::new();
        let frames = stream::iter(vec![
            Ok(tungstenite::Message::Close(None)),
            text("never delivered"),
        ]);

        let outcome = read_pump(frames, &handler, &cancel).await;

        assert_eq!(outcome, ReadOutcome::Closed);
        assert!(handler.texts().is_empty());
    }

    #[tokio::test]
    async fn read_error_is_reported_as_failure() {
        let handler = RecordingHandler::default();
        let cancel = CancellationToken::new();
        let frames = stream::iter(vec![Err(tungstenite::Error::ConnectionClosed)]);

        let outcome = read_pump(frames, &handler, &cancel).await;

        assert!(matches!(outcome, ReadOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn cancelled_pump_stops_reading() {
        let handler = RecordingHandler::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let frames = stream::iter(vec![text("dropped")]);

        let outcome = read_pump(frames, &handler, &cancel).await;

        assert_eq!(outcome, ReadOutcome::Cancelled);
        assert!(handler.texts().is_empty());
    }

    #[tokio::test]
    async fn pending_stream_waits_for_cancel() {
        let handler = RecordingHandler::default();
        let cancel = CancellationToken::new();
        let frames = stream::pending::<Result<tungstenite::Message, tungstenite::Error>>();

        let c = cancel.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            c.cancel();
        });

        let outcome = read_pump(frames, &handler, &cancel).await;
        assert_eq!(outcome, ReadOutcome::Cancelled);
    }
}
