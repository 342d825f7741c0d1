use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::EventKind;

/// One inbound unit pushed by the server.
///
/// `type` is the only field the channel interprets. `payload` is carried
/// through untouched, and any other top-level field ends up in `extra` so
/// the decoded event re-serializes to the frame that was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChannelEvent {
    /// Creates an event with the given type and payload.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            extra: Map::new(),
        }
    }

    /// Returns the well-known kind of this event, if any.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.event_type)
    }

    /// Deserializes the payload into the given type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
