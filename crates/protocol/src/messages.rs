use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message as stored by the messaging engine and pushed in
/// `new_message` / `group_message` event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub system: bool,
}

impl Message {
    /// Returns `true` if this message belongs to the given group chat.
    pub fn is_group_of(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }

    /// Returns `true` if `address` sent or received this message.
    pub fn involves(&self, address: &str) -> bool {
        self.from == address || self.to == address
    }
}

/// Outbound chat frame sent through the event channel.
///
/// The channel passes outbound frames through uninterpreted; this is the
/// shape the EMSG client itself sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub frame_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub content: String,
}

impl OutboundMessage {
    /// Frame type used for all outbound chat frames.
    pub const FRAME_TYPE: &'static str = "message";

    /// A message for a single recipient.
    pub fn direct(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            frame_type: Self::FRAME_TYPE.into(),
            to: Some(to.into()),
            group: None,
            content: content.into(),
        }
    }

    /// A message for a group chat.
    pub fn group(group: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            frame_type: Self::FRAME_TYPE.into(),
            to: None,
            group: Some(group.into()),
            content: content.into(),
        }
    }

    /// A message with no explicit recipient; the server routes it.
    pub fn broadcast(content: impl Into<String>) -> Self {
        Self {
            frame_type: Self::FRAME_TYPE.into(),
            to: None,
            group: None,
            content: content.into(),
        }
    }
}

fn is_false(v: &bool) -> bool {
    !v
}
