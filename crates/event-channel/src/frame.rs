//! Inbound frame pipeline: decode, validate, filter.

use std::collections::HashSet;

use serde_json::Value;

use emsg_protocol::ChannelEvent;
use emsg_protocol::constants::WS_MAX_MESSAGE_SIZE;

use crate::error::ChannelError;

/// Reason reported for frames that decode but do not carry a usable `type`.
pub const MALFORMED_EVENT: &str = "malformed event";

/// Turns one inbound text frame into a [`ChannelEvent`].
///
/// Fails with [`ChannelError::MalformedFrame`] if the frame is not JSON or
/// lacks a non-empty string `type`, and with [`ChannelError::RejectedType`]
/// if `allowed_types` is set and does not contain the type.
pub fn decode_frame(
    text: &str,
    allowed_types: Option<&HashSet<String>>,
) -> Result<ChannelEvent, ChannelError> {
    if text.len() > WS_MAX_MESSAGE_SIZE {
        return Err(ChannelError::MalformedFrame(format!(
            "frame too large ({} bytes)",
            text.len()
        )));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| ChannelError::MalformedFrame(format!("invalid JSON: {e}")))?;
    let event = validate_event(value)?;

    if let Some(allowed) = allowed_types
        && !allowed.contains(&event.event_type)
    {
        return Err(ChannelError::RejectedType(event.event_type));
    }

    Ok(event)
}

fn validate_event(value: Value) -> Result<ChannelEvent, ChannelError> {
    let has_type = value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    if !has_type {
        return Err(ChannelError::MalformedFrame(MALFORMED_EVENT.into()));
    }
    serde_json::from_value(value).map_err(|_| ChannelError::MalformedFrame(MALFORMED_EVENT.into()))
}
