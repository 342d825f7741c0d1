use std::time::Duration;

/// Delay between a disconnect and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Query parameter carrying the auth token on the connection address.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Maximum inbound frame size in bytes (1 MB).
pub const WS_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Capacity of the per-socket outbound frame queue.
pub const WS_WRITE_QUEUE: usize = 256;

/// Event types the EMSG server is known to push.
///
/// The channel itself accepts any non-empty type string; this enum only
/// names the ones the client has a use for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewMessage,
    GroupMessage,
    System,
}

impl EventKind {
    /// All known kinds, in wire order.
    pub const ALL: [EventKind; 3] = [
        EventKind::NewMessage,
        EventKind::GroupMessage,
        EventKind::System,
    ];

    /// Returns the `type` string used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::NewMessage => "new_message",
            EventKind::GroupMessage => "group_message",
            EventKind::System => "system",
        }
    }

    /// Looks up a kind by its wire string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_wire_names() {
        assert_eq!(EventKind::NewMessage.as_str(), "new_message");
        assert_eq!(EventKind::GroupMessage.as_str(), "group_message");
        assert_eq!(EventKind::System.to_string(), "system");
    }

    #[test]
    fn event_kind_parse() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("presence"), None);
        assert_eq!(EventKind::parse(""), None);
    }

    #[test]
    fn reconnect_delay_is_two_seconds() {
        assert_eq!(RECONNECT_DELAY, Duration::from_secs(2));
    }
}
