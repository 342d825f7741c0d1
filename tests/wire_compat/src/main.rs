fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;

    use emsg_event_channel::ChannelError;
    use emsg_event_channel::frame::{MALFORMED_EVENT, decode_frame};
    use emsg_protocol::{EventKind, Message, OutboundMessage};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture file as raw frame text.
    fn load_frame(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&load_frame(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Decodes a fixture frame and checks the event re-serializes to the
    /// same JSON (order-independent comparison).
    fn passthrough_test(name: &str) -> emsg_protocol::ChannelEvent {
        let event = decode_frame(&load_frame(name), None)
            .unwrap_or_else(|e| panic!("failed to decode {name}: {e}"));
        let reserialized = serde_json::to_value(&event).unwrap();
        assert_eq!(
            load_fixture(name),
            reserialized,
            "passthrough mismatch for {name}"
        );
        event
    }

    fn allow(types: &[&str]) -> HashSet<String> {
        types.iter().map(|t| t.to_string()).collect()
    }

    // --- Inbound events ---

    #[test]
    fn fixture_new_message() {
        let event = passthrough_test("new_message.json");
        assert_eq!(event.kind(), Some(EventKind::NewMessage));

        let msg: Message = event.parse_payload().unwrap();
        assert_eq!(msg.from, "alice@emsg");
        assert_eq!(msg.content, "Hello Bob!");
        assert!(msg.group.is_none());
        assert!(!msg.system);
    }

    #[test]
    fn fixture_group_message() {
        let event = passthrough_test("group_message.json");
        assert_eq!(event.kind(), Some(EventKind::GroupMessage));

        let msg: Message = event.parse_payload().unwrap();
        assert!(msg.is_group_of("team"));
        assert!(!msg.is_group_of("other"));
    }

    #[test]
    fn fixture_system_keeps_extra_fields() {
        let event = passthrough_test("system.json");
        assert_eq!(event.kind(), Some(EventKind::System));
        assert_eq!(event.extra["seq"], 42);
        assert_eq!(event.extra["server"], "relay-eu-1");

        let msg: Message = event.parse_payload().unwrap();
        assert!(msg.system);
    }

    #[test]
    fn fixture_unknown_type_is_delivered_without_filter() {
        let event = passthrough_test("unknown_type.json");
        assert_eq!(event.event_type, "presence");
        assert_eq!(event.kind(), None);
    }

    // --- Validation ---

    #[test]
    fn fixtures_without_usable_type_are_malformed() {
        for name in ["missing_type.json", "empty_type.json", "numeric_type.json"] {
            let err = decode_frame(&load_frame(name), None).unwrap_err();
            assert_eq!(
                err,
                ChannelError::MalformedFrame(MALFORMED_EVENT.into()),
                "unexpected result for {name}"
            );
        }
    }

    #[test]
    fn whitelist_filters_fixtures() {
        let allowed = allow(&["new_message", "system"]);

        assert!(decode_frame(&load_frame("new_message.json"), Some(&allowed)).is_ok());
        assert!(decode_frame(&load_frame("system.json"), Some(&allowed)).is_ok());
        assert_eq!(
            decode_frame(&load_frame("group_message.json"), Some(&allowed)).unwrap_err(),
            ChannelError::RejectedType("group_message".into())
        );
    }

    #[test]
    fn malformed_check_precedes_whitelist() {
        let allowed = allow(&["new_message"]);
        let err = decode_frame(&load_frame("missing_type.json"), Some(&allowed)).unwrap_err();
        assert!(matches!(err, ChannelError::MalformedFrame(_)));
    }

    // --- Outbound frames ---

    #[test]
    fn fixture_outbound_direct() {
        let msg = OutboundMessage::direct("bob@emsg", "Hi there");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            load_fixture("outbound_direct.json")
        );
    }

    #[test]
    fn fixture_outbound_group() {
        let msg = OutboundMessage::group("team", "Morning all");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            load_fixture("outbound_group.json")
        );
    }
}
