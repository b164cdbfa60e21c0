//! Wire protocol for the realtime channel.
//!
//! Frames are JSON envelopes `{ "event": <name>, "data": { ... } }`. Event
//! names are resolved against the configured [`EventNames`] surface, which
//! carries one current name plus legacy aliases per kind; split typing
//! start/stop names and the legacy combined form all decode to the same
//! [`ServerEvent::Typing`] variant.

use board_core::config::EventNames;
use board_core::error::{BoardError, Result};
use board_core::event::{ClientEvent, ServerEvent, TypingEvent};
use serde_json::{Value, json};

/// Decodes one incoming frame.
///
/// Returns `Ok(None)` for event names this client does not consume; malformed
/// envelopes or payloads produce an error the caller is expected to log and
/// drop (a bad frame must never take the connection down).
pub fn decode(names: &EventNames, raw: &str) -> Result<Option<ServerEvent>> {
    let envelope: Value = serde_json::from_str(raw)?;
    let Some(event_name) = envelope.get("event").and_then(Value::as_str) else {
        return Err(BoardError::realtime("frame has no event name"));
    };
    let data = envelope.get("data").cloned().unwrap_or(json!({}));

    let event = if event_name == names.typing {
        let payload: TypingEvent = serde_json::from_value(data)?;
        Some(ServerEvent::Typing(payload))
    } else if event_name == names.typing_start {
        let mut payload: TypingEvent = serde_json::from_value(data)?;
        payload.is_typing = Some(true);
        Some(ServerEvent::Typing(payload))
    } else if event_name == names.typing_stop {
        let mut payload: TypingEvent = serde_json::from_value(data)?;
        payload.is_typing = Some(false);
        Some(ServerEvent::Typing(payload))
    } else if event_name == names.stream {
        Some(ServerEvent::Stream(serde_json::from_value(data)?))
    } else if event_name == names.message
        || names.message_aliases.iter().any(|alias| alias == event_name)
    {
        Some(ServerEvent::Message(serde_json::from_value(data)?))
    } else if event_name == names.session_complete {
        Some(ServerEvent::SessionComplete(serde_json::from_value(data)?))
    } else if event_name == names.status_change {
        Some(ServerEvent::StatusChange(serde_json::from_value(data)?))
    } else if event_name == names.error {
        Some(ServerEvent::Error(serde_json::from_value(data)?))
    } else {
        None
    };

    Ok(event)
}

/// Encodes an outgoing client event into a text frame.
pub fn encode(names: &EventNames, event: &ClientEvent) -> Result<String> {
    let (name, payload) = match event {
        ClientEvent::JoinConversation(room) => (&names.join, serde_json::to_value(room)?),
        ClientEvent::LeaveConversation(room) => (&names.leave, serde_json::to_value(room)?),
    };
    let envelope = json!({ "event": name, "data": payload });
    Ok(envelope.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::event::RoomEvent;

    fn names() -> EventNames {
        EventNames::default()
    }

    #[test]
    fn test_decode_combined_typing() {
        let raw = r#"{"event":"agent_typing","data":{"agentType":"pm","isTyping":true}}"#;
        let event = decode(&names(), raw).unwrap().unwrap();
        let ServerEvent::Typing(typing) = event else {
            panic!("expected typing event");
        };
        assert_eq!(typing.persona_id.as_deref(), Some("pm"));
        assert_eq!(typing.is_typing, Some(true));
    }

    #[test]
    fn test_decode_split_typing_stop() {
        let raw = r#"{"event":"agent_typing_stop","data":{"personaId":"qa"}}"#;
        let event = decode(&names(), raw).unwrap().unwrap();
        let ServerEvent::Typing(typing) = event else {
            panic!("expected typing event");
        };
        assert_eq!(typing.is_typing, Some(false));
    }

    #[test]
    fn test_decode_message_alias() {
        let raw = r#"{"event":"agent_message_received","data":{"agentType":"pm","id":"f1","content":"hi"}}"#;
        let event = decode(&names(), raw).unwrap().unwrap();
        assert!(matches!(event, ServerEvent::Message(_)));
    }

    #[test]
    fn test_decode_stream_chunk() {
        let raw = r#"{"event":"agent_stream","data":{"agentType":"dev","chunk":"Let's","isComplete":false}}"#;
        let event = decode(&names(), raw).unwrap().unwrap();
        let ServerEvent::Stream(chunk) = event else {
            panic!("expected stream event");
        };
        assert_eq!(chunk.chunk.as_deref(), Some("Let's"));
        assert!(!chunk.is_complete);
    }

    #[test]
    fn test_unknown_event_is_skipped() {
        let raw = r#"{"event":"METRIC_UPDATE","data":{}}"#;
        assert!(decode(&names(), raw).unwrap().is_none());
    }

    #[test]
    fn test_missing_event_name_is_an_error() {
        let raw = r#"{"data":{}}"#;
        assert!(decode(&names(), raw).is_err());
    }

    #[test]
    fn test_encode_join_round_trips() {
        let event = ClientEvent::JoinConversation(RoomEvent {
            conversation_id: "c1".to_string(),
            user_id: None,
        });
        let raw = encode(&names(), &event).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["event"], "join_conversation");
        assert_eq!(value["data"]["conversationId"], "c1");
    }
}
