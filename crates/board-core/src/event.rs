//! Realtime event vocabulary.
//!
//! Typed payloads for the backend's push channel. Wire *names* vary across
//! backend revisions and are resolved by the transport layer against
//! [`crate::config::EventNames`]; the payload shapes here tolerate the field
//! spellings of every observed revision (`agentType` vs `personaId`, nested
//! vs flat message bodies) so a single vocabulary covers all of them.

use crate::conversation::{Conversation, ConversationStatus, Message, MessageRole};
use serde::{Deserialize, Serialize};

/// Semantic kinds a handler can be registered for.
///
/// Split typing start/stop wire events and the legacy combined form all
/// resolve to [`EventKind::Typing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Typing,
    Stream,
    Message,
    SessionComplete,
    StatusChange,
    Error,
}

impl EventKind {
    /// All kinds, for bulk handler registration/removal.
    pub const ALL: [EventKind; 6] = [
        EventKind::Typing,
        EventKind::Stream,
        EventKind::Message,
        EventKind::SessionComplete,
        EventKind::StatusChange,
        EventKind::Error,
    ];
}

/// A persona started or stopped producing a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingEvent {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default, rename = "agentType", alias = "personaId")]
    pub persona_id: Option<String>,
    #[serde(default, rename = "agentName")]
    pub persona_name: Option<String>,
    /// Absent on split start/stop events; the transport fills it in from the
    /// wire name. Legacy combined events carry it explicitly.
    #[serde(default)]
    pub is_typing: Option<bool>,
}

/// An incremental fragment of a persona's in-progress response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunkEvent {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default, rename = "agentType", alias = "personaId")]
    pub persona_id: Option<String>,
    #[serde(default)]
    pub chunk: Option<String>,
    /// Terminates the stream for this persona. Does not finalize a message;
    /// finalization is a separate event.
    #[serde(default)]
    pub is_complete: bool,
}

/// The authoritative, complete version of a persona's message.
///
/// Some revisions nest the full message under `message`, others flatten id
/// and content onto the event body; [`AgentMessageEvent::into_message`]
/// normalizes both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessageEvent {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default, rename = "agentType", alias = "personaId")]
    pub persona_id: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AgentMessageEvent {
    /// The message identifier, from either payload shape.
    pub fn message_id(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.id.as_deref())
            .or(self.id.as_deref())
    }

    /// Normalizes the event into a [`Message`], filling the persona id from
    /// the event body when the nested message lacks one.
    pub fn into_message(self) -> Message {
        let persona_id = self
            .message
            .as_ref()
            .and_then(|m| m.persona_id.clone())
            .or(self.persona_id);
        match self.message {
            Some(mut message) => {
                message.persona_id = persona_id;
                message
            }
            None => Message {
                id: self.id,
                role: MessageRole::Agent,
                persona_id,
                content: self.content.unwrap_or_default(),
                structured_output: None,
                round_number: None,
                attachments: None,
                created_at: self.created_at,
                updated_at: self.created_at,
            },
        }
    }
}

/// The orchestration session for a conversation has finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompleteEvent {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub conversation: Option<Conversation>,
}

/// Legacy status broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeEvent {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub status: ConversationStatus,
}

/// Generic error pushed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    #[serde(default)]
    pub message: Option<String>,
}

/// Every event the backend can push to this client.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    Typing(TypingEvent),
    Stream(StreamChunkEvent),
    Message(AgentMessageEvent),
    SessionComplete(SessionCompleteEvent),
    StatusChange(StatusChangeEvent),
    Error(ErrorEvent),
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::Typing(_) => EventKind::Typing,
            ServerEvent::Stream(_) => EventKind::Stream,
            ServerEvent::Message(_) => EventKind::Message,
            ServerEvent::SessionComplete(_) => EventKind::SessionComplete,
            ServerEvent::StatusChange(_) => EventKind::StatusChange,
            ServerEvent::Error(_) => EventKind::Error,
        }
    }
}

/// Events this client emits to the backend over the realtime channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEvent {
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    JoinConversation(RoomEvent),
    LeaveConversation(RoomEvent),
}
