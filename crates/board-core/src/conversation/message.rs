//! Message types.
//!
//! A message is either authored by the user or by a persona (an "agent").
//! Message identity is the sole de-duplication key across every ingestion
//! path: two messages carrying the same identifier are the same logical
//! message, and the later write wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for client-generated temporary identifiers (optimistic inserts).
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Prefix for the synthetic per-persona entry that renders an in-progress
/// streamed response before the authoritative message arrives.
pub const STREAMING_ID_PREFIX: &str = "streaming-";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageRole {
    User,
    Agent,
}

/// Structured annotation a persona may attach to its response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredOutput {
    pub reasoning: String,
    pub confidence: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// An uploaded file linked to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    #[serde(default)]
    pub public_url: Option<String>,
}

/// A single message in a conversation.
///
/// The identifier is optional because some backend revisions emit payloads
/// without one; such messages are never merged with (or allowed to
/// overwrite) an identified message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Opaque identifier; may be temporary (`local-…`) before the server
    /// assigns one, or absent entirely on degraded payloads.
    #[serde(default)]
    pub id: Option<String>,
    /// The role of the message author.
    pub role: MessageRole,
    /// Originating persona identifier; required when `role` is `Agent`.
    #[serde(default, rename = "agentType", alias = "personaId")]
    pub persona_id: Option<String>,
    /// Textual content. Mutable only while the message is streaming.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<StructuredOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Builds an optimistic user message with a temporary client identifier.
    ///
    /// The temporary identifier is replaced by the server's identifier once
    /// the send operation resolves.
    pub fn local_user(content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Some(format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4())),
            role: MessageRole::User,
            persona_id: None,
            content: content.into(),
            structured_output: None,
            round_number: None,
            attachments: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Builds the synthetic in-progress entry for a persona's streamed
    /// response. Its derived identifier is stable per persona so successive
    /// chunks update the same entry.
    pub fn streaming_placeholder(persona_id: &str) -> Self {
        Self {
            id: Some(streaming_id(persona_id)),
            role: MessageRole::Agent,
            persona_id: Some(persona_id.to_string()),
            content: String::new(),
            structured_output: None,
            round_number: None,
            attachments: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    /// True when this message carries a client-generated temporary id.
    pub fn is_local(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| id.starts_with(LOCAL_ID_PREFIX))
    }

    /// True for the synthetic streaming entry of any persona.
    pub fn is_streaming_placeholder(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| id.starts_with(STREAMING_ID_PREFIX))
    }
}

/// Derived identifier of the streaming placeholder for `persona_id`.
pub fn streaming_id(persona_id: &str) -> String {
    format!("{STREAMING_ID_PREFIX}{persona_id}")
}

/// Request body for `POST /conversations/:id/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
}

/// Request body for `POST /orchestration/conversations/:id/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMessageRequest {
    pub message: String,
}

/// Response of the orchestration process endpoint: the agent messages the
/// backend produced synchronously, as a fallback for the realtime channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedMessages {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Message>,
    #[serde(default)]
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_user_message_has_temporary_id() {
        let message = Message::local_user("hello");
        assert!(message.is_local());
        assert_eq!(message.role, MessageRole::User);
    }

    #[test]
    fn test_persona_id_accepts_both_field_spellings() {
        let current: Message =
            serde_json::from_str(r#"{"role":"AGENT","agentType":"pm","content":"hi"}"#).unwrap();
        let legacy: Message =
            serde_json::from_str(r#"{"role":"AGENT","personaId":"pm","content":"hi"}"#).unwrap();
        assert_eq!(current.persona_id.as_deref(), Some("pm"));
        assert_eq!(legacy.persona_id.as_deref(), Some("pm"));
    }

    #[test]
    fn test_message_without_id_deserializes() {
        let message: Message =
            serde_json::from_str(r#"{"role":"USER","content":"hi"}"#).unwrap();
        assert!(message.id.is_none());
        assert!(!message.is_local());
    }
}
