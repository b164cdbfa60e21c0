//! Conversation domain model.
//!
//! This module contains the core Conversation entity and the request/response
//! shapes used when talking to the backend about conversations.

use super::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a conversation.
///
/// Transitions are forward-only: an `Active` conversation can become
/// `Completed` or `Archived`, but a finished conversation never goes back to
/// `Active`. State containers enforce this by ignoring backward writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationStatus {
    Active,
    Completed,
    Archived,
}

impl ConversationStatus {
    /// Returns true when moving from `self` to `next` is a legal transition.
    pub fn can_transition(self, next: ConversationStatus) -> bool {
        match self {
            ConversationStatus::Active => true,
            ConversationStatus::Completed | ConversationStatus::Archived => self == next,
        }
    }
}

/// A brainstorming thread between a user and one or more personas.
///
/// The embedded `messages` list is optional: list endpoints return
/// conversations without messages, while the by-id endpoint may embed a
/// snapshot. Consumers must treat an embedded snapshot as *partial* and merge
/// it into whatever they already hold rather than overwriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier (opaque string)
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Lifecycle status
    pub status: ConversationStatus,
    /// Persona identifiers participating in this conversation
    #[serde(default)]
    pub active_personas: Vec<String>,
    /// Persona currently holding the turn, if any
    #[serde(default)]
    pub current_speaker: Option<String>,
    /// Index into `active_personas` for sequential turn-taking
    #[serde(default)]
    pub turn_index: Option<u32>,
    /// Maximum number of discussion rounds
    #[serde(default)]
    pub max_rounds: u32,
    /// Rounds completed so far
    #[serde(default)]
    pub current_round: u32,
    /// Embedded message snapshot, when the endpoint provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    /// Timestamp when the conversation was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the conversation was last updated
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /conversations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub title: String,
    pub active_personas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_index: Option<u32>,
}

/// Request body for `PATCH /conversations/:id`.
///
/// All fields optional; only supplied fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_personas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
}

/// A page of results from a paginated list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Token-usage analytics for a conversation, as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAnalytics {
    pub id: String,
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub estimated_cost: f64,
    /// Message counts per persona identifier
    #[serde(default)]
    pub agent_participation: std::collections::HashMap<String, u64>,
}
