//! Conversation state container.

use board_core::conversation::{Conversation, Message};
use std::collections::HashMap;

/// A persona currently producing a response.
///
/// Membership is set-like: at most one entry per persona identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingAgent {
    pub persona_id: String,
    pub persona_name: String,
}

impl TypingAgent {
    pub fn new(persona_id: impl Into<String>, persona_name: impl Into<String>) -> Self {
        Self {
            persona_id: persona_id.into(),
            persona_name: persona_name.into(),
        }
    }
}

/// Paging bookkeeping for the conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            total: 0,
        }
    }
}

/// The single source of truth for conversation, message, typing and
/// streaming state.
///
/// Only the reducer mutates this; everything else reads snapshots.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Known conversations, newest first.
    pub conversations: Vec<Conversation>,
    /// The conversation currently open, if any. Its embedded message list is
    /// always drained into `messages` on the way in.
    pub current_conversation: Option<Conversation>,
    /// Messages of the current conversation, ordered by arrival.
    pub messages: Vec<Message>,
    /// Personas currently producing a response.
    pub typing_agents: Vec<TypingAgent>,
    /// Accumulating partial-response text per persona, display only.
    pub streaming_chunks: HashMap<String, String>,
    /// Latest generated discussion summary.
    pub summary: Option<String>,
    /// A conversation-level REST operation is in flight.
    pub loading: bool,
    /// A message-history fetch is in flight.
    pub messages_loading: bool,
    /// An orchestration run is in flight.
    pub processing: bool,
    /// Human-readable error from the most recent failed operation.
    pub error: Option<String>,
    pub pagination: Pagination,
}

impl ConversationState {
    /// True when a typing entry exists for `persona_id`.
    pub fn is_typing(&self, persona_id: &str) -> bool {
        self.typing_agents
            .iter()
            .any(|agent| agent.persona_id == persona_id)
    }
}
