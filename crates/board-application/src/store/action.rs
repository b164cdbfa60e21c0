//! Action vocabulary.
//!
//! One vocabulary for both ingestion paths: REST-backed operations and
//! realtime push events dispatch the same actions through the same reducer,
//! which is what lets a single merge policy de-duplicate across them.

use super::state::TypingAgent;
use board_core::conversation::{Conversation, ConversationStatus, Message, Page};

/// REST-backed operations, used to scope pending/rejected bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncOp {
    CreateConversation,
    FetchConversations,
    FetchConversation,
    UpdateConversation,
    DeleteConversation,
    FetchMessages,
    SendMessage,
    ProcessMessage,
    GenerateSummary,
    StepConversation,
}

/// Every state transition the store can apply.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replaces the active conversation. An embedded non-empty message list
    /// is merged into existing messages, never overwritten; re-selecting the
    /// current conversation without messages leaves live state untouched.
    SetCurrentConversation(Option<Conversation>),
    /// Unconditionally clears current conversation, messages and typing.
    ClearCurrentConversation,
    /// Appends unconditionally (optimistic local insert).
    AddMessage(Message),
    /// Appends `chunk` to the synthetic in-progress entry for a persona,
    /// creating it on first use.
    UpsertStreamingMessage { persona_id: String, chunk: String },
    /// Drops the synthetic entry for a persona and merges the authoritative
    /// message in its place.
    FinalizeStreamingMessage { persona_id: String, message: Message },
    AddTypingAgent(TypingAgent),
    RemoveTypingAgent(String),
    ClearTypingAgents,
    /// Accumulates partial text in the persona→text display map.
    SetStreamingChunk { persona_id: String, chunk: String },
    ClearStreamingChunk(String),
    /// Forward-only status write for the current conversation.
    SetConversationStatus(ConversationStatus),
    ClearError,

    // Async lifecycle ---------------------------------------------------
    Pending(AsyncOp),
    Rejected { op: AsyncOp, error: String },
    ConversationCreated(Conversation),
    ConversationsFetched(Page<Conversation>),
    ConversationFetched(Conversation),
    ConversationUpdated(Conversation),
    ConversationDeleted(String),
    MessagesFetched(Vec<Message>),
    /// Server acknowledgment of a sent user message. `local_id` is the
    /// temporary identifier of the optimistic insert to replace.
    MessageSent {
        local_id: Option<String>,
        message: Message,
    },
    MessagesProcessed(Vec<Message>),
    SummaryReady(String),
    ConversationStepped(Conversation),
}
