//! Backend API contract.
//!
//! Defines the interface the application layer uses to reach the backend,
//! decoupling state management from the HTTP implementation. The concrete
//! client lives in `board-infrastructure`; tests substitute mocks.

use crate::auth::{AuthSession, LoginRequest, RegisterRequest, User};
use crate::conversation::{
    Attachment, Conversation, ConversationAnalytics, CreateConversationRequest, Message, Page,
    ProcessedMessages, UpdateConversationRequest,
};
use crate::error::Result;
use crate::persona::Persona;
use async_trait::async_trait;

/// The REST operations this client consumes.
///
/// # Implementation Notes
///
/// Implementations must:
/// - Attach the bearer token when one is stored
/// - Demote a 401 response to guest mode (clear the token) instead of
///   failing hard
/// - Never panic on backend failure; every error surfaces as `BoardError`
#[async_trait]
pub trait BoardApi: Send + Sync {
    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Registers a new account. Does not log in.
    async fn register(&self, request: RegisterRequest) -> Result<User>;

    /// Logs in and stores the returned bearer token.
    async fn login(&self, request: LoginRequest) -> Result<AuthSession>;

    /// Returns the currently authenticated user.
    async fn me(&self) -> Result<User>;

    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    /// Creates a conversation.
    async fn create_conversation(
        &self,
        request: CreateConversationRequest,
    ) -> Result<Conversation>;

    /// Lists the user's conversations, newest first.
    async fn list_conversations(&self, page: u32, limit: u32) -> Result<Page<Conversation>>;

    /// Fetches a single conversation, possibly with an embedded message
    /// snapshot.
    async fn get_conversation(&self, id: &str) -> Result<Conversation>;

    /// Partially updates a conversation.
    async fn update_conversation(
        &self,
        id: &str,
        request: UpdateConversationRequest,
    ) -> Result<Conversation>;

    /// Deletes a conversation.
    async fn delete_conversation(&self, id: &str) -> Result<()>;

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Fetches the authoritative message history of a conversation.
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    /// Persists a user message.
    async fn create_message(&self, conversation_id: &str, content: &str) -> Result<Message>;

    // ------------------------------------------------------------------
    // Orchestration
    // ------------------------------------------------------------------

    /// Triggers backend processing of a user message, fanning out to every
    /// active persona. Responses normally arrive over the realtime channel;
    /// the returned collection is a synchronous fallback.
    async fn process_message(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<ProcessedMessages>;

    /// Fetches a generated summary of the discussion so far.
    async fn generate_summary(&self, conversation_id: &str) -> Result<String>;

    /// Advances the conversation by exactly one persona turn.
    async fn step_conversation(&self, conversation_id: &str) -> Result<Conversation>;

    // ------------------------------------------------------------------
    // Personas
    // ------------------------------------------------------------------

    /// Lists the backend persona catalog.
    async fn list_personas(&self) -> Result<Vec<Persona>>;

    /// Fetches a single persona.
    async fn get_persona(&self, id: &str) -> Result<Persona>;

    // ------------------------------------------------------------------
    // Analytics / attachments
    // ------------------------------------------------------------------

    /// Fetches token-usage analytics for a conversation.
    async fn conversation_analytics(&self, conversation_id: &str)
    -> Result<ConversationAnalytics>;

    /// Uploads a file and returns the stored attachment record.
    async fn upload_attachment(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Attachment>;

    /// Fetches an attachment record.
    async fn get_attachment(&self, id: &str) -> Result<Attachment>;
}
