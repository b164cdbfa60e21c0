//! Conversation store.
//!
//! Owns the state behind a single writer lock; all mutation funnels through
//! [`reduce`]. The REST-backed operations follow pending/fulfilled/rejected
//! discipline: failures are recorded as error strings and leave prior state
//! intact, so no caller ever observes a half-applied transition.

use super::action::{Action, AsyncOp};
use super::reducer::reduce;
use super::state::ConversationState;
use board_core::api::BoardApi;
use board_core::conversation::{
    Conversation, CreateConversationRequest, Message, Page, UpdateConversationRequest,
};
use board_core::error::Result;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::debug;

/// Single source of truth for conversation/message/typing/streaming state.
pub struct ConversationStore {
    api: Arc<dyn BoardApi>,
    state: RwLock<ConversationState>,
    changed: watch::Sender<u64>,
}

impl ConversationStore {
    pub fn new(api: Arc<dyn BoardApi>) -> Arc<Self> {
        let (changed, _) = watch::channel(0);
        Arc::new(Self {
            api,
            state: RwLock::new(ConversationState::default()),
            changed,
        })
    }

    /// Applies one action through the reducer and signals subscribers.
    pub async fn dispatch(&self, action: Action) {
        debug!(?action, "dispatch");
        {
            let mut state = self.state.write().await;
            reduce(&mut state, action);
        }
        self.changed.send_modify(|revision| *revision += 1);
    }

    /// Returns a snapshot of the current state.
    pub async fn snapshot(&self) -> ConversationState {
        self.state.read().await.clone()
    }

    /// A change signal that fires after every dispatch; the value is a
    /// monotonically increasing revision.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    // ------------------------------------------------------------------
    // REST-backed operations
    // ------------------------------------------------------------------

    /// Creates a conversation and makes it current.
    pub async fn create_conversation(
        &self,
        request: CreateConversationRequest,
    ) -> Result<Conversation> {
        self.dispatch(Action::Pending(AsyncOp::CreateConversation))
            .await;
        match self.api.create_conversation(request).await {
            Ok(conversation) => {
                self.dispatch(Action::ConversationCreated(conversation.clone()))
                    .await;
                Ok(conversation)
            }
            Err(err) => {
                self.reject(AsyncOp::CreateConversation, &err).await;
                Err(err)
            }
        }
    }

    /// Fetches a page of conversations.
    pub async fn fetch_conversations(&self, page: u32, limit: u32) -> Result<Page<Conversation>> {
        self.dispatch(Action::Pending(AsyncOp::FetchConversations))
            .await;
        match self.api.list_conversations(page, limit).await {
            Ok(result) => {
                self.dispatch(Action::ConversationsFetched(result.clone()))
                    .await;
                Ok(result)
            }
            Err(err) => {
                self.reject(AsyncOp::FetchConversations, &err).await;
                Err(err)
            }
        }
    }

    /// Fetches one conversation and makes it current (embedded messages are
    /// merged, not overwritten).
    pub async fn fetch_conversation(&self, id: &str) -> Result<Conversation> {
        self.dispatch(Action::Pending(AsyncOp::FetchConversation))
            .await;
        match self.api.get_conversation(id).await {
            Ok(conversation) => {
                self.dispatch(Action::ConversationFetched(conversation.clone()))
                    .await;
                Ok(conversation)
            }
            Err(err) => {
                self.reject(AsyncOp::FetchConversation, &err).await;
                Err(err)
            }
        }
    }

    /// Applies a partial update to a conversation.
    pub async fn update_conversation(
        &self,
        id: &str,
        request: UpdateConversationRequest,
    ) -> Result<Conversation> {
        self.dispatch(Action::Pending(AsyncOp::UpdateConversation))
            .await;
        match self.api.update_conversation(id, request).await {
            Ok(conversation) => {
                self.dispatch(Action::ConversationUpdated(conversation.clone()))
                    .await;
                Ok(conversation)
            }
            Err(err) => {
                self.reject(AsyncOp::UpdateConversation, &err).await;
                Err(err)
            }
        }
    }

    /// Deletes a conversation.
    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        self.dispatch(Action::Pending(AsyncOp::DeleteConversation))
            .await;
        match self.api.delete_conversation(id).await {
            Ok(()) => {
                self.dispatch(Action::ConversationDeleted(id.to_string()))
                    .await;
                Ok(())
            }
            Err(err) => {
                self.reject(AsyncOp::DeleteConversation, &err).await;
                Err(err)
            }
        }
    }

    /// Fetches the authoritative message history and merges it into state.
    pub async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.dispatch(Action::Pending(AsyncOp::FetchMessages)).await;
        match self.api.list_messages(conversation_id).await {
            Ok(messages) => {
                self.dispatch(Action::MessagesFetched(messages.clone()))
                    .await;
                Ok(messages)
            }
            Err(err) => {
                self.reject(AsyncOp::FetchMessages, &err).await;
                Err(err)
            }
        }
    }

    /// Sends a user message with an optimistic local insert.
    ///
    /// The optimistic entry carries a temporary `local-` identifier recorded
    /// here; the fulfilled action replaces exactly that entry with the server
    /// message. On failure the optimistic entry stays visible and the error
    /// is recorded.
    pub async fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message> {
        let local = Message::local_user(content);
        let local_id = local.id.clone();
        self.dispatch(Action::AddMessage(local)).await;
        self.dispatch(Action::Pending(AsyncOp::SendMessage)).await;

        match self.api.create_message(conversation_id, content).await {
            Ok(message) => {
                self.dispatch(Action::MessageSent {
                    local_id,
                    message: message.clone(),
                })
                .await;
                Ok(message)
            }
            Err(err) => {
                self.reject(AsyncOp::SendMessage, &err).await;
                Err(err)
            }
        }
    }

    /// Triggers backend processing of a user message. Agent responses arrive
    /// over the realtime channel; the synchronous response is merged as a
    /// fallback so nothing is lost when the channel is down.
    pub async fn process_message(&self, conversation_id: &str, message: &str) -> Result<()> {
        self.dispatch(Action::Pending(AsyncOp::ProcessMessage)).await;
        match self.api.process_message(conversation_id, message).await {
            Ok(processed) => {
                self.dispatch(Action::MessagesProcessed(processed.data))
                    .await;
                Ok(())
            }
            Err(err) => {
                self.reject(AsyncOp::ProcessMessage, &err).await;
                Err(err)
            }
        }
    }

    /// Fetches a generated discussion summary.
    pub async fn generate_summary(&self, conversation_id: &str) -> Result<String> {
        self.dispatch(Action::Pending(AsyncOp::GenerateSummary))
            .await;
        match self.api.generate_summary(conversation_id).await {
            Ok(summary) => {
                self.dispatch(Action::SummaryReady(summary.clone())).await;
                Ok(summary)
            }
            Err(err) => {
                self.reject(AsyncOp::GenerateSummary, &err).await;
                Err(err)
            }
        }
    }

    /// Advances the conversation by one persona turn.
    pub async fn step_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.dispatch(Action::Pending(AsyncOp::StepConversation))
            .await;
        match self.api.step_conversation(conversation_id).await {
            Ok(conversation) => {
                self.dispatch(Action::ConversationStepped(conversation.clone()))
                    .await;
                Ok(conversation)
            }
            Err(err) => {
                self.reject(AsyncOp::StepConversation, &err).await;
                Err(err)
            }
        }
    }

    async fn reject(&self, op: AsyncOp, err: &board_core::BoardError) {
        self.dispatch(Action::Rejected {
            op,
            error: err.to_string(),
        })
        .await;
    }
}
