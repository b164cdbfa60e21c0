//! Per-conversation realtime binding.
//!
//! Translates push events from the realtime client into store actions,
//! enforcing the ordering and de-duplication guarantees the view requires:
//!
//! - finalized messages are de-duplicated by identifier against a seen-set
//!   scoped to this binding, then delivered through a strictly serialized
//!   queue with a fixed pause between deliveries (UX pacing when several
//!   personas finish at once);
//! - all transient memory (seen-set, queue, in-flight delivery) lives in
//!   tasks owned by the binding, so dropping or rebinding on a conversation
//!   switch discards it wholesale and nothing stale leaks into the next
//!   conversation.
//!
//! The binding never reads store state to decide correctness; the one read
//! is the current status, to avoid redundant status overwrites.

use crate::store::{Action, ConversationStore, TypingAgent};
use board_core::conversation::{ConversationStatus, Message};
use board_core::event::{EventKind, ServerEvent};
use board_realtime::RealtimeClient;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Binds one conversation's realtime events to the store.
pub struct ConversationBinding {
    conversation_id: String,
    client: Arc<RealtimeClient>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
    cancel: CancellationToken,
}

impl ConversationBinding {
    /// Registers handlers for every event kind, joins the conversation room,
    /// and starts the translation and delivery tasks.
    ///
    /// Create a fresh binding per conversation; binding a new conversation
    /// after dropping the old one starts from empty transient memory.
    pub async fn bind(
        store: Arc<ConversationStore>,
        client: Arc<RealtimeClient>,
        conversation_id: impl Into<String>,
        stagger_delay: Duration,
    ) -> Arc<Self> {
        let conversation_id = conversation_id.into();
        let (events_tx, events_rx) = mpsc::unbounded_channel::<ServerEvent>();
        let (delivery_tx, delivery_rx) = mpsc::unbounded_channel::<(String, Message)>();
        let cancel = CancellationToken::new();

        tokio::spawn(translate_loop(
            store.clone(),
            conversation_id.clone(),
            events_rx,
            delivery_tx,
            cancel.clone(),
        ));
        tokio::spawn(delivery_loop(
            store,
            delivery_rx,
            stagger_delay,
            cancel.clone(),
        ));

        for kind in EventKind::ALL {
            let tx = events_tx.clone();
            client
                .on(kind, move |event| {
                    let _ = tx.send(event);
                })
                .await;
        }
        client.join_conversation(&conversation_id).await;

        Arc::new(Self {
            conversation_id,
            client,
            events_tx,
            cancel,
        })
    }

    /// The conversation this binding serves.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Feeds one event through the same path the registered handlers use.
    /// Exposed for tests and out-of-band transports.
    pub fn ingest(&self, event: ServerEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Leaves the room, unregisters handlers, and stops both tasks,
    /// discarding any queued deliveries.
    pub async fn unbind(&self) {
        self.client.leave_conversation(&self.conversation_id).await;
        for kind in EventKind::ALL {
            self.client.off(kind).await;
        }
        self.cancel.cancel();
    }
}

impl Drop for ConversationBinding {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Translates raw events into actions; finalized messages go to the delivery
/// queue after the seen-set check, everything else dispatches immediately.
async fn translate_loop(
    store: Arc<ConversationStore>,
    conversation_id: String,
    mut events_rx: mpsc::UnboundedReceiver<ServerEvent>,
    delivery_tx: mpsc::UnboundedSender<(String, Message)>,
    cancel: CancellationToken,
) {
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events_rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            ServerEvent::Typing(typing) => {
                let Some(persona_id) = typing.persona_id else {
                    debug!("typing event without persona id, dropped");
                    continue;
                };
                if typing.is_typing == Some(false) {
                    store.dispatch(Action::RemoveTypingAgent(persona_id)).await;
                } else {
                    let name = typing.persona_name.unwrap_or_else(|| persona_id.clone());
                    store
                        .dispatch(Action::AddTypingAgent(TypingAgent::new(persona_id, name)))
                        .await;
                }
            }

            ServerEvent::Stream(stream) => {
                let Some(persona_id) = stream.persona_id else {
                    debug!("stream event without persona id, dropped");
                    continue;
                };
                if stream.is_complete {
                    // End of stream clears transient state; the finalized
                    // message arrives as its own event.
                    store
                        .dispatch(Action::RemoveTypingAgent(persona_id.clone()))
                        .await;
                    store
                        .dispatch(Action::ClearStreamingChunk(persona_id))
                        .await;
                } else {
                    let chunk = stream.chunk.unwrap_or_default();
                    store
                        .dispatch(Action::AddTypingAgent(TypingAgent::new(
                            persona_id.clone(),
                            persona_id.clone(),
                        )))
                        .await;
                    store
                        .dispatch(Action::UpsertStreamingMessage {
                            persona_id: persona_id.clone(),
                            chunk: chunk.clone(),
                        })
                        .await;
                    store
                        .dispatch(Action::SetStreamingChunk { persona_id, chunk })
                        .await;
                }
            }

            ServerEvent::Message(message_event) => {
                if message_event
                    .conversation_id
                    .as_deref()
                    .is_some_and(|id| id != conversation_id)
                {
                    debug!("message for another conversation, dropped");
                    continue;
                }
                let Some(persona_id) = message_event
                    .persona_id
                    .clone()
                    .or_else(|| {
                        message_event
                            .message
                            .as_ref()
                            .and_then(|m| m.persona_id.clone())
                    })
                else {
                    warn!("finalized message without persona id, dropped");
                    continue;
                };
                if let Some(id) = message_event.message_id() {
                    if !seen.insert(id.to_string()) {
                        debug!("duplicate finalized message {id}, dropped");
                        continue;
                    }
                }
                let _ = delivery_tx.send((persona_id, message_event.into_message()));
            }

            ServerEvent::SessionComplete(complete) => {
                if complete
                    .conversation_id
                    .as_deref()
                    .is_some_and(|id| id == conversation_id)
                {
                    complete_conversation(&store, &conversation_id, ConversationStatus::Completed)
                        .await;
                }
            }

            ServerEvent::StatusChange(change) => {
                if change
                    .conversation_id
                    .as_deref()
                    .is_some_and(|id| id == conversation_id)
                {
                    complete_conversation(&store, &conversation_id, change.status).await;
                }
            }

            ServerEvent::Error(error) => {
                warn!(
                    "realtime channel error: {}",
                    error.message.as_deref().unwrap_or("unknown")
                );
            }
        }
    }
}

/// Status write with a redundancy check so the same terminal status is not
/// re-dispatched for every repeated event.
async fn complete_conversation(
    store: &Arc<ConversationStore>,
    conversation_id: &str,
    status: ConversationStatus,
) {
    let snapshot = store.snapshot().await;
    let Some(current) = snapshot.current_conversation else {
        return;
    };
    if current.id == conversation_id && current.status != status {
        store.dispatch(Action::SetConversationStatus(status)).await;
    }
}

/// Delivers finalized messages one at a time with a fixed pause between
/// them, so simultaneous persona completions arrive as a readable sequence
/// rather than an instant flood.
async fn delivery_loop(
    store: Arc<ConversationStore>,
    mut delivery_rx: mpsc::UnboundedReceiver<(String, Message)>,
    stagger_delay: Duration,
    cancel: CancellationToken,
) {
    loop {
        let (persona_id, message) = tokio::select! {
            _ = cancel.cancelled() => break,
            next = delivery_rx.recv() => match next {
                Some(next) => next,
                None => break,
            },
        };

        store
            .dispatch(Action::RemoveTypingAgent(persona_id.clone()))
            .await;
        store
            .dispatch(Action::ClearStreamingChunk(persona_id.clone()))
            .await;
        store
            .dispatch(Action::FinalizeStreamingMessage {
                persona_id,
                message,
            })
            .await;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(stagger_delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::api::BoardApi;
    use board_core::auth::{AuthSession, LoginRequest, RegisterRequest, User};
    use board_core::config::BoardConfig;
    use board_core::conversation::{
        Attachment, Conversation, ConversationAnalytics, CreateConversationRequest,
        ProcessedMessages, UpdateConversationRequest,
    };
    use board_core::conversation::{MessageRole, Page};
    use board_core::error::{BoardError, Result};
    use board_core::event::{AgentMessageEvent, StreamChunkEvent, TypingEvent};
    use board_core::persona::Persona;
    use async_trait::async_trait;

    /// API stub for tests that only exercise the push path.
    struct NullApi;

    #[async_trait]
    impl BoardApi for NullApi {
        async fn register(&self, _: RegisterRequest) -> Result<User> {
            Err(BoardError::internal("unused"))
        }
        async fn login(&self, _: LoginRequest) -> Result<AuthSession> {
            Err(BoardError::internal("unused"))
        }
        async fn me(&self) -> Result<User> {
            Err(BoardError::internal("unused"))
        }
        async fn create_conversation(&self, _: CreateConversationRequest) -> Result<Conversation> {
            Err(BoardError::internal("unused"))
        }
        async fn list_conversations(&self, _: u32, _: u32) -> Result<Page<Conversation>> {
            Err(BoardError::internal("unused"))
        }
        async fn get_conversation(&self, id: &str) -> Result<Conversation> {
            Err(BoardError::not_found("Conversation", id))
        }
        async fn update_conversation(
            &self,
            _: &str,
            _: UpdateConversationRequest,
        ) -> Result<Conversation> {
            Err(BoardError::internal("unused"))
        }
        async fn delete_conversation(&self, _: &str) -> Result<()> {
            Err(BoardError::internal("unused"))
        }
        async fn list_messages(&self, _: &str) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }
        async fn create_message(&self, _: &str, _: &str) -> Result<Message> {
            Err(BoardError::internal("unused"))
        }
        async fn process_message(&self, _: &str, _: &str) -> Result<ProcessedMessages> {
            Err(BoardError::internal("unused"))
        }
        async fn generate_summary(&self, _: &str) -> Result<String> {
            Err(BoardError::internal("unused"))
        }
        async fn step_conversation(&self, _: &str) -> Result<Conversation> {
            Err(BoardError::internal("unused"))
        }
        async fn list_personas(&self) -> Result<Vec<Persona>> {
            Ok(Vec::new())
        }
        async fn get_persona(&self, id: &str) -> Result<Persona> {
            Err(BoardError::not_found("Persona", id))
        }
        async fn conversation_analytics(&self, _: &str) -> Result<ConversationAnalytics> {
            Err(BoardError::internal("unused"))
        }
        async fn upload_attachment(&self, _: &str, _: &str, _: Vec<u8>) -> Result<Attachment> {
            Err(BoardError::internal("unused"))
        }
        async fn get_attachment(&self, id: &str) -> Result<Attachment> {
            Err(BoardError::not_found("Attachment", id))
        }
    }

    fn test_setup() -> (Arc<ConversationStore>, Arc<RealtimeClient>) {
        let store = ConversationStore::new(Arc::new(NullApi));
        let client = Arc::new(RealtimeClient::new(&BoardConfig::default()));
        (store, client)
    }

    fn finalized(conversation: &str, persona: &str, id: &str, content: &str) -> ServerEvent {
        ServerEvent::Message(AgentMessageEvent {
            conversation_id: Some(conversation.to_string()),
            persona_id: Some(persona.to_string()),
            message: Some(Message {
                id: Some(id.to_string()),
                role: MessageRole::Agent,
                persona_id: Some(persona.to_string()),
                content: content.to_string(),
                structured_output: None,
                round_number: None,
                attachments: None,
                created_at: None,
                updated_at: None,
            }),
            id: None,
            content: None,
            created_at: None,
        })
    }

    async fn wait_for_messages(store: &ConversationStore, count: usize) -> tokio::time::Instant {
        loop {
            if store.snapshot().await.messages.len() >= count {
                return tokio::time::Instant::now();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stagger_serializes_simultaneous_finalizations() {
        let (store, client) = test_setup();
        let binding =
            ConversationBinding::bind(store.clone(), client, "c1", Duration::from_millis(900))
                .await;

        binding.ingest(finalized("c1", "pm", "f1", "pm says"));
        binding.ingest(finalized("c1", "qa", "f2", "qa says"));

        let first = wait_for_messages(&store, 1).await;
        let state = store.snapshot().await;
        assert_eq!(state.messages.len(), 1, "second delivery must wait");
        assert_eq!(state.messages[0].persona_id.as_deref(), Some("pm"));

        let second = wait_for_messages(&store, 2).await;
        let state = store.snapshot().await;
        assert_eq!(state.messages[1].persona_id.as_deref(), Some("qa"));
        assert!(second.duration_since(first) >= Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_finalized_message_is_dropped() {
        let (store, client) = test_setup();
        let binding =
            ConversationBinding::bind(store.clone(), client, "c1", Duration::from_millis(10))
                .await;

        binding.ingest(finalized("c1", "pm", "f1", "once"));
        binding.ingest(finalized("c1", "pm", "f1", "twice"));
        wait_for_messages(&store, 1).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.snapshot().await.messages.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalization_cleans_typing_and_stream_state() {
        let (store, client) = test_setup();
        let binding =
            ConversationBinding::bind(store.clone(), client, "c1", Duration::from_millis(10))
                .await;

        binding.ingest(ServerEvent::Typing(TypingEvent {
            conversation_id: Some("c1".to_string()),
            persona_id: Some("dev".to_string()),
            persona_name: Some("Developer".to_string()),
            is_typing: Some(true),
        }));
        binding.ingest(ServerEvent::Stream(StreamChunkEvent {
            conversation_id: Some("c1".to_string()),
            persona_id: Some("dev".to_string()),
            chunk: Some("building".to_string()),
            is_complete: false,
        }));
        binding.ingest(finalized("c1", "dev", "f1", "built"));

        wait_for_messages(&store, 1).await;
        let state = store.snapshot().await;
        assert!(!state.is_typing("dev"));
        assert!(!state.streaming_chunks.contains_key("dev"));
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, "built");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_chunks_accumulate_until_complete() {
        let (store, client) = test_setup();
        let binding =
            ConversationBinding::bind(store.clone(), client, "c1", Duration::from_millis(10))
                .await;

        for chunk in ["Let's", " scope", " this."] {
            binding.ingest(ServerEvent::Stream(StreamChunkEvent {
                conversation_id: Some("c1".to_string()),
                persona_id: Some("pm".to_string()),
                chunk: Some(chunk.to_string()),
                is_complete: false,
            }));
        }
        wait_for_messages(&store, 1).await;

        let state = store.snapshot().await;
        assert!(state.is_typing("pm"));
        assert_eq!(state.messages[0].content, "Let's scope this.");
        assert_eq!(
            state.streaming_chunks.get("pm").map(String::as_str),
            Some("Let's scope this.")
        );

        binding.ingest(ServerEvent::Stream(StreamChunkEvent {
            conversation_id: Some("c1".to_string()),
            persona_id: Some("pm".to_string()),
            chunk: None,
            is_complete: true,
        }));
        loop {
            let state = store.snapshot().await;
            if !state.is_typing("pm") {
                assert!(!state.streaming_chunks.contains_key("pm"));
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_without_persona_id_is_dropped() {
        let (store, client) = test_setup();
        let binding =
            ConversationBinding::bind(store.clone(), client, "c1", Duration::from_millis(10))
                .await;

        binding.ingest(ServerEvent::Message(AgentMessageEvent {
            conversation_id: Some("c1".to_string()),
            persona_id: None,
            message: None,
            id: Some("f1".to_string()),
            content: Some("orphan".to_string()),
            created_at: None,
        }));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(store.snapshot().await.messages.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbind_discards_queued_deliveries() {
        let (store, client) = test_setup();
        let binding = ConversationBinding::bind(
            store.clone(),
            client.clone(),
            "a",
            Duration::from_millis(900),
        )
        .await;

        binding.ingest(finalized("a", "pm", "a1", "first"));
        binding.ingest(finalized("a", "qa", "a2", "second"));
        wait_for_messages(&store, 1).await;

        // Switch conversations while a2 is still queued.
        binding.unbind().await;
        let _binding_b =
            ConversationBinding::bind(store.clone(), client, "b", Duration::from_millis(900))
                .await;
        store
            .dispatch(Action::SetCurrentConversation(None))
            .await;

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(
            store.snapshot().await.messages.is_empty(),
            "queued delivery from the old conversation must not leak"
        );
    }
}
