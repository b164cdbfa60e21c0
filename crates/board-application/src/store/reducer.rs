//! Pure state transitions.
//!
//! `reduce` is the only code that mutates [`ConversationState`]. Every case
//! that ingests a message collection goes through
//! [`board_core::merge::merge_messages`], so de-duplication policy is
//! identical for REST results, the process-message fallback, and realtime
//! finalizations.

use super::action::{Action, AsyncOp};
use super::state::ConversationState;
use board_core::conversation::{Conversation, ConversationStatus, Message, streaming_id};
use board_core::merge::merge_messages;

pub fn reduce(state: &mut ConversationState, action: Action) {
    match action {
        Action::SetCurrentConversation(conversation) => {
            set_current_conversation(state, conversation)
        }
        Action::ClearCurrentConversation => clear_current(state),

        Action::AddMessage(message) => state.messages.push(message),

        Action::UpsertStreamingMessage { persona_id, chunk } => {
            let id = streaming_id(&persona_id);
            match state
                .messages
                .iter_mut()
                .find(|m| m.id.as_deref() == Some(id.as_str()))
            {
                Some(entry) => entry.content.push_str(&chunk),
                None => {
                    let mut placeholder = Message::streaming_placeholder(&persona_id);
                    placeholder.content = chunk;
                    state.messages.push(placeholder);
                }
            }
        }

        Action::FinalizeStreamingMessage {
            persona_id,
            message,
        } => {
            let id = streaming_id(&persona_id);
            state
                .messages
                .retain(|m| m.id.as_deref() != Some(id.as_str()));
            ingest_messages(state, vec![message]);
            remove_typing(state, &persona_id);
            state.streaming_chunks.remove(&persona_id);
        }

        Action::AddTypingAgent(agent) => {
            if !state.is_typing(&agent.persona_id) {
                state.typing_agents.push(agent);
            }
        }
        Action::RemoveTypingAgent(persona_id) => remove_typing(state, &persona_id),
        Action::ClearTypingAgents => state.typing_agents.clear(),

        Action::SetStreamingChunk { persona_id, chunk } => {
            state
                .streaming_chunks
                .entry(persona_id)
                .or_default()
                .push_str(&chunk);
        }
        Action::ClearStreamingChunk(persona_id) => {
            state.streaming_chunks.remove(&persona_id);
        }

        Action::SetConversationStatus(status) => {
            let updated = match state.current_conversation.as_mut() {
                Some(current) if current.status.can_transition(status) => {
                    current.status = status;
                    Some(current.id.clone())
                }
                _ => None,
            };
            if let Some(id) = updated {
                update_in_list_status(state, &id, status);
            }
        }

        Action::ClearError => state.error = None,

        Action::Pending(op) => {
            state.error = None;
            match op {
                AsyncOp::FetchMessages => state.messages_loading = true,
                AsyncOp::ProcessMessage => state.processing = true,
                AsyncOp::SendMessage => {}
                _ => state.loading = true,
            }
        }

        Action::Rejected { op, error } => {
            match op {
                AsyncOp::FetchMessages => state.messages_loading = false,
                AsyncOp::ProcessMessage => state.processing = false,
                AsyncOp::SendMessage => {}
                _ => state.loading = false,
            }
            state.error = Some(error);
        }

        Action::ConversationCreated(conversation) => {
            state.loading = false;
            state.conversations.insert(0, conversation.clone());
            state.current_conversation = Some(conversation);
            state.messages.clear();
            state.typing_agents.clear();
            state.streaming_chunks.clear();
        }

        Action::ConversationsFetched(page) => {
            state.loading = false;
            state.pagination.page = page.page;
            state.pagination.limit = page.limit;
            state.pagination.total = page.total;
            state.conversations = page.data;
        }

        Action::ConversationFetched(conversation) => {
            state.loading = false;
            set_current_conversation(state, Some(conversation));
        }

        Action::ConversationUpdated(conversation) => {
            state.loading = false;
            apply_conversation_update(state, conversation);
        }

        Action::ConversationDeleted(id) => {
            state.loading = false;
            state.conversations.retain(|c| c.id != id);
            if state
                .current_conversation
                .as_ref()
                .is_some_and(|c| c.id == id)
            {
                clear_current(state);
            }
        }

        Action::MessagesFetched(messages) => {
            state.messages_loading = false;
            ingest_messages(state, messages);
        }

        Action::MessageSent { local_id, message } => {
            let replaced = local_id.as_deref().is_some_and(|local_id| {
                match state
                    .messages
                    .iter_mut()
                    .find(|m| m.id.as_deref() == Some(local_id))
                {
                    Some(entry) => {
                        *entry = message.clone();
                        true
                    }
                    None => false,
                }
            });
            if !replaced {
                ingest_messages(state, vec![message]);
            }
        }

        Action::MessagesProcessed(messages) => {
            state.processing = false;
            ingest_messages(state, messages);
        }

        Action::SummaryReady(summary) => {
            state.loading = false;
            state.summary = Some(summary);
        }

        Action::ConversationStepped(conversation) => {
            state.loading = false;
            apply_conversation_update(state, conversation);
        }
    }
}

/// Merges an incoming message collection into state.
fn ingest_messages(state: &mut ConversationState, incoming: Vec<Message>) {
    let existing = std::mem::take(&mut state.messages);
    state.messages = merge_messages(existing, incoming);
}

fn remove_typing(state: &mut ConversationState, persona_id: &str) {
    state
        .typing_agents
        .retain(|agent| agent.persona_id != persona_id);
}

fn clear_current(state: &mut ConversationState) {
    state.current_conversation = None;
    state.messages.clear();
    state.typing_agents.clear();
    state.streaming_chunks.clear();
}

fn update_in_list_status(state: &mut ConversationState, id: &str, status: ConversationStatus) {
    if let Some(listed) = state.conversations.iter_mut().find(|c| c.id == id) {
        listed.status = status;
    }
}

/// Replaces the active conversation per the re-select rules.
///
/// The embedded message snapshot (if any) is drained into `state.messages`
/// through the merge so locally streamed messages the server snapshot has not
/// caught up to survive; the stored conversation itself never carries
/// messages.
fn set_current_conversation(state: &mut ConversationState, incoming: Option<Conversation>) {
    let Some(mut incoming) = incoming else {
        clear_current(state);
        return;
    };

    let same_conversation = state
        .current_conversation
        .as_ref()
        .is_some_and(|c| c.id == incoming.id);

    let embedded = incoming.messages.take();
    if !same_conversation {
        state.messages.clear();
        state.typing_agents.clear();
        state.streaming_chunks.clear();
    }
    if let Some(embedded) = embedded
        && !embedded.is_empty()
    {
        ingest_messages(state, embedded);
    }

    // A redundant snapshot must not regress a finished conversation.
    if same_conversation
        && let Some(current) = state.current_conversation.as_ref()
        && !current.status.can_transition(incoming.status)
    {
        incoming.status = current.status;
    }
    state.current_conversation = Some(incoming);
}

fn apply_conversation_update(state: &mut ConversationState, mut conversation: Conversation) {
    let embedded = conversation.messages.take();
    let is_current = state
        .current_conversation
        .as_ref()
        .is_some_and(|c| c.id == conversation.id);

    if let Some(listed) = state
        .conversations
        .iter_mut()
        .find(|c| c.id == conversation.id)
    {
        *listed = conversation.clone();
    }
    if is_current {
        if let Some(current) = state.current_conversation.as_ref()
            && !current.status.can_transition(conversation.status)
        {
            conversation.status = current.status;
        }
        state.current_conversation = Some(conversation);
        if let Some(embedded) = embedded
            && !embedded.is_empty()
        {
            ingest_messages(state, embedded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::state::TypingAgent;
    use board_core::conversation::{MessageRole, Page};
    use chrono::Utc;

    fn conversation(id: &str) -> Conversation {
        Conversation {
            id: id.to_string(),
            title: format!("Conversation {id}"),
            status: ConversationStatus::Active,
            active_personas: vec!["pm".to_string(), "dev".to_string()],
            current_speaker: None,
            turn_index: None,
            max_rounds: 3,
            current_round: 0,
            messages: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn agent_message(id: &str, persona: &str, content: &str) -> Message {
        Message {
            id: Some(id.to_string()),
            role: MessageRole::Agent,
            persona_id: Some(persona.to_string()),
            content: content.to_string(),
            structured_output: None,
            round_number: None,
            attachments: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_set_current_merges_embedded_snapshot() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c1"))),
        );
        // A message streamed in before the snapshot caught up.
        reduce(&mut state, Action::AddMessage(agent_message("f1", "pm", "live")));

        let mut snapshot = conversation("c1");
        snapshot.messages = Some(vec![agent_message("m0", "dev", "older")]);
        reduce(&mut state, Action::SetCurrentConversation(Some(snapshot)));

        let ids: Vec<_> = state
            .messages
            .iter()
            .map(|m| m.id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["f1", "m0"]);
        // The stored conversation never owns messages.
        assert!(state.current_conversation.as_ref().unwrap().messages.is_none());
    }

    #[test]
    fn test_redundant_reselect_keeps_messages() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c1"))),
        );
        reduce(&mut state, Action::AddMessage(agent_message("f1", "pm", "live")));

        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c1"))),
        );

        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_switching_conversation_clears_live_state() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c1"))),
        );
        reduce(&mut state, Action::AddMessage(agent_message("f1", "pm", "live")));
        reduce(
            &mut state,
            Action::AddTypingAgent(TypingAgent::new("pm", "PM")),
        );

        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c2"))),
        );

        assert!(state.messages.is_empty());
        assert!(state.typing_agents.is_empty());
    }

    #[test]
    fn test_set_none_clears_everything() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c1"))),
        );
        reduce(&mut state, Action::AddMessage(agent_message("f1", "pm", "x")));

        reduce(&mut state, Action::SetCurrentConversation(None));

        assert!(state.current_conversation.is_none());
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_status_never_regresses() {
        let mut state = ConversationState::default();
        let mut finished = conversation("c1");
        finished.status = ConversationStatus::Completed;
        reduce(&mut state, Action::SetCurrentConversation(Some(finished)));

        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c1"))),
        );

        assert_eq!(
            state.current_conversation.as_ref().unwrap().status,
            ConversationStatus::Completed
        );
    }

    #[test]
    fn test_typing_agents_have_set_semantics() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::AddTypingAgent(TypingAgent::new("pm", "PM")),
        );
        reduce(
            &mut state,
            Action::AddTypingAgent(TypingAgent::new("pm", "PM")),
        );

        assert_eq!(state.typing_agents.len(), 1);

        reduce(&mut state, Action::RemoveTypingAgent("pm".to_string()));
        assert!(state.typing_agents.is_empty());
    }

    #[test]
    fn test_streaming_upsert_accumulates() {
        let mut state = ConversationState::default();
        for chunk in ["Let's", " scope", " this."] {
            reduce(
                &mut state,
                Action::UpsertStreamingMessage {
                    persona_id: "pm".to_string(),
                    chunk: chunk.to_string(),
                },
            );
        }

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, "Let's scope this.");
        assert!(state.messages[0].is_streaming_placeholder());
    }

    #[test]
    fn test_finalize_replaces_placeholder_and_cleans_up() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::AddTypingAgent(TypingAgent::new("pm", "PM")),
        );
        reduce(
            &mut state,
            Action::UpsertStreamingMessage {
                persona_id: "pm".to_string(),
                chunk: "Let's".to_string(),
            },
        );
        reduce(
            &mut state,
            Action::SetStreamingChunk {
                persona_id: "pm".to_string(),
                chunk: "Let's".to_string(),
            },
        );

        reduce(
            &mut state,
            Action::FinalizeStreamingMessage {
                persona_id: "pm".to_string(),
                message: agent_message("f1", "pm", "Let's scope this."),
            },
        );

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].id.as_deref(), Some("f1"));
        assert!(!state.is_typing("pm"));
        assert!(!state.streaming_chunks.contains_key("pm"));
    }

    #[test]
    fn test_messages_fetched_deduplicates_against_live() {
        let mut state = ConversationState::default();
        reduce(&mut state, Action::AddMessage(agent_message("f1", "pm", "live")));

        reduce(
            &mut state,
            Action::MessagesFetched(vec![
                agent_message("m0", "dev", "earlier"),
                agent_message("f1", "pm", "live"),
            ]),
        );

        assert_eq!(state.messages.len(), 2);
    }

    #[test]
    fn test_message_sent_replaces_optimistic_entry() {
        let mut state = ConversationState::default();
        let local = Message::local_user("Build an AR app");
        let local_id = local.id.clone();
        reduce(&mut state, Action::AddMessage(local));

        reduce(
            &mut state,
            Action::MessageSent {
                local_id,
                message: agent_message("srv-1", "user", "Build an AR app"),
            },
        );

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].id.as_deref(), Some("srv-1"));
    }

    #[test]
    fn test_message_sent_falls_back_to_merge() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::MessageSent {
                local_id: Some("local-gone".to_string()),
                message: agent_message("srv-1", "user", "hello"),
            },
        );
        // Echoed again via fetch: still one entry.
        reduce(
            &mut state,
            Action::MessagesFetched(vec![agent_message("srv-1", "user", "hello")]),
        );

        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_rejected_records_error_and_keeps_state() {
        let mut state = ConversationState::default();
        reduce(&mut state, Action::AddMessage(agent_message("f1", "pm", "x")));
        reduce(&mut state, Action::Pending(AsyncOp::FetchMessages));

        reduce(
            &mut state,
            Action::Rejected {
                op: AsyncOp::FetchMessages,
                error: "backend unavailable".to_string(),
            },
        );

        assert!(!state.messages_loading);
        assert_eq!(state.error.as_deref(), Some("backend unavailable"));
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_conversation_created_resets_messages() {
        let mut state = ConversationState::default();
        reduce(&mut state, Action::AddMessage(agent_message("f1", "pm", "x")));

        reduce(&mut state, Action::ConversationCreated(conversation("c2")));

        assert!(state.messages.is_empty());
        assert_eq!(state.conversations[0].id, "c2");
        assert_eq!(
            state.current_conversation.as_ref().unwrap().id,
            "c2"
        );
    }

    #[test]
    fn test_delete_current_conversation_clears_view() {
        let mut state = ConversationState::default();
        reduce(
            &mut state,
            Action::ConversationsFetched(Page {
                data: vec![conversation("c1"), conversation("c2")],
                total: 2,
                page: 1,
                limit: 20,
            }),
        );
        reduce(
            &mut state,
            Action::SetCurrentConversation(Some(conversation("c1"))),
        );

        reduce(&mut state, Action::ConversationDeleted("c1".to_string()));

        assert_eq!(state.conversations.len(), 1);
        assert!(state.current_conversation.is_none());
    }
}
