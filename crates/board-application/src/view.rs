//! Conversation view projection.
//!
//! Projects store state into the rows a renderer displays: persona-resolved
//! messages filtered by the user's persona selection, plus typing placeholder
//! rows. The projection carries a scroll revision that bumps whenever the
//! message collection or typing set changes, which is the renderer's cue to
//! follow the newest entry.

use crate::store::ConversationState;
use board_core::conversation::{Message, MessageRole};
use board_core::persona::Persona;
use chrono::{DateTime, Utc};

/// One renderable message row.
#[derive(Debug, Clone)]
pub struct DisplayMessage {
    pub id: Option<String>,
    pub persona: Persona,
    pub role: MessageRole,
    pub content: String,
    /// True for the synthetic in-progress entry of a streaming response.
    pub streaming: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One typing indicator row.
#[derive(Debug, Clone)]
pub struct TypingRow {
    pub persona: Persona,
}

/// What the renderer draws for one frame.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub title: Option<String>,
    pub messages: Vec<DisplayMessage>,
    pub typing: Vec<TypingRow>,
    /// Bumps when messages or typing change; the renderer scrolls to the
    /// newest entry when it sees a new value.
    pub scroll_revision: u64,
    /// Something is in flight (fetch, orchestration, or an active typer).
    pub waiting: bool,
}

/// Stateless-per-frame view logic with scroll bookkeeping.
pub struct ConversationView {
    /// Persona identifiers the user chose to display; empty means show all.
    selected_personas: Vec<String>,
    scroll_revision: u64,
    last_fingerprint: (usize, usize, usize),
}

impl Default for ConversationView {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationView {
    pub fn new() -> Self {
        Self {
            selected_personas: Vec::new(),
            scroll_revision: 0,
            last_fingerprint: (0, 0, 0),
        }
    }

    /// Replaces the persona visibility selection (case preserved, matching
    /// is case-insensitive).
    pub fn set_selected_personas(&mut self, personas: Vec<String>) {
        self.selected_personas = personas;
    }

    /// True when a message from `persona_id` should be rendered.
    ///
    /// User messages are always visible; agent messages are visible when the
    /// selection is empty ("show all") or contains the persona id.
    fn is_visible(&self, message: &Message) -> bool {
        if message.role == MessageRole::User {
            return true;
        }
        if self.selected_personas.is_empty() {
            return true;
        }
        let Some(persona_id) = message.persona_id.as_deref() else {
            return true;
        };
        self.selected_personas
            .iter()
            .any(|selected| selected.eq_ignore_ascii_case(persona_id))
    }

    /// Projects state into a renderable snapshot.
    ///
    /// `resolve` supplies persona metadata; it must be total (the catalog
    /// guarantees a placeholder for unknown identifiers).
    pub fn project<F>(&mut self, state: &ConversationState, resolve: F) -> ViewSnapshot
    where
        F: Fn(&str) -> Persona,
    {
        let messages: Vec<DisplayMessage> = state
            .messages
            .iter()
            .filter(|message| self.is_visible(message))
            .map(|message| {
                let persona = match message.role {
                    MessageRole::User => Persona::placeholder("user"),
                    MessageRole::Agent => {
                        let persona_id = message.persona_id.as_deref().unwrap_or("agent");
                        resolve(persona_id)
                    }
                };
                DisplayMessage {
                    id: message.id.clone(),
                    persona,
                    role: message.role,
                    content: message.content.clone(),
                    streaming: message.is_streaming_placeholder(),
                    timestamp: message.created_at,
                }
            })
            .collect();

        let typing: Vec<TypingRow> = state
            .typing_agents
            .iter()
            .map(|agent| TypingRow {
                persona: resolve(&agent.persona_id),
            })
            .collect();

        // Content length is part of the fingerprint so streaming appends
        // also pull the view to the bottom.
        let content_len: usize = state.messages.iter().map(|m| m.content.len()).sum();
        let fingerprint = (state.messages.len(), state.typing_agents.len(), content_len);
        if fingerprint != self.last_fingerprint {
            self.last_fingerprint = fingerprint;
            self.scroll_revision += 1;
        }

        ViewSnapshot {
            title: state
                .current_conversation
                .as_ref()
                .map(|c| c.title.clone()),
            messages,
            typing,
            scroll_revision: self.scroll_revision,
            waiting: state.messages_loading || state.processing || !state.typing_agents.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TypingAgent;
    use board_core::persona::default_personas;

    fn resolve(persona_id: &str) -> Persona {
        default_personas()
            .into_iter()
            .find(|p| p.id.eq_ignore_ascii_case(persona_id))
            .unwrap_or_else(|| Persona::placeholder(persona_id))
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
    fn test_selection_filters_agent_messages_case_insensitively() {
        let mut state = ConversationState::default();
        state.messages = vec![
            Message::local_user("question"),
            agent_message("m1", "pm", "scope"),
            agent_message("m2", "qa", "risk"),
        ];

        let mut view = ConversationView::new();
        view.set_selected_personas(vec!["PM".to_string()]);
        let snapshot = view.project(&state, resolve);

        // User message always shown; qa filtered out.
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].persona.id, "pm");
    }

    #[test]
    fn test_empty_selection_shows_all() {
        let mut state = ConversationState::default();
        state.messages = vec![
            agent_message("m1", "pm", "scope"),
            agent_message("m2", "qa", "risk"),
        ];

        let mut view = ConversationView::new();
        let snapshot = view.project(&state, resolve);
        assert_eq!(snapshot.messages.len(), 2);
    }

    #[test]
    fn test_unknown_persona_still_renders() {
        let mut state = ConversationState::default();
        state.messages = vec![agent_message("m1", "ghost", "boo")];

        let mut view = ConversationView::new();
        let snapshot = view.project(&state, resolve);

        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].persona.name, "ghost");
        assert_eq!(snapshot.messages[0].persona.icon, "G");
    }

    #[test]
    fn test_scroll_revision_bumps_on_changes_only() {
        let mut state = ConversationState::default();
        let mut view = ConversationView::new();

        let first = view.project(&state, resolve).scroll_revision;
        let second = view.project(&state, resolve).scroll_revision;
        assert_eq!(first, second);

        state.messages.push(agent_message("m1", "pm", "scope"));
        let third = view.project(&state, resolve).scroll_revision;
        assert!(third > second);

        state.typing_agents.push(TypingAgent::new("qa", "QA"));
        let fourth = view.project(&state, resolve).scroll_revision;
        assert!(fourth > third);

        // Streaming append changes content length only.
        state.messages[0].content.push_str(" more");
        let fifth = view.project(&state, resolve).scroll_revision;
        assert!(fifth > fourth);
    }

    #[test]
    fn test_typing_rows_resolve_personas() {
        let mut state = ConversationState::default();
        state.typing_agents.push(TypingAgent::new("pm", "PM"));

        let mut view = ConversationView::new();
        let snapshot = view.project(&state, resolve);

        assert_eq!(snapshot.typing.len(), 1);
        assert_eq!(snapshot.typing[0].persona.name, "PM");
        assert!(snapshot.waiting);
    }
}
