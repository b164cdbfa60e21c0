//! Client configuration.
//!
//! Configuration priority: explicit construction > environment variables >
//! built-in defaults. The realtime event-name surface is part of the
//! configuration because observed backend revisions disagree on wire names;
//! decoding accepts every registered alias per kind.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_WS_URL: &str = "ws://localhost:8080";
const DEFAULT_WS_NAMESPACE: &str = "/board";
const DEFAULT_STAGGER_MS: u64 = 900;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Wire names for realtime events, with legacy aliases.
///
/// `decode` resolves an incoming name against the current name first, then
/// each alias, so either backend revision (`agent_typing` with a boolean
/// flag, or split `agent_typing_start` / `agent_typing_stop`;
/// `agent_response` or `agent_message_received`) works unchanged.
#[derive(Debug, Clone)]
pub struct EventNames {
    pub typing: String,
    pub typing_start: String,
    pub typing_stop: String,
    pub stream: String,
    pub message: String,
    /// Aliases still accepted for the finalized-message event.
    pub message_aliases: Vec<String>,
    pub session_complete: String,
    pub status_change: String,
    pub error: String,
    pub join: String,
    pub leave: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            typing: "agent_typing".to_string(),
            typing_start: "agent_typing_start".to_string(),
            typing_stop: "agent_typing_stop".to_string(),
            stream: "agent_stream".to_string(),
            message: "agent_response".to_string(),
            message_aliases: vec!["agent_message_received".to_string()],
            session_complete: "session_complete".to_string(),
            status_change: "status_change".to_string(),
            error: "ERROR".to_string(),
            join: "join_conversation".to_string(),
            leave: "leave_conversation".to_string(),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Base URL of the REST backend, including the API prefix.
    pub api_base_url: String,
    /// Base URL of the realtime endpoint (`ws://` or `wss://`).
    pub ws_url: String,
    /// Realtime namespace appended to `ws_url`.
    pub ws_namespace: String,
    /// Delay between consecutive finalized-message deliveries.
    ///
    /// UX pacing only; correctness never depends on this value.
    pub stagger_delay: Duration,
    /// Page size for conversation listing.
    pub page_size: u32,
    /// Realtime wire-name surface.
    pub event_names: EventNames,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            ws_namespace: DEFAULT_WS_NAMESPACE.to_string(),
            stagger_delay: Duration::from_millis(DEFAULT_STAGGER_MS),
            page_size: DEFAULT_PAGE_SIZE,
            event_names: EventNames::default(),
        }
    }
}

impl BoardConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `BOARD_API_URL`, `BOARD_WS_URL`,
    /// `BOARD_WS_NAMESPACE`, `BOARD_STAGGER_MS`, `BOARD_PAGE_SIZE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("BOARD_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(url) = env::var("BOARD_WS_URL") {
            config.ws_url = url;
        }
        if let Ok(namespace) = env::var("BOARD_WS_NAMESPACE") {
            config.ws_namespace = namespace;
        }
        if let Some(ms) = env::var("BOARD_STAGGER_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.stagger_delay = Duration::from_millis(ms);
        }
        if let Some(size) = env::var("BOARD_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            config.page_size = size;
        }
        config
    }

    /// Full URL of the realtime namespace this client connects to.
    pub fn realtime_url(&self) -> String {
        format!("{}{}", self.ws_url, self.ws_namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.stagger_delay, Duration::from_millis(900));
        assert_eq!(config.realtime_url(), "ws://localhost:8080/board");
    }
}
