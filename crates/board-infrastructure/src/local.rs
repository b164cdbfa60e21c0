//! Local fallback conversation store.
//!
//! Keeps serialized conversation+message history in a single JSON file plus
//! the last-active conversation id in a second file. Used when the backend is
//! unavailable, and as a hydration hint after a restart. Writes go through a
//! temp file and rename so a crash never leaves a half-written history.

use board_core::conversation::{Conversation, Message, MessageRole};
use board_core::error::{BoardError, Result};
use std::path::{Path, PathBuf};

const HISTORY_FILE: &str = "conversations.json";
const ACTIVE_FILE: &str = "current_conversation";
const MAX_TITLE_LEN: usize = 50;

/// File-backed fallback store for conversations.
pub struct LocalConversationStore {
    dir: PathBuf,
}

impl LocalConversationStore {
    /// Creates a store under `<data_dir>/board`.
    pub fn new_default() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| BoardError::storage("Cannot find data directory"))?
            .join("board");
        Ok(Self { dir })
    }

    /// Creates a store rooted at an explicit directory (tests).
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_FILE)
    }

    /// Returns every stored conversation, newest first.
    ///
    /// A missing or corrupt history file yields an empty list rather than an
    /// error; the store is best-effort fallback data.
    pub async fn all(&self) -> Vec<Conversation> {
        match tokio::fs::read_to_string(self.history_path()).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Finds a stored conversation by id.
    pub async fn find(&self, id: &str) -> Option<Conversation> {
        self.all().await.into_iter().find(|c| c.id == id)
    }

    /// Inserts or replaces a conversation.
    pub async fn save(&self, conversation: Conversation) -> Result<()> {
        let mut conversations = self.all().await;
        match conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => conversations.insert(0, conversation),
        }
        self.write_history(&conversations).await
    }

    /// Replaces the message history of a stored conversation, refreshing a
    /// still-default title from the first user message.
    pub async fn update_messages(&self, id: &str, messages: Vec<Message>) -> Result<()> {
        let mut conversations = self.all().await;
        let Some(conversation) = conversations.iter_mut().find(|c| c.id == id) else {
            return Err(BoardError::not_found("Conversation", id));
        };
        if conversation.title == default_title() {
            if let Some(first_user) = messages
                .iter()
                .find(|m| m.role == MessageRole::User)
            {
                conversation.title = generate_title(&first_user.content);
            }
        }
        conversation.updated_at = chrono::Utc::now();
        conversation.messages = Some(messages);
        self.write_history(&conversations).await
    }

    /// Removes a conversation.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let conversations: Vec<Conversation> = self
            .all()
            .await
            .into_iter()
            .filter(|c| c.id != id)
            .collect();
        self.write_history(&conversations).await
    }

    /// Records the active conversation id; `None` clears it.
    pub async fn set_active(&self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => {
                tokio::fs::create_dir_all(&self.dir).await?;
                atomic_write(&self.active_path(), id.as_bytes()).await
            }
            None => match tokio::fs::remove_file(self.active_path()).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            },
        }
    }

    /// Returns the last-active conversation id, if any.
    pub async fn active(&self) -> Option<String> {
        tokio::fs::read_to_string(self.active_path())
            .await
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    async fn write_history(&self, conversations: &[Conversation]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let raw = serde_json::to_vec_pretty(conversations)?;
        atomic_write(&self.history_path(), &raw).await
    }
}

/// Title used before the first user message names the thread.
pub fn default_title() -> &'static str {
    "New brainstorming"
}

/// Derives a conversation title from its first message.
pub fn generate_title(first_message: &str) -> String {
    if first_message.len() <= MAX_TITLE_LEN {
        return first_message.to_string();
    }
    let mut cut = MAX_TITLE_LEN;
    while !first_message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", first_message[..cut].trim_end())
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
