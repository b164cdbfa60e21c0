//! Bearer token storage.
//!
//! A thin wrapper over a JSON file in the platform config directory with an
//! in-memory cache. Absence of a token is not an error: the client operates
//! in guest mode without one.

use board_core::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    token: Option<String>,
}

/// Stores the bearer token in memory, mirrored to disk when a path is set.
pub struct TokenStore {
    path: Option<PathBuf>,
    cached: RwLock<Option<String>>,
}

impl TokenStore {
    /// Creates a store backed by `<config_dir>/board/token.json`.
    ///
    /// The cached token is loaded eagerly; a missing or unreadable file just
    /// means guest mode.
    pub fn new_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| BoardError::storage("Cannot find config directory"))?
            .join("board");
        let path = dir.join("token.json");
        let cached = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<TokenFile>(&raw).ok())
            .and_then(|file| file.token);
        Ok(Self {
            path: Some(path),
            cached: RwLock::new(cached),
        })
    }

    /// Creates a memory-only store (tests, ephemeral sessions).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cached: RwLock::new(None),
        }
    }

    /// Returns the current token, if any.
    pub async fn get(&self) -> Option<String> {
        self.cached.read().await.clone()
    }

    /// Stores a token and persists it.
    pub async fn set(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        *self.cached.write().await = Some(token.clone());
        self.persist(Some(token)).await
    }

    /// Clears the token (guest-mode demotion).
    pub async fn clear(&self) -> Result<()> {
        *self.cached.write().await = None;
        self.persist(None).await
    }

    async fn persist(&self, token: Option<String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(&TokenFile { token })?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }
}
