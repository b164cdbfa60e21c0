//! Persona catalog.
//!
//! Loads the backend persona catalog and resolves identifiers for display.
//! When the backend is unreachable the fixed default catalog stands in, so
//! the client keeps rendering in guest/offline mode.

use board_core::api::BoardApi;
use board_core::error::Result;
use board_core::persona::{Persona, default_personas};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Read-only persona lookup with offline fallback.
pub struct PersonaCatalog {
    api: Arc<dyn BoardApi>,
    backend: RwLock<Vec<Persona>>,
    defaults: Vec<Persona>,
}

impl PersonaCatalog {
    pub fn new(api: Arc<dyn BoardApi>) -> Self {
        Self {
            api,
            backend: RwLock::new(Vec::new()),
            defaults: default_personas(),
        }
    }

    /// Refreshes the backend catalog.
    ///
    /// Backend failure is not fatal: the previous (possibly empty) backend
    /// catalog is kept and resolution falls through to the defaults.
    pub async fn load(&self) -> Result<()> {
        match self.api.list_personas().await {
            Ok(personas) => {
                *self.backend.write().await = personas;
                Ok(())
            }
            Err(err) => {
                warn!("persona catalog unavailable, using defaults: {err}");
                Err(err)
            }
        }
    }

    /// Returns the catalog used for selection UIs: the backend set when
    /// loaded, the default set otherwise.
    pub async fn all(&self) -> Vec<Persona> {
        let backend = self.backend.read().await;
        if backend.is_empty() {
            self.defaults.clone()
        } else {
            backend.clone()
        }
    }

    /// Resolves a persona for display.
    ///
    /// Precedence: backend catalog, then the default catalog, then a
    /// synthesized placeholder. Matching is case-insensitive; resolution
    /// never fails.
    pub async fn resolve(&self, persona_id: &str) -> Persona {
        let wanted = persona_id.to_lowercase();
        let backend = self.backend.read().await;
        if let Some(found) = backend.iter().find(|p| p.id.to_lowercase() == wanted) {
            return found.clone();
        }
        drop(backend);
        if let Some(found) = self.defaults.iter().find(|p| p.id.to_lowercase() == wanted) {
            return found.clone();
        }
        Persona::placeholder(persona_id)
    }
}
