//! Persona domain model.
//!
//! Represents AI personas that participate in conversations with users.
//! Personas are sourced from the backend catalog; a fixed local default set
//! stands in when the backend is unreachable. Both are read-only catalogs
//! keyed by identifier.

use serde::{Deserialize, Serialize};

/// A persona representing an AI agent with specific characteristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Unique identifier (opaque string, e.g. "pm")
    pub id: String,
    /// Display name of the persona
    pub name: String,
    /// Description of the persona's expertise
    #[serde(default)]
    pub description: String,
    /// Display color (hex)
    #[serde(default)]
    pub color: String,
    /// Avatar glyph or icon name
    #[serde(default)]
    pub icon: String,
    /// Capability tags
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Whether the persona can join new conversations
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Persona {
    /// Synthesizes a placeholder for an identifier absent from every catalog.
    ///
    /// Rendering must never fail because a persona is unknown: the
    /// placeholder uses the identifier as display name and its first letter
    /// as avatar glyph.
    pub fn placeholder(id: &str) -> Self {
        let icon = id
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string());
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            color: "#9CA3AF".to_string(),
            icon,
            capabilities: Vec::new(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_uses_first_letter_as_icon() {
        let persona = Persona::placeholder("qa");
        assert_eq!(persona.icon, "Q");
        assert_eq!(persona.name, "qa");
    }

    #[test]
    fn test_placeholder_of_empty_id() {
        let persona = Persona::placeholder("");
        assert_eq!(persona.icon, "?");
    }
}
