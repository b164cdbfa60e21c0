//! Default persona catalog.
//!
//! Provides the fixed local persona set used when the backend catalog is
//! unreachable (offline or guest operation). Identifiers line up with the
//! backend's seeded personas so messages resolve against either catalog.

use super::model::Persona;

/// Returns the built-in persona catalog.
///
/// These four personas mirror the backend's seeded brainstorming board:
/// - **Marketing**: market analysis and positioning
/// - **PM**: scoping, prioritization, and tradeoffs
/// - **Developer**: feasibility and implementation planning
/// - **QA & Testing**: risk analysis and quality gates
pub fn default_personas() -> Vec<Persona> {
    vec![
        Persona {
            id: "marketing".to_string(),
            name: "Marketing".to_string(),
            description: "Marketing Specialist".to_string(),
            color: "#10B981".to_string(),
            icon: "M".to_string(),
            capabilities: vec!["market-analysis".to_string(), "positioning".to_string()],
            is_active: true,
        },
        Persona {
            id: "pm".to_string(),
            name: "PM".to_string(),
            description: "Product Manager".to_string(),
            color: "#F87171".to_string(),
            icon: "P".to_string(),
            capabilities: vec!["scoping".to_string(), "prioritization".to_string()],
            is_active: true,
        },
        Persona {
            id: "developer".to_string(),
            name: "Developer".to_string(),
            description: "Software Engineer".to_string(),
            color: "#60A5FA".to_string(),
            icon: "D".to_string(),
            capabilities: vec!["feasibility".to_string(), "architecture".to_string()],
            is_active: true,
        },
        Persona {
            id: "qa".to_string(),
            name: "QA & Testing".to_string(),
            description: "Quality Assurance".to_string(),
            color: "#A78BFA".to_string(),
            icon: "Q".to_string(),
            capabilities: vec!["risk-analysis".to_string(), "testing".to_string()],
            is_active: true,
        },
    ]
}
