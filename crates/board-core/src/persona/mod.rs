//! Persona domain module.

mod defaults;
mod model;

pub use defaults::default_personas;
pub use model::Persona;
