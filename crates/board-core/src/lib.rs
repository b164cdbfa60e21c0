//! Core domain layer for the Board client.
//!
//! Holds the domain models (conversations, messages, personas), the realtime
//! event vocabulary, the backend API contract, client configuration, and the
//! message merge algorithm every ingestion path funnels through.

pub mod api;
pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod merge;
pub mod persona;

// Re-export common error type
pub use error::{BoardError, Result};
