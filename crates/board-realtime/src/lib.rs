//! Realtime channel client for the Board backend.
//!
//! One live websocket connection per active conversation namespace, a typed
//! handler registry, and the wire protocol with its versioned event names.

mod client;
pub mod protocol;

pub use client::{EventHandler, RealtimeClient};
