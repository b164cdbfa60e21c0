//! Conversation state store.
//!
//! # Module Structure
//!
//! - `state`: the state container (`ConversationState`, `TypingAgent`)
//! - `action`: the action vocabulary shared by REST and realtime paths
//! - `reducer`: pure transitions
//! - `store`: the store handle with REST-backed operations

mod action;
mod reducer;
mod state;
#[allow(clippy::module_inception)]
mod store;

pub use action::{Action, AsyncOp};
pub use reducer::reduce;
pub use state::{ConversationState, Pagination, TypingAgent};
pub use store::ConversationStore;
