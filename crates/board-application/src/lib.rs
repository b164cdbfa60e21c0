//! Application layer: the conversation store, the realtime event binding,
//! the persona catalog, and the view projection.
//!
//! Two event sources converge here — REST results and realtime push — and
//! both dispatch the same action vocabulary through one reducer, so the
//! message merge policy is uniform no matter which path delivers a message
//! first.

pub mod binding;
pub mod catalog;
pub mod store;
pub mod view;

pub use binding::ConversationBinding;
pub use catalog::PersonaCatalog;
pub use store::{Action, AsyncOp, ConversationState, ConversationStore, TypingAgent};
pub use view::{ConversationView, DisplayMessage, ViewSnapshot};
