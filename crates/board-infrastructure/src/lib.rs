//! Infrastructure layer: REST client, token storage, local fallback store.

pub mod http;
pub mod local;
pub mod token;

pub use http::{HttpBoardApi, HttpClient};
pub use local::LocalConversationStore;
pub use token::TokenStore;
