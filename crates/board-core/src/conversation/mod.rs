//! Conversation domain module.
//!
//! This module contains all conversation-related domain models: the
//! conversation entity itself, messages, and the request/response shapes the
//! backend contract uses for both.
//!
//! # Module Structure
//!
//! - `model`: Conversation entity, status lifecycle, request DTOs
//! - `message`: Message types and the optimistic/streaming id helpers

mod message;
mod model;

pub use message::{
    Attachment, CreateMessageRequest, LOCAL_ID_PREFIX, Message, MessageRole, ProcessMessageRequest,
    ProcessedMessages, STREAMING_ID_PREFIX, StructuredOutput, streaming_id,
};
pub use model::{
    Conversation, ConversationAnalytics, ConversationStatus, CreateConversationRequest, Page,
    UpdateConversationRequest,
};
