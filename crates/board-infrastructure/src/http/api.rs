//! REST implementation of the backend API contract.

use super::client::HttpClient;
use board_core::api::BoardApi;
use board_core::auth::{AuthSession, LoginRequest, RegisterRequest, User};
use board_core::conversation::{
    Attachment, Conversation, ConversationAnalytics, CreateConversationRequest,
    CreateMessageRequest, Message, Page, ProcessMessageRequest, ProcessedMessages,
    UpdateConversationRequest,
};
use board_core::error::Result;
use board_core::persona::Persona;
use async_trait::async_trait;
use serde::Deserialize;

/// Wire shape of the summary endpoint.
#[derive(Deserialize)]
struct SummaryResponse {
    data: SummaryPayload,
}

#[derive(Deserialize)]
struct SummaryPayload {
    summary: String,
}

#[derive(Deserialize)]
struct RegisterResponse {
    user: User,
}

/// `BoardApi` implementation over the REST backend.
#[derive(Clone)]
pub struct HttpBoardApi {
    http: HttpClient,
}

impl HttpBoardApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn register(&self, request: RegisterRequest) -> Result<User> {
        let response: RegisterResponse = self
            .http
            .post_json("/auth/email/register", &request)
            .await?;
        Ok(response.user)
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        let session: AuthSession = self.http.post_json("/auth/email/login", &request).await?;
        self.http.tokens().set(session.token.clone()).await?;
        Ok(session)
    }

    async fn me(&self) -> Result<User> {
        self.http.get_json("/auth/me").await
    }

    async fn create_conversation(
        &self,
        request: CreateConversationRequest,
    ) -> Result<Conversation> {
        self.http.post_json("/conversations", &request).await
    }

    async fn list_conversations(&self, page: u32, limit: u32) -> Result<Page<Conversation>> {
        self.http
            .get_json(&format!("/conversations?page={page}&limit={limit}"))
            .await
    }

    async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.http.get_json(&format!("/conversations/{id}")).await
    }

    async fn update_conversation(
        &self,
        id: &str,
        request: UpdateConversationRequest,
    ) -> Result<Conversation> {
        self.http
            .patch_json(&format!("/conversations/{id}"), &request)
            .await
    }

    async fn delete_conversation(&self, id: &str) -> Result<()> {
        self.http.delete(&format!("/conversations/{id}")).await
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.http
            .get_json(&format!("/conversations/{conversation_id}/messages"))
            .await
    }

    async fn create_message(&self, conversation_id: &str, content: &str) -> Result<Message> {
        let request = CreateMessageRequest {
            content: content.to_string(),
        };
        self.http
            .post_json(&format!("/conversations/{conversation_id}/messages"), &request)
            .await
    }

    async fn process_message(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<ProcessedMessages> {
        let request = ProcessMessageRequest {
            message: message.to_string(),
        };
        self.http
            .post_json(
                &format!("/orchestration/conversations/{conversation_id}/process"),
                &request,
            )
            .await
    }

    async fn generate_summary(&self, conversation_id: &str) -> Result<String> {
        let response: SummaryResponse = self
            .http
            .get_json(&format!(
                "/orchestration/conversations/{conversation_id}/summary"
            ))
            .await?;
        Ok(response.data.summary)
    }

    async fn step_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.http
            .post_json(
                &format!("/orchestration/conversations/{conversation_id}/step"),
                &serde_json::json!({}),
            )
            .await
    }

    async fn list_personas(&self) -> Result<Vec<Persona>> {
        self.http.get_json("/personas").await
    }

    async fn get_persona(&self, id: &str) -> Result<Persona> {
        self.http.get_json(&format!("/personas/{id}")).await
    }

    async fn conversation_analytics(
        &self,
        conversation_id: &str,
    ) -> Result<ConversationAnalytics> {
        self.http
            .get_json(&format!("/analytics/conversations/{conversation_id}"))
            .await
    }

    async fn upload_attachment(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Attachment> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|err| board_core::BoardError::internal(err.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.http.post_multipart("/attachments/upload", form).await
    }

    async fn get_attachment(&self, id: &str) -> Result<Attachment> {
        self.http.get_json(&format!("/attachments/{id}")).await
    }
}
