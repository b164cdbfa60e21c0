//! HTTP transport.
//!
//! Wraps `reqwest` with the cross-cutting concerns every endpoint shares:
//! bearer-token attachment, error-body mapping, and the 401 guest-mode
//! demotion (clear the stored token, keep going unauthenticated).

use crate::token::TokenStore;
use board_core::error::{BoardError, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Shared HTTP client for the Board REST backend.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<TokenStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    async fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.tokens.get().await {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Sends the request and maps non-success statuses to `BoardError`.
    ///
    /// A 401 clears the stored token so subsequent requests continue as
    /// guest, and surfaces `BoardError::Unauthorized` to the caller.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(BoardError::from)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            if let Err(err) = self.tokens.clear().await {
                warn!("failed to clear expired token: {err}");
            }
            warn!("authentication expired, continuing in guest mode");
            return Err(BoardError::Unauthorized);
        }
        if !status.is_success() {
            let message = extract_error_message(response).await;
            return Err(BoardError::http(status.as_u16(), message));
        }
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.builder(Method::GET, path).await;
        let response = self.send(builder).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.builder(Method::POST, path).await.json(body);
        let response = self.send(builder).await?;
        Ok(response.json().await?)
    }

    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.builder(Method::PATCH, path).await.json(body);
        let response = self.send(builder).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.builder(Method::DELETE, path).await;
        self.send(builder).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let builder = self.builder(Method::POST, path).await.multipart(form);
        let response = self.send(builder).await?;
        Ok(response.json().await?)
    }
}

/// Pulls a human-readable message out of a backend error body.
///
/// The backend reports `{ statusCode, message: string | string[], error }`;
/// validation errors carry the array form.
async fn extract_error_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let Ok(body) = response.json::<Value>().await else {
        return fallback;
    };
    match body.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Array(parts)) => {
            let joined: Vec<String> = parts
                .iter()
                .filter_map(|part| part.as_str().map(str::to_string))
                .collect();
            if joined.is_empty() {
                fallback
            } else {
                joined.join("; ")
            }
        }
        _ => fallback,
    }
}
