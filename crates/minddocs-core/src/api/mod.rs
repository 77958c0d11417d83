//! HTTP access to the MindDocs backend.
//!
//! Every request is built through [`ApiClient::get`] or [`ApiClient::post`],
//! which run the one request-shaping step: attach the bearer token when the
//! session has one. Nothing here retries, times out or backs off; a failed
//! request comes back to the caller as-is.

pub mod actions;
pub mod auth;
pub mod chat;
pub mod documents;

pub use actions::{ExtractResult, SummaryResult, TranslationResult};
pub use auth::{LoginResponse, RegisterRequest, RegisterResponse};
pub use chat::{ChatReply, HistoryEntry, ReplyStream};
pub use documents::{DocumentRef, UploadFile, UploadResponse};

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{detail_from_body, ApiError, Result};
use crate::session::TokenStore;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: TokenStore) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach `Authorization: Bearer <token>` when a token is stored.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        debug!(path, "GET");
        self.authorize(self.client.get(self.url(path)))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        debug!(path, "POST");
        self.authorize(self.client.post(self.url(path)))
    }

    /// Send and reject non-success statuses, keeping the body open.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        check_status(response).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = detail_from_body(&body);
    warn!(status = status.as_u16(), path = %url, detail = ?detail, "request rejected");
    Err(ApiError::Server {
        status: status.as_u16(),
        detail,
    })
}
