//! Chat transport: opens one streaming request to the assistant backend.
//!
//! DESIGN
//! ======
//! The backend is a black box: `POST {base}/api/chat` with a JSON body,
//! answered by a chunked body of `data:` lines. The transport only opens the
//! request and hands back the raw byte stream; frame decoding lives in
//! [`crate::stream`]. The trait seam lets tests script the backend.
//!
//! ERROR HANDLING
//! ==============
//! A failed send, a non-2xx status and a failed body read are distinct
//! [`TransportError`] variants. There is no request timeout.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use tracing::{debug, warn};

use crate::language::Language;
use crate::persistence::ConversationTurn;

/// Path of the streaming chat endpoint, relative to the base URL.
pub const CHAT_PATH: &str = "/api/chat";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent.
    #[error("chat request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("chat response error: status {status}")]
    Status { status: u16 },

    /// Reading the response body failed mid-stream.
    #[error("chat response read failed: {0}")]
    Read(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// REQUEST
// =============================================================================

/// Request body of one exchange. `history` already ends with the user turn
/// carrying `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: Language,
    pub history: Vec<ConversationTurn>,
}

pub type ByteStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` and return the response body as a byte stream.
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, TransportError>;
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let endpoint = format!("{}{CHAT_PATH}", base_url.trim_end_matches('/'));
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, TransportError> {
        debug!(
            endpoint = %self.endpoint,
            message_len = request.message.len(),
            history_len = request.history.len(),
            language = %request.language,
            "transport: opening chat stream"
        );
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "transport: chat endpoint rejected request");
            return Err(TransportError::Status { status: status.as_u16() });
        }

        let body = response
            .bytes_stream()
            .map(|item| item.map(|bytes| bytes.to_vec()).map_err(|e| TransportError::Read(e.to_string())));
        Ok(body.boxed())
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
