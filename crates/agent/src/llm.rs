//! Model capability used by the tool-calling turn driver.
//!
//! The transcript is stateless: every `complete` call carries the full
//! history, the current user message and any tool exchanges of this turn.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub name: String,
    pub content: Value,
    pub is_error: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelMessage {
    User(String),
    Assistant { text: Option<String>, tool_calls: Vec<ToolInvocation> },
    ToolResults(Vec<ToolResult>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    pub system: String,
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolSpec>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), tool_calls: Vec::new() }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Clone, Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), retry_after: None }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Timeouts and connection failures.
    Network,
    /// HTTP 429.
    RateLimit,
    /// HTTP 5xx.
    ServerError,
    /// HTTP 401/403.
    Auth,
    /// HTTP 400 or a request the provider refused.
    InvalidRequest,
    Unknown,
}

impl LlmErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, LlmError>;

    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::{LlmError, LlmErrorKind, ModelReply};

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(LlmError::network("timeout").is_retryable());
        assert!(LlmError::rate_limit("slow down").is_retryable());
        assert!(LlmError::server_error("502").is_retryable());
        assert!(!LlmError::auth("bad key").is_retryable());
        assert!(!LlmError::invalid_request("schema").is_retryable());
        assert!(!LlmErrorKind::Unknown.is_retryable());
    }

    #[test]
    fn text_reply_requests_no_tools() {
        let reply = ModelReply::text("Here you go");
        assert!(!reply.wants_tools());
        assert_eq!(reply.text.as_deref(), Some("Here you go"));
    }
}
