//! OpenAI-compatible chat-completions client.
//!
//! Gemini, OpenAI and Ollama all expose this endpoint shape; only the base
//! URL and the bearer token differ.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tripgenie_core::config::LlmConfig;

use crate::llm::{LlmClient, LlmError, ModelMessage, ModelReply, ModelRequest, ToolInvocation};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

pub struct OpenAiCompatibleClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    max_retries: u32,
}

impl OpenAiCompatibleClient {
    /// `None` when the provider is disabled.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let Some(base_url) = config.effective_base_url() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::unknown(format!("failed to build HTTP client: {error}")))?;

        Ok(Some(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        }))
    }

    fn translate_request(&self, request: &ModelRequest) -> ChatRequest {
        let mut messages = vec![ChatMessage::plain("system", request.system.clone())];

        for message in &request.messages {
            match message {
                ModelMessage::User(text) => messages.push(ChatMessage::plain("user", text.clone())),
                ModelMessage::Assistant { text, tool_calls } => messages.push(ChatMessage {
                    role: "assistant".to_string(),
                    content: text.clone(),
                    tool_calls: (!tool_calls.is_empty()).then(|| {
                        tool_calls
                            .iter()
                            .map(|call| ChatToolCall {
                                id: call.id.clone(),
                                r#type: "function".to_string(),
                                function: ChatFunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.to_string(),
                                },
                            })
                            .collect()
                    }),
                    tool_call_id: None,
                }),
                ModelMessage::ToolResults(results) => {
                    messages.extend(results.iter().map(|result| ChatMessage {
                        role: "tool".to_string(),
                        content: Some(result.content.to_string()),
                        tool_calls: None,
                        tool_call_id: Some(result.call_id.clone()),
                    }));
                }
            }
        }

        let tools = (!request.tools.is_empty()).then(|| {
            request
                .tools
                .iter()
                .map(|tool| ChatTool {
                    r#type: "function".to_string(),
                    function: ChatFunction {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect()
        });

        ChatRequest { model: self.model.clone(), messages, tools, stream: false }
    }

    async fn send_once(&self, body: &ChatRequest) -> Result<ModelReply, LlmError> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                LlmError::network(format!("request timeout: {error}"))
            } else if error.is_connect() {
                LlmError::network(format!("connection failed: {error}"))
            } else {
                LlmError::unknown(format!("request failed: {error}"))
            }
        })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response
            .text()
            .await
            .map_err(|error| LlmError::network(format!("failed to read response: {error}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ChatErrorResponse>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(classify_status(status.as_u16(), message, retry_after));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|error| LlmError::unknown(format!("failed to parse response: {error}")))?;
        normalize_response(parsed)
    }
}

fn classify_status(status: u16, message: String, retry_after: Option<Duration>) -> LlmError {
    match status {
        401 | 403 => LlmError::auth(format!("authentication failed: {message}")),
        429 => {
            let error = LlmError::rate_limit(format!("rate limit exceeded: {message}"));
            match retry_after {
                Some(delay) => error.with_retry_after(delay),
                None => error,
            }
        }
        400 | 404 | 422 => LlmError::invalid_request(format!("invalid request: {message}")),
        500..=599 => LlmError::server_error(format!("server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

fn normalize_response(response: ChatResponse) -> Result<ModelReply, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::unknown("no choices in response"))?;

    let text = choice.message.content.filter(|text| !text.trim().is_empty());
    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .filter(|call| !call.function.name.is_empty())
        .enumerate()
        .map(|(index, call)| ToolInvocation {
            id: if call.id.is_empty() { format!("call_{index}") } else { call.id },
            arguments: serde_json::from_str(&call.function.arguments)
                .unwrap_or_else(|_| serde_json::json!({})),
            name: call.function.name,
        })
        .collect();

    Ok(ModelReply { text, tool_calls })
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, LlmError> {
        let body = self.translate_request(request);
        let mut attempt = 0;

        loop {
            match self.send_once(&body).await {
                Ok(reply) => {
                    info!(
                        event_name = "llm.request_completed",
                        model = %self.model,
                        attempt,
                        tool_calls = reply.tool_calls.len(),
                        "model request completed"
                    );
                    return Ok(reply);
                }
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    let backoff = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt);
                    let delay = error.retry_after.unwrap_or(backoff);
                    warn!(
                        event_name = "llm.request_retry",
                        model = %self.model,
                        attempt,
                        kind = ?error.kind,
                        delay_ms = delay.as_millis() as u64,
                        "retrying model request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatTool {
    r#type: String,
    function: ChatFunction,
}

#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: ChatFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatErrorBody,
}

#[derive(Debug, Deserialize)]
struct ChatErrorBody {
    message: String,
}
