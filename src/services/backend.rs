use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
    config::BackendKind,
    models::{
        backend::{BackendPayload, ChatCompletionRequest, CompletionMessage, FlowRunRequest},
        chat::HistoryTurn,
    },
};

/// Returned when none of the known response fields holds text.
pub const FALLBACK_REPLY: &str = "No response from the assistant";

const FLOW_TEXT_PATHS: &[&str] = &[
    "/outputs/0/outputs/0/results/message/text",
    "/outputs/0/outputs/0/artifacts/message",
];

const CHAT_COMPLETION_TEXT_PATHS: &[&str] = &["/choices/0/message/content"];

// Provider error pages can be large; keep the message readable.
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Failed to get response from assistant: {status}{}", body_suffix(.body))]
    Backend { status: StatusCode, body: String },
    #[error("Could not reach the assistant: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("The assistant returned an unreadable response: {0}")]
    Decode(#[source] reqwest::Error),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }
    let short: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!(" ({short})")
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Flow(_) => "flow",
            BackendKind::ChatCompletion(_) => "chat_completion",
        }
    }

    pub fn endpoint(&self) -> &Url {
        match self {
            BackendKind::Flow(cfg) => &cfg.endpoint,
            BackendKind::ChatCompletion(cfg) => &cfg.endpoint,
        }
    }

    fn token(&self) -> &str {
        match self {
            BackendKind::Flow(cfg) => &cfg.application_token,
            BackendKind::ChatCompletion(cfg) => &cfg.api_key,
        }
    }

    /// Builds the provider body. Flow runs keep their own memory, so only the
    /// chat-completion shape carries `history`.
    pub fn build_payload<'a>(
        &'a self,
        message: &'a str,
        history: &'a [HistoryTurn],
    ) -> BackendPayload<'a> {
        match self {
            BackendKind::Flow(cfg) => BackendPayload::Flow(FlowRunRequest {
                input_value: message,
                output_type: "chat",
                input_type: "chat",
                tweaks: &cfg.tweaks,
            }),
            BackendKind::ChatCompletion(cfg) => {
                let mut messages = Vec::with_capacity(history.len() + 2);
                messages.push(CompletionMessage {
                    role: "system",
                    content: &cfg.system_prompt,
                });
                messages.extend(history.iter().map(|turn| CompletionMessage {
                    role: turn.role.as_str(),
                    content: &turn.content,
                }));
                messages.push(CompletionMessage {
                    role: "user",
                    content: message,
                });

                BackendPayload::ChatCompletion(ChatCompletionRequest {
                    model: &cfg.model,
                    messages,
                    temperature: cfg.temperature,
                    max_tokens: cfg.max_tokens,
                    top_p: cfg.top_p,
                    stream: false,
                })
            }
        }
    }

    /// JSON pointers tried in order when pulling the reply text out of a response.
    pub fn text_paths(&self) -> &'static [&'static str] {
        match self {
            BackendKind::Flow(_) => FLOW_TEXT_PATHS,
            BackendKind::ChatCompletion(_) => CHAT_COMPLETION_TEXT_PATHS,
        }
    }

    /// First non-empty string found along [`Self::text_paths`].
    pub fn extract_text(&self, body: &Value) -> Option<String> {
        self.text_paths().iter().find_map(|path| {
            body.pointer(path)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        })
    }
}

/// Relays one message to the configured backend and returns the raw reply text.
/// Single attempt, no retry.
pub async fn send_chat_message(
    http: &reqwest::Client,
    backend: &BackendKind,
    message: &str,
    history: &[HistoryTurn],
) -> Result<String, ForwardError> {
    let url = backend.endpoint();
    let payload = backend.build_payload(message, history);

    info!(backend = backend.name(), url = %url, "Forwarding chat message");

    let res = http
        .post(url.clone())
        .bearer_auth(backend.token())
        .json(&payload)
        .send()
        .await
        .map_err(|e| ForwardError::Transport(e.without_url()))?;

    let status = res.status();
    info!(status = %status, "Assistant responded");

    if !status.is_success() {
        let body = res
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(ForwardError::Backend { status, body });
    }

    let body: Value = res.json().await.map_err(|e| ForwardError::Decode(e.without_url()))?;
    Ok(backend.extract_text(&body).unwrap_or_else(|| {
        debug!("No known text field in assistant response, using fallback");
        FALLBACK_REPLY.to_string()
    }))
}
