use serde::Serialize;
use serde_json::{Map, Value};

/// Body of a flow run: `POST {base}/lf/{deployment}/api/v1/run/{flow}`.
#[derive(Debug, Clone, Serialize)]
pub struct FlowRunRequest<'a> {
    pub input_value: &'a str,
    pub output_type: &'static str,
    pub input_type: &'static str,
    pub tweaks: &'a Map<String, Value>,
}

/// OpenAI-compatible chat-completion body, as accepted by Groq.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<CompletionMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Whichever body the configured backend expects.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BackendPayload<'a> {
    Flow(FlowRunRequest<'a>),
    ChatCompletion(ChatCompletionRequest<'a>),
}
