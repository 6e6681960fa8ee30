use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use serde_json::{Map, Value, json};
use thiserror::Error;
use url::Url;

const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_NEWSDATA_API_URL: &str = "https://newsdata.io/api/1/news";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly crypto guide for complete beginners. \
Answer in plain language, keep replies short, and never give financial advice. \
Do not repeat the question and do not prefix your answer with a role label.";

/// Component ids of the deployed flow. Each gets an empty override unless
/// `FLOW_TWEAKS` replaces the whole map.
const DEFAULT_FLOW_COMPONENTS: [&str; 5] = [
    "ChatInput-bAJ4v",
    "Prompt-GMTqC",
    "GroqModel-41nqs",
    "ChatOutput-fPDgJ",
    "Memory-5wiMl",
];

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind host (e.g., 0.0.0.0)
    pub app_host: String,
    /// HTTP bind port (e.g., 3000)
    pub app_port: u16,

    /// Which LLM backend every chat request is relayed to
    pub backend: BackendKind,
    /// Number of prior turns forwarded with each message
    pub history_limit: usize,

    /// News proxy; `None` when `NEWSDATA_API_KEY` is not set
    pub news: Option<NewsConfig>,
}

/// Backend shape, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub enum BackendKind {
    Flow(FlowConfig),
    ChatCompletion(ChatCompletionConfig),
}

#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Fully resolved `{base}/lf/{deployment}/api/v1/run/{flow}`
    pub endpoint: Url,
    pub application_token: String,
    pub tweaks: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub query: String,
    pub language: String,
    pub category: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Unknown CHAT_BACKEND '{0}' (expected 'flow' or 'chat_completion')")]
    InvalidBackend(String),
    #[error("FLOW_TWEAKS must be a JSON object: {0}")]
    InvalidTweaks(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present
        let _ = dotenv();
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key source. Blank values count as unset.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let app_host = env_or_default(lookup, "APP_HOST", "0.0.0.0");
        let app_port = parse_or_default::<u16>(lookup, "APP_PORT", 3000)?;

        let backend = match env_or_default(lookup, "CHAT_BACKEND", "flow")
            .to_lowercase()
            .as_str()
        {
            "flow" | "langflow" => BackendKind::Flow(flow_from_lookup(lookup)?),
            "chat_completion" | "groq" => {
                BackendKind::ChatCompletion(chat_completion_from_lookup(lookup)?)
            }
            other => return Err(ConfigError::InvalidBackend(other.to_string())),
        };

        let history_limit = parse_or_default::<usize>(lookup, "CHAT_HISTORY_LIMIT", 5)?;
        let news = news_from_lookup(lookup)?;

        Ok(Self {
            app_host,
            app_port,
            backend,
            history_limit,
            news,
        })
    }
}

fn flow_from_lookup(lookup: Lookup<'_>) -> Result<FlowConfig, ConfigError> {
    let base_url = parse_url_required(lookup, "LANGFLOW_BASE_URL")?;
    let deployment_id = required(lookup, "LANGFLOW_ID")?;
    let flow_id = required(lookup, "FLOW_ID")?;
    let application_token = required(lookup, "APPLICATION_TOKEN")?;

    let mut endpoint = base_url.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl {
            name: "LANGFLOW_BASE_URL",
            value: base_url.to_string(),
        })?
        .pop_if_empty()
        .extend(["lf", deployment_id.as_str(), "api", "v1", "run", flow_id.as_str()]);

    let tweaks = match var(lookup, "FLOW_TWEAKS") {
        Some(raw) => serde_json::from_str::<Map<String, Value>>(&raw)
            .map_err(|e| ConfigError::InvalidTweaks(e.to_string()))?,
        None => default_tweaks(),
    };

    Ok(FlowConfig {
        endpoint,
        application_token,
        tweaks,
    })
}

fn chat_completion_from_lookup(lookup: Lookup<'_>) -> Result<ChatCompletionConfig, ConfigError> {
    Ok(ChatCompletionConfig {
        endpoint: parse_url_or_default(lookup, "GROQ_API_URL", DEFAULT_GROQ_API_URL)?,
        api_key: required(lookup, "GROQ_API_KEY")?,
        model: env_or_default(lookup, "GROQ_MODEL", DEFAULT_GROQ_MODEL),
        system_prompt: env_or_default(lookup, "SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
        temperature: parse_or_default::<f32>(lookup, "GROQ_TEMPERATURE", 0.7)?,
        max_tokens: parse_or_default::<u32>(lookup, "GROQ_MAX_TOKENS", 1024)?,
        top_p: parse_or_default::<f32>(lookup, "GROQ_TOP_P", 1.0)?,
    })
}

fn news_from_lookup(lookup: Lookup<'_>) -> Result<Option<NewsConfig>, ConfigError> {
    let Some(api_key) = var(lookup, "NEWSDATA_API_KEY") else {
        return Ok(None);
    };

    Ok(Some(NewsConfig {
        endpoint: parse_url_or_default(lookup, "NEWSDATA_API_URL", DEFAULT_NEWSDATA_API_URL)?,
        api_key,
        query: env_or_default(lookup, "NEWS_QUERY", "cryptocurrency OR bitcoin OR ethereum"),
        language: env_or_default(lookup, "NEWS_LANGUAGE", "en"),
        category: env_or_default(lookup, "NEWS_CATEGORY", "business,technology"),
    }))
}

fn default_tweaks() -> Map<String, Value> {
    DEFAULT_FLOW_COMPONENTS
        .iter()
        .map(|id| (id.to_string(), json!({})))
        .collect()
}

/* --------------------------- helpers --------------------------- */

pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn var(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn required(lookup: Lookup<'_>, key: &'static str) -> Result<String, ConfigError> {
    var(lookup, key).ok_or(ConfigError::MissingVar(key))
}

fn env_or_default(lookup: Lookup<'_>, key: &'static str, default: &'static str) -> String {
    var(lookup, key).unwrap_or_else(|| default.to_string())
}

fn parse_or_default<T: FromStr>(
    lookup: Lookup<'_>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(lookup, key) {
        Some(v) => v.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name: key,
            value: v,
        }),
        None => Ok(default),
    }
}

fn parse_url(key: &'static str, raw: String) -> Result<Url, ConfigError> {
    Url::parse(&raw).map_err(|_| ConfigError::InvalidUrl {
        name: key,
        value: raw,
    })
}

fn parse_url_required(lookup: Lookup<'_>, key: &'static str) -> Result<Url, ConfigError> {
    parse_url(key, required(lookup, key)?)
}

fn parse_url_or_default(
    lookup: Lookup<'_>,
    key: &'static str,
    default: &'static str,
) -> Result<Url, ConfigError> {
    parse_url(key, env_or_default(lookup, key, default))
}
