//! In-process stand-ins for the LLM and news providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    http::{HeaderMap, StatusCode, Uri, header},
};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use url::Url;

use crate::{
    AppState,
    config::{BackendKind, ChatCompletionConfig, Config, FlowConfig, NewsConfig},
};

/// What the mock provider saw.
#[derive(Clone, Default)]
pub struct Recorded {
    hits: Arc<AtomicUsize>,
    last_uri: Arc<Mutex<Option<String>>>,
    last_auth: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl Recorded {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_uri(&self) -> Option<String> {
        self.last_uri.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

pub struct MockProvider {
    pub base: Url,
    pub recorded: Recorded,
}

impl MockProvider {
    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }
}

/// Answers every request with `status` and the given JSON body.
pub async fn spawn_provider(status: StatusCode, body: Value) -> MockProvider {
    spawn(status, "application/json", body.to_string()).await
}

/// Answers every request with `status` and a plain-text body.
pub async fn spawn_text_provider(status: StatusCode, body: &str) -> MockProvider {
    spawn(status, "text/plain", body.to_string()).await
}

async fn spawn(status: StatusCode, content_type: &'static str, body: String) -> MockProvider {
    let recorded = Recorded::default();
    let rec = recorded.clone();

    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, req: Bytes| {
        let rec = rec.clone();
        let body = body.clone();
        async move {
            rec.hits.fetch_add(1, Ordering::SeqCst);
            *rec.last_uri.lock().unwrap() = Some(uri.to_string());
            *rec.last_auth.lock().unwrap() = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            *rec.last_body.lock().unwrap() = serde_json::from_slice(&req).ok();
            (status, [(header::CONTENT_TYPE, content_type)], body)
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockProvider {
        base: Url::parse(&format!("http://{addr}/")).unwrap(),
        recorded,
    }
}

/// A URL nothing is listening on.
pub async fn closed_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/run")).unwrap()
}

pub fn flow_backend(endpoint: Url) -> BackendKind {
    let mut tweaks = Map::new();
    tweaks.insert("ChatInput-1".to_string(), json!({}));
    BackendKind::Flow(FlowConfig {
        endpoint,
        application_token: "flow-token".to_string(),
        tweaks,
    })
}

pub fn chat_backend(endpoint: Url) -> BackendKind {
    BackendKind::ChatCompletion(ChatCompletionConfig {
        endpoint,
        api_key: "groq-key".to_string(),
        model: "test-model".to_string(),
        system_prompt: "Be brief.".to_string(),
        temperature: 0.5,
        max_tokens: 256,
        top_p: 0.9,
    })
}

pub fn news_config(endpoint: Url) -> NewsConfig {
    NewsConfig {
        endpoint,
        api_key: "news-key".to_string(),
        query: "bitcoin".to_string(),
        language: "en".to_string(),
        category: "business".to_string(),
    }
}

pub fn state(backend: BackendKind, news: Option<NewsConfig>) -> AppState {
    AppState {
        cfg: Config {
            app_host: "127.0.0.1".to_string(),
            app_port: 0,
            backend,
            history_limit: 5,
            news,
        },
        http: reqwest::Client::new(),
    }
}
