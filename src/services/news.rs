use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::NewsConfig;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news request error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("news provider status {0}")]
    Status(StatusCode),
    #[error("news json error: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Fetches the latest articles and returns the provider's JSON untouched.
pub async fn fetch_news(http: &reqwest::Client, cfg: &NewsConfig) -> Result<Value, NewsError> {
    let mut url = cfg.endpoint.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("apikey", &cfg.api_key);
        pairs.append_pair("q", &cfg.query);
        pairs.append_pair("language", &cfg.language);
        pairs.append_pair("category", &cfg.category);
    }

    let res = http.get(url).send().await.map_err(NewsError::Transport)?;

    let status = res.status();
    info!(status = %status, "News provider responded");
    if !status.is_success() {
        return Err(NewsError::Status(status));
    }

    res.json::<Value>().await.map_err(NewsError::Decode)
}
