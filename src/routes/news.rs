use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value as JsonValue;
use tracing::error;

use crate::{AppState, models::common::ErrorMessage, services::news::fetch_news};

#[utoipa::path(
    get,
    path = "/api/crypto-news",
    tag = "news",
    responses(
        (status = 200, description = "Provider JSON, passed through unmodified"),
        (status = 500, description = "Provider call failed", body = ErrorMessage),
        (status = 503, description = "News feed not configured", body = ErrorMessage)
    )
)]
pub async fn crypto_news(
    State(state): State<AppState>,
) -> Result<Json<JsonValue>, (StatusCode, Json<ErrorMessage>)> {
    let Some(cfg) = state.cfg.news.as_ref() else {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "News feed is not configured",
        ));
    };

    fetch_news(&state.http, cfg).await.map(Json).map_err(|err| {
        error!("Error fetching crypto news: {err}");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch news")
    })
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorMessage>) {
    (
        status,
        Json(ErrorMessage {
            error: message.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use crate::{
        routes::app,
        test_support::{closed_url, flow_backend, news_config, spawn_provider, state},
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn get_news(state: crate::AppState) -> (StatusCode, Value) {
        let res = app(state)
            .oneshot(
                Request::get("/api/crypto-news")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn relays_provider_json() {
        let articles = json!({"results": [{"title": "ETH upgrade ships"}]});
        let provider = spawn_provider(StatusCode::OK, articles.clone()).await;
        let news = news_config(provider.url("/api/1/news"));
        let state = state(flow_backend(closed_url().await), Some(news));

        let (status, body) = get_news(state).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, articles);
    }

    #[tokio::test]
    async fn provider_error_becomes_500() {
        let provider = spawn_provider(StatusCode::UNAUTHORIZED, json!({"status": "error"})).await;
        let news = news_config(provider.url("/api/1/news"));
        let state = state(flow_backend(closed_url().await), Some(news));

        let (status, body) = get_news(state).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to fetch news"}));
    }

    #[tokio::test]
    async fn missing_config_is_503() {
        let state = state(flow_backend(closed_url().await), None);

        let (status, body) = get_news(state).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"error": "News feed is not configured"}));
    }
}
