use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{AppState, apidoc};

pub mod chat;
pub mod news;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::receive_chat))
        .route("/api/crypto-news", get(news::crypto_news))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", apidoc::ApiDoc::openapi()))
        .with_state(state)
}
