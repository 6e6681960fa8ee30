use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::{
    AppState,
    handlers::{self, HandleError},
    models::chat::{ChatRequest, ChatResponse},
};

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply, or a backend failure flagged with `error: true`", body = ChatResponse),
        (status = 400, description = "Malformed body or empty message", body = ChatResponse)
    )
)]
pub async fn receive_chat(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    let req: ChatRequest = match serde_json::from_value(payload) {
        Ok(req) => req,
        Err(err) => return bad_request(format!("Failed to deserialize chat request: {err}")),
    };

    match handlers::handle_chat(&state, req).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::ok(reply))),
        Err(HandleError::EmptyMessage) => bad_request(HandleError::EmptyMessage.to_string()),
        // Backend trouble is a chat-level outcome; the UI shows the message inline.
        Err(err) => {
            warn!("Chat relay failed: {err}");
            (StatusCode::OK, Json(ChatResponse::failure(err.to_string())))
        }
    }
}

fn bad_request(message: String) -> (StatusCode, Json<ChatResponse>) {
    (StatusCode::BAD_REQUEST, Json(ChatResponse::failure(message)))
}
