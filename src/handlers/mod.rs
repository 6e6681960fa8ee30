use thiserror::Error;
use tracing::info;

use crate::{
    AppState,
    models::chat::ChatRequest,
    services::backend::{ForwardError, send_chat_message},
    utils::recent_turns,
};

pub mod normalize;

#[derive(Debug, Error)]
pub enum HandleError {
    #[error("Message is required")]
    EmptyMessage,

    // Lets `?` lift forwarding failures into HandleError
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

/// Validates the request, relays it and returns the cleaned reply.
pub async fn handle_chat(state: &AppState, req: ChatRequest) -> Result<String, HandleError> {
    info!(history = req.history.len(), "Incoming chat message");

    let message = req
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(HandleError::EmptyMessage)?;

    let history = recent_turns(&req.history, state.cfg.history_limit);
    let raw = send_chat_message(&state.http, &state.cfg.backend, message, history).await?;

    Ok(normalize::normalize(&raw))
}
