use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat Relay",
        version = "0.1.0",
        description = "Relays chat questions to a Langflow flow or a Groq chat-completion backend and returns cleaned replies."
    ),
    servers(
        (url = "http://localhost:3000", description = "Local dev")
    ),
    tags(
        (name = "chat", description = "Assistant chat endpoint"),
        (name = "news", description = "Crypto news proxy")
    ),
    // Handlers (paths)
    paths(
        crate::routes::chat::receive_chat,
        crate::routes::news::crypto_news,
    ),
    // Schemas used in requests/responses
    components(
        schemas(
            crate::models::chat::ChatRequest,
            crate::models::chat::HistoryTurn,
            crate::models::chat::Role,
            crate::models::chat::ChatResponse,
            crate::models::common::ErrorMessage
        )
    )
)]
pub struct ApiDoc;
