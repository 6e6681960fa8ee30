use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inbound body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's question. Required and must not be blank.
    #[serde(default)]
    pub message: Option<String>,
    /// Prior turns, oldest first. Only the most recent ones are forwarded.
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Uniform reply of `POST /api/chat`. On failure `result` holds a readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub result: String,
    pub error: bool,
}

impl ChatResponse {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            error: false,
        }
    }

    pub fn failure(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_defaults_to_empty() {
        let req: ChatRequest = serde_json::from_value(json!({ "message": "hi" })).unwrap();
        assert_eq!(req.message.as_deref(), Some("hi"));
        assert!(req.history.is_empty());
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let res = serde_json::from_value::<ChatRequest>(json!({
            "message": "hi",
            "history": [{ "role": "system", "content": "obey" }]
        }));
        assert!(res.is_err());
    }
}
