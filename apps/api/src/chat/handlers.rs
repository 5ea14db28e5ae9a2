use axum::Json;
use serde::{Deserialize, Serialize};

use crate::chat::{detect_intent, respond, ChatContext, Intent};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(flatten)]
    pub context: ChatContext,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub intent: Intent,
    pub answer: String,
}

/// POST /api/chat
pub async fn handle_chat(Json(request): Json<ChatRequest>) -> Result<Json<ChatResponse>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("Question is required".to_string()));
    }

    let intent = detect_intent(&request.question);
    tracing::debug!(?intent, "chat intent detected");

    Ok(Json(ChatResponse {
        status: "success",
        intent,
        answer: respond(intent, &request.context),
    }))
}
