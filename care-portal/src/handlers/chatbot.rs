use super::portal_session;
use crate::models::chat::ChatMessage;
use crate::models::navigation::PageKey;
use crate::AppState;
use askama::Template;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "chatbot.html")]
pub struct ChatbotTemplate {
    pub messages: Vec<ChatMessage>,
    pub back_href: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(max = 4000, message = "Message must be at most 4000 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<ChatMessage>,
}

pub async fn chatbot_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<ChatbotTemplate, AppError> {
    let portal = portal_session(&state, &session).await?;

    Ok(ChatbotTemplate {
        messages: portal.chat.messages().await,
        back_href: PageKey::Home.href(),
    })
}

pub async fn send_message(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<TranscriptResponse>, AppError> {
    payload.validate()?;
    let portal = portal_session(&state, &session).await?;

    let messages = portal.chat.send(&state.chat, &payload.message).await;

    Ok(Json(TranscriptResponse { messages }))
}
