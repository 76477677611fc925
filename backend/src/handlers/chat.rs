//! Site assistant handler

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatInput {
    pub message: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

fn reply(status: StatusCode, text: impl Into<String>) -> (StatusCode, Json<ChatReply>) {
    (status, Json(ChatReply { reply: text.into() }))
}

/// Answer a visitor's question about the platform
pub async fn chat(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<ChatReply>) {
    let question = serde_json::from_slice::<ChatInput>(&body)
        .ok()
        .and_then(|input| match input.message {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        });

    let Some(question) = question else {
        return reply(StatusCode::BAD_REQUEST, "No message provided");
    };

    tracing::info!("Assistant question received ({} chars)", question.chars().count());
    match state.explainer.answer(&question).await {
        Ok(text) => reply(StatusCode::OK, text),
        Err(e) => {
            tracing::warn!("Assistant failed: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, "Sorry, server error occurred.")
        }
    }
}
