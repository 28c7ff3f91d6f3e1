//! Chat handlers: send a message, fetch history, clear history.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::PromptMessage;
use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::handlers::auth::verified_user;
use crate::models::{ChatMessage, Role};
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct NewMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatsResponse {
    pub chats: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct AllChatsResponse {
    pub message: &'static str,
    pub chats: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

/// POST /api/v1/chat/new
///
/// The exchange persists only after the provider replies: a provider
/// failure leaves the stored history untouched.
pub async fn new_message(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<NewMessageRequest>,
) -> Result<Json<ChatsResponse>> {
    validate::validate_chat_message(&req.message)?;
    let content = req.message.trim().to_owned();

    let user = state
        .store
        .find_by_id(ctx.user_id())
        .await?
        .ok_or(Error::UserMissing)?;

    // Prompt context: the full ordered history plus the new user turn.
    let mut prompt: Vec<PromptMessage> = state
        .store
        .chats(&user.id)
        .await?
        .iter()
        .map(PromptMessage::from)
        .collect();
    prompt.push(PromptMessage {
        role: Role::User,
        content: content.clone(),
    });

    let reply = match state.provider.complete(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Completion failed for {}: {}", user.email, e);
            return Err(Error::Completion(e.to_string()));
        }
    };

    let chats = state.store.append_exchange(&user.id, &content, &reply).await?;

    info!("Chat exchange appended for {}", user.email);

    Ok(Json(ChatsResponse { chats }))
}

/// GET /api/v1/chat/all-chats
pub async fn all_chats(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<AllChatsResponse>> {
    let user = verified_user(&state, &ctx).await?;

    let chats = state.store.chats(&user.id).await?;

    Ok(Json(AllChatsResponse {
        message: "OK",
        chats,
    }))
}

/// DELETE /api/v1/chat/delete
pub async fn delete_chats(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<StatusResponse>> {
    let user = verified_user(&state, &ctx).await?;

    state.store.clear_chats(&user.id).await?;

    Ok(Json(StatusResponse { message: "OK" }))
}
