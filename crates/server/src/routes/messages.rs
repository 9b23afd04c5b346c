use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::ledger::{self, summary};
use crate::models::{AuthUser, MediaRef};
use crate::push;
use crate::AppState;

#[derive(Deserialize)]
pub struct SendRequest {
    pub to_user_id: String,
    pub text: Option<String>,
    pub media: Option<MediaRef>,
}

#[derive(Deserialize)]
pub struct HistoryRequest {
    pub to_user_id: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteScope {
    Me,
    Everyone,
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(rename = "type")]
    pub scope: DeleteScope,
}

#[derive(Deserialize)]
pub struct ClearRequest {
    pub to_user_id: String,
}

/// POST /api/messages/send
///
/// The response reflects persistence only; the live push happens off the
/// request path and its outcome is never surfaced to the sender.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SendRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let message =
        ledger::create_message(&state.db, &user.id, &body.to_user_id, body.text, body.media)
            .await?;

    push::dispatch_created(Arc::clone(&state.registry), message.clone());

    Ok(Json(json!({ "success": true, "message": message })))
}

/// POST /api/messages/history
///
/// Fetching a thread is also "mark thread read": the listing query and the
/// seen-update run as two independent statements, in that order.
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<HistoryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let messages = ledger::pair_history(&state.db, &user.id, &body.to_user_id).await?;
    ledger::mark_pair_seen(&state.db, &user.id, &body.to_user_id).await?;

    Ok(Json(json!({ "success": true, "messages": messages })))
}

/// POST /api/messages/delete
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<DeleteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match body.scope {
        DeleteScope::Me => {
            ledger::hide_for_user(&state.db, &user.id, &body.message_id).await?;
            Ok(Json(json!({ "success": true })))
        }
        DeleteScope::Everyone => {
            let message =
                ledger::redact_for_everyone(&state.db, &user.id, &body.message_id).await?;
            push::dispatch_updated(Arc::clone(&state.registry), message.clone());
            Ok(Json(json!({ "success": true, "message": message })))
        }
    }
}

/// POST /api/messages/clear
pub async fn clear_chat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<ClearRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ledger::clear_pair(&state.db, &user.id, &body.to_user_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/messages/recent
pub async fn recent_conversations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conversations = summary::recent_conversations(&state.db, &user.id).await?;
    Ok(Json(json!({ "success": true, "messages": conversations })))
}

/// GET /api/messages/unread/count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = summary::global_unread_count(&state.db, &user.id).await?;
    Ok(Json(json!({ "success": true, "count": count })))
}
