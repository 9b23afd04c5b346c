use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::AuthUser;
use crate::AppState;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"success": false, "message": message})),
    )
        .into_response()
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.to_string());

        // EventSource clients cannot set headers; the stream route passes
        // the token as a query parameter instead.
        let query_token = parts
            .uri
            .query()
            .unwrap_or("")
            .split('&')
            .find_map(|pair| pair.strip_prefix("token="))
            .map(|t| t.to_string());

        let token = match bearer.or(query_token) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(unauthorized("Not authenticated")),
        };

        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT user_id, expires_at FROM sessions WHERE token = ?",
        )
        .bind(&token)
        .fetch_optional(&state.db)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"success": false, "message": "Database error"})),
            )
                .into_response()
        })?;

        let (user_id, expires_at) = match row {
            Some(r) => r,
            None => return Err(unauthorized("Invalid session")),
        };

        let now = chrono::Utc::now().to_rfc3339();
        if expires_at < now {
            return Err(unauthorized("Session expired"));
        }

        Ok(AuthUser { id: user_id })
    }
}
