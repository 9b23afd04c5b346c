pub mod messages;
pub mod stream;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let message_routes = Router::new()
        .route("/stream", get(stream::subscribe))
        .route("/send", post(messages::send_message))
        .route("/history", post(messages::chat_history))
        .route("/delete", post(messages::delete_message))
        .route("/clear", post(messages::clear_chat))
        .route("/recent", get(messages::recent_conversations))
        .route("/unread/count", get(messages::unread_count));

    Router::new()
        .nest("/api/messages", message_routes)
        .with_state(state)
}
