use serde::Serialize;

use crate::models::Message;

/// One frame on a push channel. Both kinds carry the full message record;
/// receivers branch on `type` and upsert by `message.id`: a created event
/// appends, an updated event replaces the copy they already hold.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    MessageCreated { message: Message },
    MessageUpdated { message: Message },
}
