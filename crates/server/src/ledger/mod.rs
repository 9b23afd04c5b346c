pub mod summary;

use std::collections::HashMap;

use sqlx::SqlitePool;

use courier_shared::constants::DELETED_MESSAGE_PLACEHOLDER;
use courier_shared::validation;

use crate::error::ApiError;
use crate::models::{MediaRef, Message};

/// Row-visibility predicate shared by every read path: a message is visible
/// to a viewer unless they hid it for themselves. Expects the messages table
/// aliased as `m` and one bind for the viewer id.
pub(crate) const VISIBLE_FOR: &str =
    "NOT EXISTS (SELECT 1 FROM message_hides h WHERE h.message_id = m.id AND h.user_id = ?)";

/// Validate and persist a new message. The record starts unseen, unhidden
/// and unredacted; `message_type` is inferred from the media reference.
pub async fn create_message(
    db: &SqlitePool,
    from_user: &str,
    to_user: &str,
    text: Option<String>,
    media: Option<MediaRef>,
) -> Result<Message, ApiError> {
    validation::validate_participants(from_user, to_user).map_err(ApiError::Validation)?;
    validation::validate_send_payload(text.as_deref(), media.as_ref().map(|m| m.url.as_str()))
        .map_err(ApiError::Validation)?;

    let message_type = media.as_ref().map(|m| m.kind.as_str()).unwrap_or("text");
    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        from_user: from_user.to_string(),
        to_user: to_user.to_string(),
        message_type: message_type.to_string(),
        text: text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        media_url: media.map(|m| m.url),
        created_at: chrono::Utc::now().to_rfc3339(),
        seen: false,
        is_deleted_everyone: false,
        deleted_for: Vec::new(),
    };

    sqlx::query(
        r#"INSERT INTO messages (id, from_user, to_user, message_type, text, media_url, created_at, seen, is_deleted_everyone)
           VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0)"#,
    )
    .bind(&message.id)
    .bind(&message.from_user)
    .bind(&message.to_user)
    .bind(&message.message_type)
    .bind(&message.text)
    .bind(&message.media_url)
    .bind(&message.created_at)
    .execute(db)
    .await?;

    Ok(message)
}

/// All messages of the pair `{viewer, counterpart}` visible to the viewer,
/// ascending by creation time with rowid as the stable tiebreak.
pub async fn pair_history(
    db: &SqlitePool,
    viewer: &str,
    counterpart: &str,
) -> Result<Vec<Message>, ApiError> {
    let sql = format!(
        "SELECT m.* FROM messages m
          WHERE ((m.from_user = ? AND m.to_user = ?) OR (m.from_user = ? AND m.to_user = ?))
            AND {}
          ORDER BY m.created_at ASC, m.rowid ASC",
        VISIBLE_FOR
    );
    let mut messages = sqlx::query_as::<_, Message>(&sql)
        .bind(viewer)
        .bind(counterpart)
        .bind(counterpart)
        .bind(viewer)
        .bind(viewer)
        .fetch_all(db)
        .await?;

    attach_hides(db, &mut messages).await?;
    Ok(messages)
}

/// Bulk mark-read: every message from `counterpart` to `viewer` becomes
/// seen. Runs as its own statement, independent of the listing query that
/// precedes it in the history route; a message created between the two may
/// be marked seen without having been listed.
pub async fn mark_pair_seen(
    db: &SqlitePool,
    viewer: &str,
    counterpart: &str,
) -> Result<(), ApiError> {
    sqlx::query("UPDATE messages SET seen = 1 WHERE from_user = ? AND to_user = ?")
        .bind(counterpart)
        .bind(viewer)
        .execute(db)
        .await?;
    Ok(())
}

/// "Delete for me": hide a message for one participant. Idempotent.
pub async fn hide_for_user(
    db: &SqlitePool,
    user: &str,
    message_id: &str,
) -> Result<(), ApiError> {
    let participants = sqlx::query_as::<_, (String, String)>(
        "SELECT from_user, to_user FROM messages WHERE id = ?",
    )
    .bind(message_id)
    .fetch_optional(db)
    .await?;

    let (from_user, to_user) = participants.ok_or(ApiError::NotFound)?;
    if user != from_user && user != to_user {
        return Err(ApiError::Unauthorized);
    }

    sqlx::query("INSERT OR IGNORE INTO message_hides (message_id, user_id, hidden_at) VALUES (?, ?, ?)")
        .bind(message_id)
        .bind(user)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(db)
        .await?;
    Ok(())
}

/// "Delete for everyone": sender-only, irreversible. Overwrites text and
/// media with the fixed placeholder and returns the updated record for the
/// dispatcher to push.
pub async fn redact_for_everyone(
    db: &SqlitePool,
    user: &str,
    message_id: &str,
) -> Result<Message, ApiError> {
    let sender = sqlx::query_scalar::<_, String>("SELECT from_user FROM messages WHERE id = ?")
        .bind(message_id)
        .fetch_optional(db)
        .await?
        .ok_or(ApiError::NotFound)?;

    if user != sender {
        return Err(ApiError::Unauthorized);
    }

    sqlx::query(
        "UPDATE messages
            SET is_deleted_everyone = 1, text = ?, media_url = NULL, message_type = 'text'
          WHERE id = ?",
    )
    .bind(DELETED_MESSAGE_PLACEHOLDER)
    .bind(message_id)
    .execute(db)
    .await?;

    let mut message = sqlx::query_as::<_, Message>("SELECT m.* FROM messages m WHERE m.id = ?")
        .bind(message_id)
        .fetch_one(db)
        .await?;
    attach_hides(db, [&mut message]).await?;
    Ok(message)
}

/// Bulk "delete for me" over a whole conversation.
pub async fn clear_pair(
    db: &SqlitePool,
    user: &str,
    counterpart: &str,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT OR IGNORE INTO message_hides (message_id, user_id, hidden_at)
         SELECT m.id, ?, ? FROM messages m
          WHERE (m.from_user = ? AND m.to_user = ?) OR (m.from_user = ? AND m.to_user = ?)",
    )
    .bind(user)
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(user)
    .bind(counterpart)
    .bind(counterpart)
    .bind(user)
    .execute(db)
    .await?;
    Ok(())
}

/// Batch-fetch hide rows for a query result and fill in `deleted_for`.
pub(crate) async fn attach_hides<'a, I>(db: &SqlitePool, messages: I) -> Result<(), sqlx::Error>
where
    I: IntoIterator<Item = &'a mut Message>,
{
    let mut messages: Vec<&'a mut Message> = messages.into_iter().collect();
    if messages.is_empty() {
        return Ok(());
    }

    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    let placeholders: Vec<String> = ids.iter().map(|_| "?".to_string()).collect();
    let sql = format!(
        "SELECT message_id, user_id FROM message_hides WHERE message_id IN ({})",
        placeholders.join(",")
    );
    let mut query = sqlx::query_as::<_, (String, String)>(&sql);
    for id in &ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(db).await?;

    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (message_id, user_id) in rows {
        map.entry(message_id).or_default().push(user_id);
    }
    for message in messages.iter_mut() {
        message.deleted_for = map.remove(&message.id).unwrap_or_default();
    }
    Ok(())
}
