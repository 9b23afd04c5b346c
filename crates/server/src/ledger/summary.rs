use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::models::{ConversationSummary, Message};

use super::{attach_hides, VISIBLE_FOR};

/// One entry per counterpart: the most recent visible message as preview,
/// plus a count of unseen incoming messages within that pair. Scans the
/// user's entire visible history on every call; the ordering
/// (`created_at DESC, rowid DESC`) is total and stable so pollers comparing
/// the top entry against their last observed id never miss or double-fire.
pub async fn recent_conversations(
    db: &SqlitePool,
    user: &str,
) -> Result<Vec<ConversationSummary>, ApiError> {
    let sql = format!(
        "SELECT m.* FROM messages m
          WHERE (m.from_user = ? OR m.to_user = ?) AND {}
          ORDER BY m.created_at DESC, m.rowid DESC",
        VISIBLE_FOR
    );
    let messages = sqlx::query_as::<_, Message>(&sql)
        .bind(user)
        .bind(user)
        .bind(user)
        .fetch_all(db)
        .await?;

    // Input is time-descending, so the first message per counterpart is the
    // preview and first-appearance order is already preview recency.
    let mut conversations: Vec<ConversationSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for message in messages {
        let counterpart = if message.from_user == user {
            message.to_user.clone()
        } else {
            message.from_user.clone()
        };
        let unseen_incoming = (message.to_user == user && !message.seen) as i64;
        match index.get(&counterpart) {
            Some(&i) => conversations[i].unread_count += unseen_incoming,
            None => {
                index.insert(counterpart.clone(), conversations.len());
                conversations.push(ConversationSummary {
                    preview: message,
                    counterpart,
                    unread_count: unseen_incoming,
                });
            }
        }
    }

    attach_hides(db, conversations.iter_mut().map(|c| &mut c.preview)).await?;
    Ok(conversations)
}

/// Global unread count: unseen incoming messages not hidden for the user.
/// Computed independently of the aggregator; the two may transiently
/// disagree while a history call is marking a thread read.
pub async fn global_unread_count(db: &SqlitePool, user: &str) -> Result<i64, ApiError> {
    let sql = format!(
        "SELECT COUNT(*) FROM messages m WHERE m.to_user = ? AND m.seen = 0 AND {}",
        VISIBLE_FOR
    );
    let count = sqlx::query_scalar::<_, i64>(&sql)
        .bind(user)
        .bind(user)
        .fetch_one(db)
        .await?;
    Ok(count)
}
