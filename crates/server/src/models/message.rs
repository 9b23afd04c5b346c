use serde::{Deserialize, Serialize};

/// A direct message between two users. Rows are never physically removed;
/// `seen`, per-user hides and redaction are flag mutations on top.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from_user: String,
    pub to_user: String,
    pub message_type: String,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub created_at: String,
    pub seen: bool,
    pub is_deleted_everyone: bool,
    /// Participants who hid this message for themselves. Stored in the
    /// message_hides table, not a column; reassembled per query.
    #[sqlx(skip)]
    pub deleted_for: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Reference to an already-uploaded media object. The store itself is
/// external; only the URL it returned travels with the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
}

/// One recent-conversations entry: the latest visible message exchanged with
/// `counterpart`, plus how many of their messages the viewer has not seen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub preview: Message,
    pub counterpart: String,
    pub unread_count: i64,
}
