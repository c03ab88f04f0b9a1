use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::context::CommentReplyKind;
use super::review_reply::ReviewReplyId;

/// Unique identifier for a persisted comment reply.
pub type ReplyId = String;

/// Text format hint carried on a write or requested back on a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    Raw,
    Markdown,
    Html,
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
        }
    }
}

impl FromStr for TextType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "markdown" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown text type: {other}")),
        }
    }
}

/// Fields of a [`CommentReply`] that a partial save may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyField {
    Text,
    RichText,
    ForceTextType,
    IncludeTextTypes,
    ReplyToId,
}

/// A reply to a single comment on a review, persisted via the remote store.
///
/// `id` is absent until the store has accepted the record; editors address
/// an existing record by carrying its id so a retry updates rather than
/// duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentReply {
    /// Remote identity, when persisted.
    #[serde(default)]
    pub id: Option<ReplyId>,
    /// Which comment variant this reply belongs to.
    pub kind: CommentReplyKind,
    /// Parent review reply, when the parent has a durable identity.
    #[serde(default)]
    pub review_reply_id: Option<ReviewReplyId>,
    /// The comment being replied to.
    pub reply_to_id: String,
    /// Body text of the reply.
    #[serde(default)]
    pub text: String,
    /// Whether `text` is rich markup.
    #[serde(default)]
    pub rich_text: bool,
    /// Format forced on the outgoing write.
    #[serde(default)]
    pub force_text_type: Option<TextType>,
    /// Format requested back on subsequent reads.
    #[serde(default)]
    pub include_text_types: Option<TextType>,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
    /// Update timestamp in RFC3339 format.
    pub updated_at: String,
}

impl CommentReply {
    /// Build an unpersisted reply addressed at `reply_to_id`, optionally
    /// adopting an existing remote identity.
    pub fn new(
        kind: CommentReplyKind,
        review_reply_id: Option<ReviewReplyId>,
        reply_to_id: impl Into<String>,
        id: Option<ReplyId>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            kind,
            review_reply_id,
            reply_to_id: reply_to_id.into(),
            text: String::new(),
            rich_text: false,
            force_text_type: None,
            include_text_types: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// True while the record has never been persisted.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Whether the reply still carries unsaved-looking content.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
