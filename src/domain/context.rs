use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::EditorError;

/// What part of a review an editor is replying to.
///
/// Body slots address the review reply's own text fields; comment kinds
/// address an individual comment thread and select the concrete
/// [`CommentReplyKind`] to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyContextKind {
    BodyTop,
    BodyBottom,
    #[serde(rename = "diff_comments")]
    DiffComment,
    #[serde(rename = "screenshot_comments")]
    ScreenshotComment,
    #[serde(rename = "file_attachment_comments")]
    FileAttachmentComment,
    #[serde(rename = "general_comments")]
    GeneralComment,
    #[serde(rename = "untouched_comments")]
    UntouchedComment,
}

impl ReplyContextKind {
    pub const ALL: [ReplyContextKind; 7] = [
        Self::BodyTop,
        Self::BodyBottom,
        Self::DiffComment,
        Self::ScreenshotComment,
        Self::FileAttachmentComment,
        Self::GeneralComment,
        Self::UntouchedComment,
    ];

    /// Body field pair on the review reply, when this context targets one.
    pub fn body_slot(&self) -> Option<BodySlot> {
        match self {
            Self::BodyTop => Some(BodySlot::Top),
            Self::BodyBottom => Some(BodySlot::Bottom),
            _ => None,
        }
    }

    /// Concrete reply-record variant for per-comment contexts.
    pub fn comment_kind(&self) -> Option<CommentReplyKind> {
        match self {
            Self::BodyTop | Self::BodyBottom => None,
            Self::DiffComment => Some(CommentReplyKind::Diff),
            Self::ScreenshotComment => Some(CommentReplyKind::Screenshot),
            Self::FileAttachmentComment => Some(CommentReplyKind::FileAttachment),
            Self::GeneralComment => Some(CommentReplyKind::General),
            Self::UntouchedComment => Some(CommentReplyKind::Untouched),
        }
    }
}

impl fmt::Display for ReplyContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BodyTop => write!(f, "body_top"),
            Self::BodyBottom => write!(f, "body_bottom"),
            Self::DiffComment => write!(f, "diff_comments"),
            Self::ScreenshotComment => write!(f, "screenshot_comments"),
            Self::FileAttachmentComment => write!(f, "file_attachment_comments"),
            Self::GeneralComment => write!(f, "general_comments"),
            Self::UntouchedComment => write!(f, "untouched_comments"),
        }
    }
}

impl FromStr for ReplyContextKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "body_top" => Ok(Self::BodyTop),
            "body_bottom" => Ok(Self::BodyBottom),
            "diff_comments" => Ok(Self::DiffComment),
            "screenshot_comments" => Ok(Self::ScreenshotComment),
            "file_attachment_comments" => Ok(Self::FileAttachmentComment),
            "general_comments" => Ok(Self::GeneralComment),
            "untouched_comments" => Ok(Self::UntouchedComment),
            other => Err(EditorError::UnknownContextType(other.to_string())),
        }
    }
}

/// Which body field pair on the review reply a save targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySlot {
    Top,
    Bottom,
}

/// Variant of a persisted comment reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentReplyKind {
    Diff,
    Screenshot,
    FileAttachment,
    General,
    Untouched,
}

impl fmt::Display for CommentReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diff => write!(f, "diff"),
            Self::Screenshot => write!(f, "screenshot"),
            Self::FileAttachment => write!(f, "file_attachment"),
            Self::General => write!(f, "general"),
            Self::Untouched => write!(f, "untouched"),
        }
    }
}

impl FromStr for CommentReplyKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diff" => Ok(Self::Diff),
            "screenshot" => Ok(Self::Screenshot),
            "file_attachment" => Ok(Self::FileAttachment),
            "general" => Ok(Self::General),
            "untouched" => Ok(Self::Untouched),
            other => Err(EditorError::UnknownContextType(other.to_string())),
        }
    }
}
